use super::ScheduleStore;
use crate::core::domain::error::StoreFailure;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-backed store.
///
/// Each document lives in `<root>/<collection>/<id>.json`. Writes go to a
/// temporary sibling first and are renamed into place, so a reader never
/// sees a half-written record.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf, StoreFailure> {
        for part in [collection, id] {
            if part.is_empty() || part.contains(['/', '\\']) || part == "." || part == ".." {
                return Err(StoreFailure::Backend(format!(
                    "'{}' is not a valid collection or document name",
                    part
                )));
            }
        }
        Ok(self.root.join(collection).join(format!("{}.json", id)))
    }
}

#[async_trait]
impl ScheduleStore for FileStore {
    async fn put(
        &self,
        collection: &str,
        id: &str,
        record: serde_json::Value,
    ) -> Result<(), StoreFailure> {
        let path = self.document_path(collection, id)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }

        let content = serde_json::to_vec_pretty(&record)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreFailure> {
        let path = self.document_path(collection, id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
