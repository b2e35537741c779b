//! Document store for last-applied schedule tags.

mod file_store;
mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use crate::core::domain::error::StoreFailure;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Key-value document store keyed by collection and document id.
///
/// `put` fully replaces any existing document; there is no merge.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn put(
        &self,
        collection: &str,
        id: &str,
        record: serde_json::Value,
    ) -> Result<(), StoreFailure>;

    /// Removes a document. Removing a document that does not exist succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreFailure>;
}
