use crate::{
    core::{
        domain::{
            error::{SchedulerError, SchedulerResult, StoreFailure},
            model::schedule_tag::{
                NodePoolScheduleTag, VmScheduleTag, node_pool_document_id, vm_document_id,
            },
            value_object::ResourceId,
        },
        infrastructure::store::ScheduleStore,
    },
    schedule::application::response::tag_response::TagResponse,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Persists and removes schedule tags.
pub struct TaggingService {
    store: Arc<dyn ScheduleStore>,
    nodepool_collection: String,
    vm_collection: String,
}

impl TaggingService {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        nodepool_collection: impl Into<String>,
        vm_collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            nodepool_collection: nodepool_collection.into(),
            vm_collection: vm_collection.into(),
        }
    }

    pub async fn put_node_pool_tag(&self, tag: &NodePoolScheduleTag) -> SchedulerResult<TagResponse> {
        self.put(&self.nodepool_collection, tag.document_id(), tag)
            .await
    }

    pub async fn delete_node_pool_tag(
        &self,
        project_id: &ResourceId,
        cluster_id: &ResourceId,
        nodepool_id: &ResourceId,
    ) -> SchedulerResult<TagResponse> {
        let doc_id = node_pool_document_id(project_id, cluster_id, nodepool_id);
        self.delete(&self.nodepool_collection, doc_id).await
    }

    pub async fn put_vm_tag(&self, tag: &VmScheduleTag) -> SchedulerResult<TagResponse> {
        self.put(&self.vm_collection, tag.document_id(), tag).await
    }

    pub async fn delete_vm_tag(
        &self,
        project_id: &ResourceId,
        instance_name: &ResourceId,
    ) -> SchedulerResult<TagResponse> {
        let doc_id = vm_document_id(project_id, instance_name);
        self.delete(&self.vm_collection, doc_id).await
    }

    async fn put<T: Serialize>(
        &self,
        collection: &str,
        doc_id: String,
        tag: &T,
    ) -> SchedulerResult<TagResponse> {
        let record = serde_json::to_value(tag)
            .map_err(|e| store_error(collection, &doc_id, StoreFailure::from(e)))?;

        self.store
            .put(collection, &doc_id, record)
            .await
            .map_err(|e| store_error(collection, &doc_id, e))?;

        info!(collection = %collection, doc_id = %doc_id, "Schedule tag stored");
        Ok(TagResponse {
            status: "Tagging successful".to_string(),
            collection: collection.to_string(),
            doc_id,
        })
    }

    async fn delete(&self, collection: &str, doc_id: String) -> SchedulerResult<TagResponse> {
        self.store
            .delete(collection, &doc_id)
            .await
            .map_err(|e| store_error(collection, &doc_id, e))?;

        info!(collection = %collection, doc_id = %doc_id, "Schedule tag deleted");
        Ok(TagResponse {
            status: "Tag deleted".to_string(),
            collection: collection.to_string(),
            doc_id,
        })
    }
}

fn store_error(collection: &str, doc_id: &str, source: StoreFailure) -> SchedulerError {
    error!(collection = %collection, doc_id = %doc_id, error = %source, "Store operation failed");
    SchedulerError::Store {
        collection: collection.to_string(),
        doc_id: doc_id.to_string(),
        source,
    }
}
