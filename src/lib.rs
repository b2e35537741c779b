//! Schedule-driven power and capacity reconciliation for cloud VMs and
//! managed-cluster node pools.

pub mod config;
mod core;
mod schedule;
pub mod telemetry;

pub use crate::config::{RateLimitConfig, RetryConfig, SchedulerConfig};
pub use crate::core::domain::error::{
    ControlPlaneStep, ProviderError, SchedulerError, SchedulerResult, StoreFailure,
    ValidationError,
};
pub use crate::core::domain::model::{
    maintenance_window::{MaintenancePolicy, MaintenanceWindowRequest, RecurringWindow},
    node_pool::{CapacityTarget, NodePoolCapacityConfig, NodePoolLabelsRequest, NodePoolRef},
    operation::Operation,
    resize_state::ResizeState,
    schedule_tag::{BusinessHours, NodePoolScheduleTag, SchedulePhase, VmScheduleTag},
    vm_operation::{VmAction, VmOperationRequest},
};
pub use crate::core::domain::value_object::{
    CapacityTriple, ClockTime, Frequency, ResourceId, Timezone, WeekDay, WindowDuration,
};
pub use crate::core::infrastructure::{
    api_client::GcpApiClient,
    control_plane::ControlPlane,
    store::{FileStore, MemoryStore, ScheduleStore},
};
pub use crate::schedule::application::response::{
    maintenance_response::MaintenanceWindowResponse,
    node_pool_response::{NodePoolCapacityResponse, NodePoolLabelsResponse},
    tag_response::TagResponse,
    vm_operation_response::VmOperationResponse,
};

use crate::schedule::application::service::{
    maintenance_service::MaintenanceService, power_service::PowerService,
    resize_service::ResizeService, tagging_service::TaggingService,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

/// Entry point for reconciling VMs, node pools and cluster maintenance
/// windows against a control plane.
///
/// Every operation is a one-shot "apply this desired state now". Payload
/// entry points accept untyped JSON, validate it fully, and only then touch
/// the control plane or the store.
///
/// # Examples
///
/// ```no_run
/// use power_scheduler::{PowerScheduler, SchedulerConfig, SchedulerResult};
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> SchedulerResult<()> {
///     let config = SchedulerConfig::from_env()?;
///     let scheduler = PowerScheduler::from_config(config)?;
///
///     let response = scheduler
///         .vm_operation(&json!({
///             "vm_name": "test-vm",
///             "action": "stop",
///             "zone": "us-central1-a",
///             "project_id": "my-project"
///         }))
///         .await?;
///     println!("{}", response.operation);
///     Ok(())
/// }
/// ```
pub struct PowerScheduler {
    power: PowerService,
    resize: ResizeService,
    maintenance: MaintenanceService,
    tagging: TaggingService,
}

/// Builder for PowerScheduler configuration
#[derive(Default)]
pub struct PowerSchedulerBuilder {
    config: Option<SchedulerConfig>,
    control_plane: Option<Arc<dyn ControlPlane>>,
    store: Option<Arc<dyn ScheduleStore>>,
}

impl PowerSchedulerBuilder {
    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the control plane. Defaults to a `GcpApiClient`.
    pub fn control_plane(mut self, control_plane: Arc<dyn ControlPlane>) -> Self {
        self.control_plane = Some(control_plane);
        self
    }

    /// Overrides the tag store. Defaults to a `FileStore` under
    /// `store_dir`, or a `MemoryStore` when no directory is configured.
    pub fn store(mut self, store: Arc<dyn ScheduleStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> SchedulerResult<PowerScheduler> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let control_plane: Arc<dyn ControlPlane> = match self.control_plane {
            Some(control_plane) => control_plane,
            None => Arc::new(GcpApiClient::new(&config)?),
        };
        let store: Arc<dyn ScheduleStore> = match self.store {
            Some(store) => store,
            None => match &config.store_dir {
                Some(dir) => Arc::new(FileStore::new(dir.clone())),
                None => Arc::new(MemoryStore::new()),
            },
        };

        debug!(
            project = %config.project_id,
            environment = %config.environment,
            max_attempts = config.resize_retry.max_attempts,
            "Building scheduler"
        );

        Ok(PowerScheduler {
            power: PowerService::new(Arc::clone(&control_plane)),
            resize: ResizeService::new(Arc::clone(&control_plane), config.resize_retry.clone()),
            maintenance: MaintenanceService::new(control_plane),
            tagging: TaggingService::new(store, config.nodepool_collection, config.vm_collection),
        })
    }
}

impl PowerScheduler {
    /// Creates a new builder for PowerScheduler configuration
    pub fn builder() -> PowerSchedulerBuilder {
        PowerSchedulerBuilder::default()
    }

    /// Builds a scheduler with the default adapters for `config`.
    pub fn from_config(config: SchedulerConfig) -> SchedulerResult<Self> {
        Self::builder().config(config).build()
    }

    /// Starts, stops or restarts one VM.
    ///
    /// # Errors
    ///
    /// `Validation` for a malformed payload or unknown action (no call is
    /// made), `ControlPlane` if the provider rejects the call.
    pub async fn vm_operation(&self, payload: &serde_json::Value) -> SchedulerResult<VmOperationResponse> {
        let request = VmOperationRequest::from_json(payload)?;
        self.power.execute(&request).await
    }

    /// Drives a node pool to the capacity described by `payload`.
    ///
    /// # Errors
    ///
    /// `Validation`/`Precondition` before any call, `ControlPlane` if the
    /// autoscaler update fails, `ResizeExhausted` if every resize attempt
    /// fails.
    pub async fn apply_capacity(
        &self,
        payload: &serde_json::Value,
    ) -> SchedulerResult<NodePoolCapacityResponse> {
        let config = NodePoolCapacityConfig::from_json(payload)?;
        self.resize.apply(&config).await
    }

    /// Replaces the resource labels of a node pool.
    pub async fn label_node_pool(
        &self,
        payload: &serde_json::Value,
    ) -> SchedulerResult<NodePoolLabelsResponse> {
        let request = NodePoolLabelsRequest::from_json(payload)?;
        self.resize.label(&request).await
    }

    /// Sets a weekly maintenance window on a cluster, anchored on today's
    /// UTC date.
    pub async fn schedule_maintenance(
        &self,
        payload: &serde_json::Value,
    ) -> SchedulerResult<MaintenanceWindowResponse> {
        let request = MaintenanceWindowRequest::from_json(payload)?;
        self.maintenance.schedule(&request).await
    }

    /// Like [`PowerScheduler::schedule_maintenance`], anchored on `date`.
    pub async fn schedule_maintenance_at(
        &self,
        payload: &serde_json::Value,
        date: NaiveDate,
    ) -> SchedulerResult<MaintenanceWindowResponse> {
        let request = MaintenanceWindowRequest::from_json(payload)?;
        self.maintenance.schedule_at(&request, date).await
    }

    /// Validates and stores a node pool schedule tag, replacing any
    /// previous tag for the same node pool.
    pub async fn tag_node_pool(&self, payload: &serde_json::Value) -> SchedulerResult<TagResponse> {
        let tag = NodePoolScheduleTag::from_json(payload)?;
        self.tagging.put_node_pool_tag(&tag).await
    }

    pub async fn untag_node_pool(
        &self,
        project_id: &str,
        cluster_id: &str,
        nodepool_id: &str,
    ) -> SchedulerResult<TagResponse> {
        self.tagging
            .delete_node_pool_tag(
                &ResourceId::new("project_id", project_id)?,
                &ResourceId::new("cluster_id", cluster_id)?,
                &ResourceId::new("nodepool_id", nodepool_id)?,
            )
            .await
    }

    /// Validates and stores a VM schedule tag, replacing any previous tag
    /// for the same instance.
    pub async fn tag_vm(&self, payload: &serde_json::Value) -> SchedulerResult<TagResponse> {
        let tag = VmScheduleTag::from_json(payload)?;
        self.tagging.put_vm_tag(&tag).await
    }

    pub async fn untag_vm(&self, project_id: &str, instance_name: &str) -> SchedulerResult<TagResponse> {
        self.tagging
            .delete_vm_tag(
                &ResourceId::new("project_id", project_id)?,
                &ResourceId::new("instance_name", instance_name)?,
            )
            .await
    }

    /// Enforces one phase of a node pool schedule tag.
    pub async fn apply_node_pool_phase(
        &self,
        tag: &NodePoolScheduleTag,
        phase: SchedulePhase,
    ) -> SchedulerResult<NodePoolCapacityResponse> {
        let config = tag.capacity_for(phase);
        info!(
            node_pool = %config.node_pool.resource_name(),
            phase = ?phase,
            triple = %tag.triple_for(phase),
            "Applying node pool schedule"
        );
        self.resize.apply(&config).await
    }

    /// Enforces one phase of a VM schedule tag: start for business hours,
    /// stop otherwise.
    pub async fn apply_vm_phase(
        &self,
        tag: &VmScheduleTag,
        phase: SchedulePhase,
    ) -> SchedulerResult<VmOperationResponse> {
        let request = tag.operation_for(phase);
        info!(
            instance = %request.vm_name,
            phase = ?phase,
            action = %request.action,
            "Applying VM schedule"
        );
        self.power.execute(&request).await
    }

    /// Validates a node pool schedule tag, enforces `phase` on the node
    /// pool, and stores the tag once the control plane accepted the change.
    ///
    /// # Errors
    ///
    /// Nothing is stored when validation or the resize protocol fails. A
    /// `Store` error means the node pool already reflects the tag but the
    /// record was not written; the change is not rolled back.
    pub async fn apply_node_pool_tag(
        &self,
        payload: &serde_json::Value,
        phase: SchedulePhase,
    ) -> SchedulerResult<NodePoolCapacityResponse> {
        let tag = NodePoolScheduleTag::from_json(payload)?;
        let response = self.apply_node_pool_phase(&tag, phase).await?;
        self.tagging.put_node_pool_tag(&tag).await?;
        Ok(response)
    }

    /// VM counterpart of [`PowerScheduler::apply_node_pool_tag`].
    pub async fn apply_vm_tag(
        &self,
        payload: &serde_json::Value,
        phase: SchedulePhase,
    ) -> SchedulerResult<VmOperationResponse> {
        let tag = VmScheduleTag::from_json(payload)?;
        let response = self.apply_vm_phase(&tag, phase).await?;
        self.tagging.put_vm_tag(&tag).await?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests;
