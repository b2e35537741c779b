//! Capability surface the reconciler needs from a cloud control plane.

use crate::core::domain::{
    error::ProviderError,
    model::{maintenance_window::MaintenancePolicy, operation::Operation},
};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::collections::BTreeMap;

/// Trait abstracting control-plane calls.
///
/// Implementations are long-lived, stateless connection wrappers shared by
/// every in-flight request, so they must be `Send + Sync`. Tests substitute
/// a mock.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ControlPlane: Send + Sync {
    async fn start_instance(
        &self,
        project: &str,
        zone: &str,
        instance: &str,
    ) -> Result<Operation, ProviderError>;

    async fn stop_instance(
        &self,
        project: &str,
        zone: &str,
        instance: &str,
    ) -> Result<Operation, ProviderError>;

    async fn restart_instance(
        &self,
        project: &str,
        zone: &str,
        instance: &str,
    ) -> Result<Operation, ProviderError>;

    /// Enables or disables the node pool autoscaler. Bounds are only sent
    /// when enabling.
    async fn set_node_pool_autoscaling(
        &self,
        node_pool: &str,
        enabled: bool,
        min_nodes: Option<u32>,
        max_nodes: Option<u32>,
    ) -> Result<Operation, ProviderError>;

    async fn set_node_pool_size(
        &self,
        node_pool: &str,
        node_count: u32,
    ) -> Result<Operation, ProviderError>;

    /// Replaces the node pool's resource labels. `fingerprint` guards
    /// against concurrent label edits.
    async fn set_node_pool_labels(
        &self,
        node_pool: &str,
        labels: &BTreeMap<String, String>,
        fingerprint: &str,
    ) -> Result<Operation, ProviderError>;

    /// Reads the cluster's current maintenance-policy `resource_version`.
    async fn get_cluster_maintenance_policy_version(
        &self,
        cluster: &str,
    ) -> Result<String, ProviderError>;

    /// Submits a maintenance policy. A stale `resource_version` must be
    /// reported as `ProviderError::Conflict`.
    async fn set_cluster_maintenance_policy(
        &self,
        cluster: &str,
        policy: &MaintenancePolicy,
    ) -> Result<Operation, ProviderError>;
}
