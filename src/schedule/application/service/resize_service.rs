use super::retry::{Exhausted, retry_with_backoff};
use crate::{
    config::RetryConfig,
    core::{
        domain::{
            error::{ControlPlaneStep, SchedulerError, SchedulerResult},
            model::{
                node_pool::{CapacityTarget, NodePoolCapacityConfig, NodePoolLabelsRequest},
                resize_state::ResizeState,
            },
        },
        infrastructure::control_plane::ControlPlane,
    },
    schedule::application::response::node_pool_response::{
        NodePoolCapacityResponse, NodePoolLabelsResponse,
    },
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Drives a node pool to a requested capacity.
///
/// The autoscaler is configured first with a single call, then the pool is
/// resized under the retry policy. The two calls are not atomic: if the
/// resize is exhausted the pool stays in `ResizeState::AutoscalingSet` and
/// re-submitting the same config converges.
pub struct ResizeService {
    control_plane: Arc<dyn ControlPlane>,
    retry: RetryConfig,
}

impl ResizeService {
    pub fn new(control_plane: Arc<dyn ControlPlane>, retry: RetryConfig) -> Self {
        Self {
            control_plane,
            retry,
        }
    }

    pub async fn apply(
        &self,
        config: &NodePoolCapacityConfig,
    ) -> SchedulerResult<NodePoolCapacityResponse> {
        let name = config.node_pool.resource_name();

        let (min_nodes, max_nodes) = match config.target {
            CapacityTarget::Autoscaling { min, max, .. } => (Some(min), Some(max)),
            CapacityTarget::Fixed { .. } => (None, None),
        };
        let enabled = config.target.autoscaling_enabled();

        debug!(node_pool = %name, enabled, ?min_nodes, ?max_nodes, "Configuring autoscaler");
        self.control_plane
            .set_node_pool_autoscaling(&name, enabled, min_nodes, max_nodes)
            .await
            .map_err(|e| {
                error!(node_pool = %name, error = %e, "Failed to configure autoscaler");
                SchedulerError::control_plane(ControlPlaneStep::SetAutoscaling, e)
            })?;

        let mut state = ResizeState::AutoscalingSet;
        info!(
            node_pool = %name,
            enabled,
            state = %state,
            "Autoscaler configured"
        );

        let mut resize_attempts = 0;
        let node_count = config.target.desired_node_count();
        if let Some(count) = node_count {
            let control_plane = &self.control_plane;
            let pool = name.as_str();
            let result = retry_with_backoff(&self.retry, "set_node_pool_size", move |attempt| {
                debug!(node_pool = %pool, node_count = count, attempt, "Resizing node pool");
                control_plane.set_node_pool_size(pool, count)
            })
            .await;

            match result {
                Ok((_, attempts)) => {
                    resize_attempts = attempts;
                    state = ResizeState::Resized;
                    info!(
                        node_pool = %name,
                        node_count = count,
                        attempts,
                        state = %state,
                        "Node pool resized"
                    );
                }
                Err(Exhausted {
                    attempts,
                    last_error,
                }) => {
                    error!(
                        node_pool = %name,
                        node_count = count,
                        attempts,
                        state = %state,
                        error = %last_error,
                        "Giving up on node pool resize"
                    );
                    return Err(SchedulerError::ResizeExhausted {
                        node_pool: name,
                        attempts,
                        state,
                        last_error,
                    });
                }
            }
        }

        Ok(NodePoolCapacityResponse {
            status: "Node pool updated".to_string(),
            node_pool: name,
            state,
            autoscaling_enabled: enabled,
            min_nodes,
            max_nodes,
            node_count,
            resize_attempts,
        })
    }

    /// Replaces the resource labels of a node pool. Not retried.
    pub async fn label(&self, request: &NodePoolLabelsRequest) -> SchedulerResult<NodePoolLabelsResponse> {
        let name = request.node_pool.resource_name();

        let operation = self
            .control_plane
            .set_node_pool_labels(&name, &request.labels, &request.fingerprint)
            .await
            .map_err(|e| {
                error!(node_pool = %name, error = %e, "Failed to update node pool labels");
                SchedulerError::control_plane(ControlPlaneStep::SetLabels, e)
            })?;

        info!(
            node_pool = %name,
            label_count = request.labels.len(),
            operation = %operation.name,
            "Node pool labels updated"
        );

        Ok(NodePoolLabelsResponse {
            status: "Node pool labels updated".to_string(),
            node_pool: name,
            label_count: request.labels.len(),
            operation: operation.name,
        })
    }
}
