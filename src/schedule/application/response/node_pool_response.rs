use crate::core::domain::model::resize_state::ResizeState;
use serde::Serialize;

/// Outcome of a node pool capacity change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePoolCapacityResponse {
    pub status: String,
    /// Full resource name of the node pool
    pub node_pool: String,
    pub state: ResizeState,
    pub autoscaling_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_nodes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_nodes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_count: Option<u32>,
    /// Resize calls issued (0 when no resize was requested)
    pub resize_attempts: u32,
}

/// Outcome of a node pool label update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePoolLabelsResponse {
    pub status: String,
    pub node_pool: String,
    pub label_count: usize,
    pub operation: String,
}
