//! Node pool identity and capacity targets.

use crate::core::domain::{
    error::{SchedulerError, SchedulerResult, ValidationError},
    model::payload,
    value_object::ResourceId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fully-qualified identity of a node pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodePoolRef {
    pub project_id: ResourceId,
    pub zone: ResourceId,
    pub cluster_id: ResourceId,
    pub nodepool_id: ResourceId,
}

impl NodePoolRef {
    pub fn new(
        project_id: ResourceId,
        zone: ResourceId,
        cluster_id: ResourceId,
        nodepool_id: ResourceId,
    ) -> Self {
        Self {
            project_id,
            zone,
            cluster_id,
            nodepool_id,
        }
    }

    /// Control-plane resource name,
    /// `projects/{p}/locations/{zone}/clusters/{c}/nodePools/{np}`.
    #[must_use]
    pub fn resource_name(&self) -> String {
        format!(
            "projects/{}/locations/{}/clusters/{}/nodePools/{}",
            self.project_id, self.zone, self.cluster_id, self.nodepool_id
        )
    }
}

/// The capacity posture requested for a node pool.
///
/// Autoscaling always carries its bounds and a fixed size always carries
/// its count, so an incomplete request cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityTarget {
    /// Enable the autoscaler within `[min, max]`, optionally pinning the
    /// current size to `desired`.
    Autoscaling {
        min: u32,
        max: u32,
        desired: Option<u32>,
    },
    /// Disable the autoscaler and resize to exactly `desired` nodes.
    Fixed { desired: u32 },
}

impl CapacityTarget {
    /// Checks the presence and ordering rules for a capacity request.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Precondition` when autoscaling lacks a bound,
    /// bounds are inverted, a fixed size lacks its count, or the desired
    /// count falls outside the bounds.
    pub fn from_parts(
        enable_autoscaling: bool,
        min_nodes: Option<u32>,
        max_nodes: Option<u32>,
        desired_node_count: Option<u32>,
    ) -> SchedulerResult<Self> {
        if !enable_autoscaling {
            let desired = desired_node_count.ok_or_else(|| {
                SchedulerError::Precondition(
                    "desired_node_count is required when enable_autoscaling is false".to_string(),
                )
            })?;
            return Ok(CapacityTarget::Fixed { desired });
        }

        let (min, max) = match (min_nodes, max_nodes) {
            (Some(min), Some(max)) => (min, max),
            _ => {
                return Err(SchedulerError::Precondition(
                    "min_nodes and max_nodes are required when enable_autoscaling is true"
                        .to_string(),
                ));
            }
        };

        if min > max {
            return Err(SchedulerError::Precondition(format!(
                "min_nodes ({}) must not exceed max_nodes ({})",
                min, max
            )));
        }

        if let Some(desired) = desired_node_count {
            if desired < min || desired > max {
                return Err(SchedulerError::Precondition(format!(
                    "desired_node_count ({}) must lie between min_nodes ({}) and max_nodes ({})",
                    desired, min, max
                )));
            }
        }

        Ok(CapacityTarget::Autoscaling {
            min,
            max,
            desired: desired_node_count,
        })
    }

    #[must_use]
    pub fn autoscaling_enabled(&self) -> bool {
        matches!(self, CapacityTarget::Autoscaling { .. })
    }

    /// Node count the pool should be resized to, if any.
    #[must_use]
    pub fn desired_node_count(&self) -> Option<u32> {
        match self {
            CapacityTarget::Autoscaling { desired, .. } => *desired,
            CapacityTarget::Fixed { desired } => Some(*desired),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct NodePoolCapacityPayload {
    project_id: Option<String>,
    zone: Option<String>,
    cluster_id: Option<String>,
    nodepool_id: Option<String>,
    enable_autoscaling: Option<bool>,
    min_nodes: Option<i64>,
    max_nodes: Option<i64>,
    desired_node_count: Option<i64>,
}

/// A validated capacity request for one node pool.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePoolCapacityConfig {
    pub node_pool: NodePoolRef,
    pub target: CapacityTarget,
}

impl NodePoolCapacityConfig {
    pub fn new(node_pool: NodePoolRef, target: CapacityTarget) -> Self {
        Self { node_pool, target }
    }

    /// Builds a capacity config from an untyped JSON object.
    ///
    /// # Errors
    ///
    /// `Validation` for missing identifiers or malformed counts,
    /// `Precondition` for autoscaling/size rules.
    pub fn from_json(value: &serde_json::Value) -> SchedulerResult<Self> {
        let raw: NodePoolCapacityPayload = payload::decode(value)?;

        let node_pool = NodePoolRef::new(
            payload::required_id("project_id", raw.project_id)?,
            payload::required_id("zone", raw.zone)?,
            payload::required_id("cluster_id", raw.cluster_id)?,
            payload::required_id("nodepool_id", raw.nodepool_id)?,
        );
        let enable_autoscaling = payload::required("enable_autoscaling", raw.enable_autoscaling)?;
        let target = CapacityTarget::from_parts(
            enable_autoscaling,
            payload::node_count("min_nodes", raw.min_nodes)?,
            payload::node_count("max_nodes", raw.max_nodes)?,
            payload::node_count("desired_node_count", raw.desired_node_count)?,
        )?;

        Ok(Self { node_pool, target })
    }
}

#[derive(Debug, Default, Deserialize)]
struct NodePoolLabelsPayload {
    project_id: Option<String>,
    zone: Option<String>,
    cluster_id: Option<String>,
    nodepool_id: Option<String>,
    labels: Option<BTreeMap<String, String>>,
    fingerprint: Option<String>,
}

/// A validated request to replace the resource labels of a node pool.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePoolLabelsRequest {
    pub node_pool: NodePoolRef,
    pub labels: BTreeMap<String, String>,
    pub fingerprint: String,
}

impl NodePoolLabelsRequest {
    const MAX_LABEL_LENGTH: usize = 63;

    pub fn new(
        node_pool: NodePoolRef,
        labels: BTreeMap<String, String>,
        fingerprint: String,
    ) -> SchedulerResult<Self> {
        for (key, value) in &labels {
            validate_label(key, value)?;
        }
        if fingerprint.trim().is_empty() {
            return Err(ValidationError::field("fingerprint", "cannot be empty").into());
        }
        Ok(Self {
            node_pool,
            labels,
            fingerprint,
        })
    }

    pub fn from_json(value: &serde_json::Value) -> SchedulerResult<Self> {
        let raw: NodePoolLabelsPayload = payload::decode(value)?;
        let node_pool = NodePoolRef::new(
            payload::required_id("project_id", raw.project_id)?,
            payload::required_id("zone", raw.zone)?,
            payload::required_id("cluster_id", raw.cluster_id)?,
            payload::required_id("nodepool_id", raw.nodepool_id)?,
        );
        Self::new(
            node_pool,
            payload::required("labels", raw.labels)?,
            payload::required("fingerprint", raw.fingerprint)?,
        )
    }
}

fn is_label_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
}

fn validate_label(key: &str, value: &str) -> Result<(), ValidationError> {
    let key_ok = !key.is_empty()
        && key.len() <= NodePoolLabelsRequest::MAX_LABEL_LENGTH
        && key.starts_with(|c: char| c.is_ascii_lowercase())
        && key.chars().all(is_label_char);
    if !key_ok {
        return Err(ValidationError::format(
            "labels",
            format!(
                "key '{}' must start with a lowercase letter and use only a-z, 0-9, '_' or '-' (max {} chars)",
                key,
                NodePoolLabelsRequest::MAX_LABEL_LENGTH
            ),
        ));
    }

    if value.len() > NodePoolLabelsRequest::MAX_LABEL_LENGTH || !value.chars().all(is_label_char) {
        return Err(ValidationError::format(
            "labels",
            format!("value '{}' for key '{}' is not a valid label value", value, key),
        ));
    }
    Ok(())
}
