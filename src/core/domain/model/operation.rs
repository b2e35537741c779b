use serde::{Deserialize, Serialize};

/// A long-running operation handle returned by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation identifier.
    #[serde(default)]
    pub name: String,
    /// Provider status (e.g. "RUNNING", "DONE").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Kind of operation (e.g. "SET_NODE_POOL_SIZE", "start").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    /// Link to the operation resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

impl Operation {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
