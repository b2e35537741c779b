//! Power operations on a single virtual machine.

use crate::core::domain::{
    error::{SchedulerResult, ValidationError},
    model::payload,
    value_object::ResourceId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The power action to perform on an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VmAction {
    Start,
    Stop,
    Restart,
}

impl VmAction {
    pub fn parse(field: &str, value: &str) -> Result<Self, ValidationError> {
        match value {
            "start" => Ok(VmAction::Start),
            "stop" => Ok(VmAction::Stop),
            "restart" => Ok(VmAction::Restart),
            other => Err(ValidationError::constraint(
                field,
                format!("unsupported action '{}', expected start, stop or restart", other),
            )),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            VmAction::Start => "start",
            VmAction::Stop => "stop",
            VmAction::Restart => "restart",
        }
    }
}

impl fmt::Display for VmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Deserialize)]
struct VmOperationPayload {
    vm_name: Option<String>,
    action: Option<String>,
    zone: Option<String>,
    project_id: Option<String>,
}

/// A validated request to start, stop or restart one instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VmOperationRequest {
    pub vm_name: ResourceId,
    pub action: VmAction,
    pub zone: ResourceId,
    pub project_id: ResourceId,
}

impl VmOperationRequest {
    pub fn new(
        project_id: ResourceId,
        zone: ResourceId,
        vm_name: ResourceId,
        action: VmAction,
    ) -> Self {
        Self {
            vm_name,
            action,
            zone,
            project_id,
        }
    }

    /// Builds a request from an untyped JSON object.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Validation` naming the first missing or
    /// invalid field.
    pub fn from_json(value: &serde_json::Value) -> SchedulerResult<Self> {
        let raw: VmOperationPayload = payload::decode(value)?;
        let action = VmAction::parse("action", &payload::required("action", raw.action)?)?;

        Ok(Self {
            vm_name: payload::required_id("vm_name", raw.vm_name)?,
            action,
            zone: payload::required_id("zone", raw.zone)?,
            project_id: payload::required_id("project_id", raw.project_id)?,
        })
    }
}
