use crate::core::domain::model::vm_operation::VmAction;
use serde::Serialize;

/// Outcome of a VM power operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VmOperationResponse {
    pub status: String,
    pub project_id: String,
    pub zone: String,
    pub vm_name: String,
    pub action: VmAction,
    /// Provider operation handle
    pub operation: String,
}
