use crate::{
    core::{
        domain::{
            error::{ControlPlaneStep, SchedulerError, SchedulerResult},
            model::vm_operation::{VmAction, VmOperationRequest},
        },
        infrastructure::control_plane::ControlPlane,
    },
    schedule::application::response::vm_operation_response::VmOperationResponse,
};
use std::sync::Arc;
use tracing::{error, info};

/// Dispatches VM power actions to the control plane.
///
/// Each action maps to exactly one call, issued once. Provider failures
/// surface as `SchedulerError::ControlPlane`.
pub struct PowerService {
    control_plane: Arc<dyn ControlPlane>,
}

impl PowerService {
    pub fn new(control_plane: Arc<dyn ControlPlane>) -> Self {
        Self { control_plane }
    }

    pub async fn execute(&self, request: &VmOperationRequest) -> SchedulerResult<VmOperationResponse> {
        let project = request.project_id.as_str();
        let zone = request.zone.as_str();
        let instance = request.vm_name.as_str();

        let (step, result) = match request.action {
            VmAction::Start => (
                ControlPlaneStep::StartInstance,
                self.control_plane.start_instance(project, zone, instance).await,
            ),
            VmAction::Stop => (
                ControlPlaneStep::StopInstance,
                self.control_plane.stop_instance(project, zone, instance).await,
            ),
            VmAction::Restart => (
                ControlPlaneStep::RestartInstance,
                self.control_plane.restart_instance(project, zone, instance).await,
            ),
        };

        let operation = result.map_err(|e| {
            error!(
                project = %project,
                zone = %zone,
                instance = %instance,
                action = %request.action,
                error = %e,
                "VM operation failed"
            );
            SchedulerError::control_plane(step, e)
        })?;

        info!(
            project = %project,
            zone = %zone,
            instance = %instance,
            action = %request.action,
            operation = %operation.name,
            "Requested VM operation"
        );

        Ok(VmOperationResponse {
            status: "VM operation initiated".to_string(),
            project_id: project.to_string(),
            zone: zone.to_string(),
            vm_name: instance.to_string(),
            action: request.action,
            operation: operation.name,
        })
    }
}
