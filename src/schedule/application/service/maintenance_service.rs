use crate::{
    core::{
        domain::{
            error::{ControlPlaneStep, SchedulerError, SchedulerResult},
            model::maintenance_window::{
                MaintenancePolicy, MaintenanceWindowRequest, RecurringWindow,
            },
            value_object::ClockTime,
        },
        infrastructure::control_plane::ControlPlane,
    },
    schedule::application::response::maintenance_response::MaintenanceWindowResponse,
};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Turns weekly maintenance requests into cluster maintenance policies.
pub struct MaintenanceService {
    control_plane: Arc<dyn ControlPlane>,
}

impl MaintenanceService {
    pub fn new(control_plane: Arc<dyn ControlPlane>) -> Self {
        Self { control_plane }
    }

    /// Builds the concrete window anchored on `date` (UTC).
    ///
    /// The end keeps the clock-of-day `start + duration mod 24h`. When that
    /// clock-of-day is not after the start it falls on the next day.
    pub fn compose_at(request: &MaintenanceWindowRequest, date: NaiveDate) -> RecurringWindow {
        let start_time = at_clock(date, request.start_time);
        let mut end_time = at_clock(date, request.end_time());
        if end_time <= start_time {
            end_time += TimeDelta::days(1);
        }

        RecurringWindow {
            start_time,
            end_time,
            recurrence: request.recurrence(),
        }
    }

    /// Applies the window anchored on today's UTC date.
    pub async fn schedule(
        &self,
        request: &MaintenanceWindowRequest,
    ) -> SchedulerResult<MaintenanceWindowResponse> {
        self.schedule_at(request, Utc::now().date_naive()).await
    }

    /// Reads the cluster's current resource version and submits the window
    /// with it in a single call. A stale version surfaces as a conflict and
    /// is not retried.
    pub async fn schedule_at(
        &self,
        request: &MaintenanceWindowRequest,
        date: NaiveDate,
    ) -> SchedulerResult<MaintenanceWindowResponse> {
        let cluster = request.cluster_name();
        let window = Self::compose_at(request, date);
        debug!(
            cluster = %cluster,
            start = %window.start_time,
            end = %window.end_time,
            recurrence = %window.recurrence,
            "Composed maintenance window"
        );

        let resource_version = self
            .control_plane
            .get_cluster_maintenance_policy_version(&cluster)
            .await
            .map_err(|e| {
                error!(cluster = %cluster, error = %e, "Failed to read maintenance policy");
                SchedulerError::control_plane(ControlPlaneStep::ReadMaintenancePolicy, e)
            })?;

        let policy = MaintenancePolicy {
            window,
            resource_version,
        };
        let operation = self
            .control_plane
            .set_cluster_maintenance_policy(&cluster, &policy)
            .await
            .map_err(|e| {
                error!(
                    cluster = %cluster,
                    resource_version = %policy.resource_version,
                    error = %e,
                    "Failed to set maintenance policy"
                );
                SchedulerError::control_plane(ControlPlaneStep::SetMaintenancePolicy, e)
            })?;

        info!(
            cluster = %cluster,
            recurrence = %policy.window.recurrence,
            operation = %operation.name,
            "Maintenance window set"
        );

        let MaintenancePolicy {
            window,
            resource_version,
        } = policy;
        Ok(MaintenanceWindowResponse {
            status: "Maintenance window set".to_string(),
            cluster,
            recurrence: window.recurrence,
            start_time: window.start_time,
            end_time: window.end_time,
            resource_version,
            operation: operation.name,
        })
    }
}

fn at_clock(date: NaiveDate, clock: ClockTime) -> DateTime<Utc> {
    let offset = TimeDelta::hours(i64::from(clock.hour())) + TimeDelta::minutes(i64::from(clock.minute()));
    (date.and_time(NaiveTime::MIN) + offset).and_utc()
}
