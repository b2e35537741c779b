use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of a maintenance window update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceWindowResponse {
    pub status: String,
    pub cluster: String,
    pub recurrence: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Concurrency token the update was submitted with
    pub resource_version: String,
    pub operation: String,
}
