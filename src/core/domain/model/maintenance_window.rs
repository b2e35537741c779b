//! Weekly maintenance windows for managed clusters.

use crate::core::domain::{
    error::SchedulerResult,
    model::payload,
    value_object::{ClockTime, Frequency, ResourceId, WeekDay, WindowDuration, serde_helpers},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
struct MaintenanceWindowPayload {
    project_id: Option<String>,
    location: Option<String>,
    cluster_id: Option<String>,
    frequency: Option<String>,
    byday: Option<Vec<String>>,
    start_time: Option<String>,
    duration_hours: Option<i64>,
}

/// A validated weekly maintenance window for one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceWindowRequest {
    pub project_id: ResourceId,
    pub location: ResourceId,
    pub cluster_id: ResourceId,
    pub frequency: Frequency,
    pub byday: Vec<WeekDay>,
    #[serde(with = "serde_helpers::clock_hm")]
    pub start_time: ClockTime,
    #[serde(serialize_with = "serialize_duration")]
    pub duration_hours: WindowDuration,
}

fn serialize_duration<S>(duration: &WindowDuration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u8(duration.hours())
}

impl MaintenanceWindowRequest {
    /// Builds a request from an untyped JSON object.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Validation` if the frequency is not
    /// `WEEKLY`, any day code is unknown (all of them are listed), the
    /// start time is not `HH:MM`, or the duration is outside 4..=24 hours.
    pub fn from_json(value: &serde_json::Value) -> SchedulerResult<Self> {
        let raw: MaintenanceWindowPayload = payload::decode(value)?;

        Ok(Self {
            project_id: payload::required_id("project_id", raw.project_id)?,
            location: payload::required_id("location", raw.location)?,
            cluster_id: payload::required_id("cluster_id", raw.cluster_id)?,
            frequency: Frequency::parse(
                "frequency",
                &payload::required("frequency", raw.frequency)?,
            )?,
            byday: WeekDay::parse_codes("byday", &payload::required("byday", raw.byday)?)?,
            start_time: ClockTime::parse_hh_mm(
                "start_time",
                &payload::required("start_time", raw.start_time)?,
            )?,
            duration_hours: WindowDuration::new(
                "duration_hours",
                payload::required("duration_hours", raw.duration_hours)?,
            )?,
        })
    }

    /// `projects/{project_id}/locations/{location}/clusters/{cluster_id}`.
    #[must_use]
    pub fn cluster_name(&self) -> String {
        format!(
            "projects/{}/locations/{}/clusters/{}",
            self.project_id, self.location, self.cluster_id
        )
    }

    /// Clock-of-day at which the window closes.
    #[must_use]
    pub fn end_time(&self) -> ClockTime {
        self.start_time.plus_hours(self.duration_hours.hours())
    }

    /// RFC 5545 recurrence rule, e.g. `FREQ=WEEKLY;BYDAY=MO,TH`.
    #[must_use]
    pub fn recurrence(&self) -> String {
        let days: Vec<&str> = self.byday.iter().map(WeekDay::code).collect();
        format!("FREQ={};BYDAY={}", self.frequency, days.join(","))
    }
}

/// A concrete time window that repeats according to `recurrence`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurringWindow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub recurrence: String,
}

/// Maintenance policy submitted to the control plane.
///
/// `resource_version` is the concurrency token read just before the write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenancePolicy {
    pub window: RecurringWindow,
    pub resource_version: String,
}
