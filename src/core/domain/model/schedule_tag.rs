//! Persisted schedule tags for node pools and virtual machines.
//!
//! A tag is the desired-state record an operator attaches to a resource.
//! Tags are always written whole and deleted by identity; they are never
//! patched in place.

use crate::core::domain::{
    error::{SchedulerResult, ValidationError},
    model::{
        node_pool::{CapacityTarget, NodePoolCapacityConfig, NodePoolRef},
        payload,
        vm_operation::{VmAction, VmOperationRequest},
    },
    value_object::{CapacityTriple, ClockTime, ResourceId, Timezone, WeekDay, serde_helpers},
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Which half of a schedule is being enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulePhase {
    BusinessHours,
    OffHours,
}

/// The recurring working-hours window of a schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessHours {
    #[serde(with = "serde_helpers::iso_days")]
    pub days: Vec<WeekDay>,
    #[serde(with = "serde_helpers::clock_hms")]
    pub starttime: ClockTime,
    #[serde(with = "serde_helpers::clock_hms")]
    pub endtime: ClockTime,
    pub timezone: Timezone,
}

#[derive(Debug, Default, Deserialize)]
struct BusinessHoursPayload {
    days: Option<Vec<i64>>,
    starttime: Option<String>,
    endtime: Option<String>,
    timezone: Option<String>,
}

impl BusinessHoursPayload {
    fn validate(self) -> Result<BusinessHours, ValidationError> {
        let days = WeekDay::parse_iso_numbers("days", &payload::required("days", self.days)?)?;
        let starttime =
            ClockTime::parse_hh_mm_ss("starttime", &payload::required("starttime", self.starttime)?)?;
        let endtime =
            ClockTime::parse_hh_mm_ss("endtime", &payload::required("endtime", self.endtime)?)?;
        if starttime == endtime {
            return Err(ValidationError::constraint(
                "endtime",
                "must differ from starttime",
            ));
        }
        let timezone = Timezone::new("timezone", payload::required("timezone", self.timezone)?)?;

        Ok(BusinessHours {
            days,
            starttime,
            endtime,
            timezone,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct NodePoolScheduleTagPayload {
    project_id: Option<String>,
    zone: Option<String>,
    cluster_id: Option<String>,
    nodepool_id: Option<String>,
    enable_autoscaling: Option<bool>,
    business_hours_config: Option<String>,
    off_hours_config: Option<String>,
    business_hours: Option<BusinessHoursPayload>,
    updated_on: Option<String>,
    updated_by: Option<String>,
}

/// Desired business-hours / off-hours capacity of a node pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePoolScheduleTag {
    pub project_id: ResourceId,
    pub zone: ResourceId,
    pub cluster_id: ResourceId,
    pub nodepool_id: ResourceId,
    pub enable_autoscaling: bool,
    pub business_hours_config: CapacityTriple,
    pub off_hours_config: CapacityTriple,
    pub business_hours: BusinessHours,
    #[serde(serialize_with = "serde_helpers::rfc3339::serialize")]
    pub updated_on: DateTime<FixedOffset>,
    pub updated_by: String,
}

impl NodePoolScheduleTag {
    pub fn from_json(value: &serde_json::Value) -> SchedulerResult<Self> {
        let raw: NodePoolScheduleTagPayload = payload::decode(value)?;

        Ok(Self {
            project_id: payload::required_id("project_id", raw.project_id)?,
            zone: payload::required_id("zone", raw.zone)?,
            cluster_id: payload::required_id("cluster_id", raw.cluster_id)?,
            nodepool_id: payload::required_id("nodepool_id", raw.nodepool_id)?,
            enable_autoscaling: payload::required("enable_autoscaling", raw.enable_autoscaling)?,
            business_hours_config: CapacityTriple::parse(
                "business_hours_config",
                &payload::required("business_hours_config", raw.business_hours_config)?,
            )?,
            off_hours_config: CapacityTriple::parse(
                "off_hours_config",
                &payload::required("off_hours_config", raw.off_hours_config)?,
            )?,
            business_hours: payload::required("business_hours", raw.business_hours)?.validate()?,
            updated_on: payload::timestamp_or_now("updated_on", raw.updated_on)?,
            updated_by: payload::author_or_system(raw.updated_by),
        })
    }

    /// Store document id, `{project_id}__{cluster_id}__{nodepool_id}`.
    #[must_use]
    pub fn document_id(&self) -> String {
        node_pool_document_id(&self.project_id, &self.cluster_id, &self.nodepool_id)
    }

    #[must_use]
    pub fn node_pool(&self) -> NodePoolRef {
        NodePoolRef::new(
            self.project_id.clone(),
            self.zone.clone(),
            self.cluster_id.clone(),
            self.nodepool_id.clone(),
        )
    }

    #[must_use]
    pub fn triple_for(&self, phase: SchedulePhase) -> CapacityTriple {
        match phase {
            SchedulePhase::BusinessHours => self.business_hours_config,
            SchedulePhase::OffHours => self.off_hours_config,
        }
    }

    /// The capacity request that enforces this tag during `phase`.
    ///
    /// A phase whose maximum is zero disables the autoscaler and pins the
    /// pool to zero nodes, since an autoscaler cannot hold an empty range.
    #[must_use]
    pub fn capacity_for(&self, phase: SchedulePhase) -> NodePoolCapacityConfig {
        let triple = self.triple_for(phase);
        let target = if self.enable_autoscaling && triple.max() > 0 {
            CapacityTarget::Autoscaling {
                min: triple.min(),
                max: triple.max(),
                desired: Some(triple.desired()),
            }
        } else {
            CapacityTarget::Fixed {
                desired: triple.desired(),
            }
        };
        NodePoolCapacityConfig::new(self.node_pool(), target)
    }
}

/// Store document id of a node pool tag.
pub fn node_pool_document_id(
    project_id: &ResourceId,
    cluster_id: &ResourceId,
    nodepool_id: &ResourceId,
) -> String {
    format!("{}__{}__{}", project_id, cluster_id, nodepool_id)
}

#[derive(Debug, Default, Deserialize)]
struct VmScheduleTagPayload {
    project_id: Option<String>,
    zone: Option<String>,
    instance_name: Option<String>,
    #[serde(flatten)]
    hours: BusinessHoursPayload,
    updated_on: Option<String>,
    updated_by: Option<String>,
}

/// Working-hours power schedule of a virtual machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VmScheduleTag {
    pub project_id: ResourceId,
    pub zone: ResourceId,
    pub instance_name: ResourceId,
    #[serde(flatten)]
    pub hours: BusinessHours,
    #[serde(serialize_with = "serde_helpers::rfc3339::serialize")]
    pub updated_on: DateTime<FixedOffset>,
    pub updated_by: String,
}

impl VmScheduleTag {
    pub fn from_json(value: &serde_json::Value) -> SchedulerResult<Self> {
        let raw: VmScheduleTagPayload = payload::decode(value)?;

        Ok(Self {
            project_id: payload::required_id("project_id", raw.project_id)?,
            zone: payload::required_id("zone", raw.zone)?,
            instance_name: payload::required_id("instance_name", raw.instance_name)?,
            hours: raw.hours.validate()?,
            updated_on: payload::timestamp_or_now("updated_on", raw.updated_on)?,
            updated_by: payload::author_or_system(raw.updated_by),
        })
    }

    /// Store document id, `{project_id}__{instance_name}`.
    #[must_use]
    pub fn document_id(&self) -> String {
        vm_document_id(&self.project_id, &self.instance_name)
    }

    /// The power operation that enforces this tag during `phase`.
    #[must_use]
    pub fn operation_for(&self, phase: SchedulePhase) -> VmOperationRequest {
        let action = match phase {
            SchedulePhase::BusinessHours => VmAction::Start,
            SchedulePhase::OffHours => VmAction::Stop,
        };
        VmOperationRequest::new(
            self.project_id.clone(),
            self.zone.clone(),
            self.instance_name.clone(),
            action,
        )
    }
}

/// Store document id of a VM tag.
pub fn vm_document_id(project_id: &ResourceId, instance_name: &ResourceId) -> String {
    format!("{}__{}", project_id, instance_name)
}
