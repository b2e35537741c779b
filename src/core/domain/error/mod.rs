use std::fmt;
use thiserror::Error;

use crate::core::domain::model::resize_state::ResizeState;

/// The main error type for schedule reconciliation.
///
/// Every failure a caller can observe falls into exactly one of these
/// variants, so an ingress layer can tell a rejected payload apart from
/// a provider failure, an exhausted retry loop, or a persistence problem.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// The payload failed shape or value validation.
    ///
    /// Never reaches the control plane.
    #[error("Validation error: {source}")]
    Validation { source: ValidationError },

    /// The payload is well-formed but violates a business rule
    /// (for example autoscaling requested without bounds).
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The control plane rejected or failed a single, non-retried call.
    ///
    /// # Fields
    /// * `step` - The protocol step that failed
    /// * `source` - The provider's error, message preserved
    #[error("Control plane error during {step}: {source}")]
    ControlPlane {
        step: ControlPlaneStep,
        source: ProviderError,
    },

    /// Every bounded resize attempt failed.
    ///
    /// # Fields
    /// * `node_pool` - Full resource name of the node pool
    /// * `attempts` - Number of resize calls issued
    /// * `state` - The last state the node pool reached
    /// * `last_error` - Error returned by the final attempt
    #[error(
        "Resize of node pool '{node_pool}' gave up after {attempts} attempts (reached state: {state}): {last_error}"
    )]
    ResizeExhausted {
        node_pool: String,
        attempts: u32,
        state: ResizeState,
        #[source]
        last_error: ProviderError,
    },

    /// Persisting the desired-state record failed after the control
    /// plane change went through. The stored record is now stale.
    #[error("Store error for '{collection}/{doc_id}': {source}")]
    Store {
        collection: String,
        doc_id: String,
        source: StoreFailure,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SchedulerError {
    /// Returns true for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SchedulerError::Validation { .. } | SchedulerError::Precondition(_)
        )
    }

    pub(crate) fn control_plane(step: ControlPlaneStep, source: ProviderError) -> Self {
        SchedulerError::ControlPlane { step, source }
    }
}

impl From<ValidationError> for SchedulerError {
    fn from(error: ValidationError) -> Self {
        SchedulerError::Validation { source: error }
    }
}

/// Specialized error type for validation failures.
///
/// Each variant names the offending field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A field is missing or its value is not acceptable
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// A field does not follow the required textual format
    #[error("Field '{field}' has invalid format: {message}")]
    Format { field: String, message: String },

    /// A field value lies outside the permitted domain
    #[error("Field '{field}' violates a domain constraint: {message}")]
    ConstraintViolation { field: String, message: String },

    /// One or more weekday codes are not recognized. Lists all of them.
    #[error("Field '{field}' contains invalid days: {}", .codes.join(", "))]
    InvalidDays { field: String, codes: Vec<String> },
}

impl ValidationError {
    pub(crate) fn field(field: &str, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn format(field: &str, message: impl Into<String>) -> Self {
        ValidationError::Format {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn constraint(field: &str, message: impl Into<String>) -> Self {
        ValidationError::ConstraintViolation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Name of the field that failed validation.
    pub fn field_name(&self) -> &str {
        match self {
            ValidationError::Field { field, .. }
            | ValidationError::Format { field, .. }
            | ValidationError::ConstraintViolation { field, .. }
            | ValidationError::InvalidDays { field, .. } => field,
        }
    }
}

/// Errors reported by a control plane implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The request never produced an HTTP response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A concurrency token was stale
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The response body could not be decoded
    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Errors reported by a schedule store implementation.
#[derive(Error, Debug)]
pub enum StoreFailure {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// The control-plane call a `ControlPlane` error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPlaneStep {
    StartInstance,
    StopInstance,
    RestartInstance,
    SetAutoscaling,
    SetSize,
    SetLabels,
    ReadMaintenancePolicy,
    SetMaintenancePolicy,
}

impl fmt::Display for ControlPlaneStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlPlaneStep::StartInstance => "startInstance",
            ControlPlaneStep::StopInstance => "stopInstance",
            ControlPlaneStep::RestartInstance => "restartInstance",
            ControlPlaneStep::SetAutoscaling => "setNodePoolAutoscaling",
            ControlPlaneStep::SetSize => "setNodePoolSize",
            ControlPlaneStep::SetLabels => "setNodePoolLabels",
            ControlPlaneStep::ReadMaintenancePolicy => "getClusterMaintenancePolicyVersion",
            ControlPlaneStep::SetMaintenancePolicy => "setClusterMaintenancePolicy",
        };
        f.write_str(name)
    }
}

/// Type alias for Results that may fail with a SchedulerError
pub type SchedulerResult<T> = Result<T, SchedulerError>;
