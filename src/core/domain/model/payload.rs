//! Helpers for turning untyped JSON payloads into validated models.
//!
//! Every payload is first decoded into a loose struct whose fields are all
//! optional, so a missing field is reported by name instead of as a serde
//! error. Unknown fields are ignored.

use crate::core::domain::{error::ValidationError, value_object::ResourceId};
use chrono::{DateTime, FixedOffset, Utc};
use serde::de::DeserializeOwned;

/// Decodes the loose payload struct, mapping type mismatches to `Format` errors.
pub(crate) fn decode<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T, ValidationError> {
    if !value.is_object() {
        return Err(ValidationError::format("payload", "must be a JSON object"));
    }
    T::deserialize(value).map_err(|e| ValidationError::format("payload", e.to_string()))
}

/// Unwraps a required field.
pub(crate) fn required<T>(field: &str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::field(field, "is required"))
}

/// Unwraps and validates a required identifier field.
pub(crate) fn required_id(field: &str, value: Option<String>) -> Result<ResourceId, ValidationError> {
    ResourceId::new(field, required(field, value)?)
}

/// Converts an optional node count, rejecting negative values.
pub(crate) fn node_count(field: &str, value: Option<i64>) -> Result<Option<u32>, ValidationError> {
    value
        .map(|n| {
            u32::try_from(n).map_err(|_| {
                ValidationError::constraint(field, format!("must be a non-negative count, got {}", n))
            })
        })
        .transpose()
}

/// Parses an ISO 8601 / RFC 3339 timestamp, defaulting to now (UTC) when
/// absent. The offset of the input is kept.
pub(crate) fn timestamp_or_now(
    field: &str,
    value: Option<String>,
) -> Result<DateTime<FixedOffset>, ValidationError> {
    match value {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .map_err(|e| ValidationError::format(field, format!("'{}' is not ISO 8601: {}", raw, e))),
        None => Ok(Utc::now().fixed_offset()),
    }
}

/// Returns the author of a change, defaulting to `system`.
pub(crate) fn author_or_system(value: Option<String>) -> String {
    match value {
        Some(author) if !author.trim().is_empty() => author,
        _ => "system".to_string(),
    }
}
