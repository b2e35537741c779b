use crate::core::domain::error::ValidationError;
use serde::Serialize;
use std::fmt;

/// A validated cloud resource identifier (project, zone, cluster, node pool, instance).
///
/// Identifiers are interpolated into resource paths, so they must be
/// non-empty and contain neither `/` nor whitespace. They are also joined
/// with `__` into store document ids, so `__` and a leading or trailing `_`
/// are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    const MAX_LENGTH: usize = 128;

    /// Creates a validated identifier for the named field.
    pub fn new(field: &str, value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        validate_resource_id(field, &value)?;
        Ok(Self(value))
    }

    /// Creates an identifier without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates a resource identifier.
pub(crate) fn validate_resource_id(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::field(field, "cannot be empty"));
    }

    if value.len() > ResourceId::MAX_LENGTH {
        return Err(ValidationError::constraint(
            field,
            format!("must be at most {} characters", ResourceId::MAX_LENGTH),
        ));
    }

    if value.chars().any(|c| c == '/' || c.is_whitespace()) {
        return Err(ValidationError::format(
            field,
            "must not contain '/' or whitespace",
        ));
    }

    if value.contains("__") || value.starts_with('_') || value.ends_with('_') {
        return Err(ValidationError::format(
            field,
            "must not contain '__' or start or end with '_'",
        ));
    }

    Ok(())
}
