use crate::core::domain::error::ValidationError;
use serde::Serialize;
use std::fmt;

/// An IANA time zone name such as `Europe/Madrid` or `UTC`.
///
/// Only the shape of the name is checked; resolving it is left to the
/// external trigger that fires the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timezone(String);

impl Timezone {
    const SINGLE_SEGMENT: [&'static str; 2] = ["UTC", "GMT"];

    pub fn new(field: &str, value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        validate_timezone(field, &value)?;
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn validate_timezone(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::field(field, "cannot be empty"));
    }

    if Timezone::SINGLE_SEGMENT.contains(&value) {
        return Ok(());
    }

    let segments: Vec<&str> = value.split('/').collect();
    let well_formed = segments.len() >= 2
        && segments.iter().all(|segment| {
            segment
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+'))
        });
    if !well_formed {
        return Err(ValidationError::format(
            field,
            format!("'{}' is not an IANA time zone name", value),
        ));
    }
    Ok(())
}
