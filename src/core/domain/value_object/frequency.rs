use crate::core::domain::error::ValidationError;
use serde::Serialize;
use std::fmt;

/// Recurrence frequency of a maintenance window.
///
/// Only weekly recurrences are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Frequency {
    #[serde(rename = "WEEKLY")]
    Weekly,
}

impl Frequency {
    /// Parses the RFC 5545 `FREQ` literal.
    pub fn parse(field: &str, value: &str) -> Result<Self, ValidationError> {
        validate_frequency(field, value)?;
        Ok(Frequency::Weekly)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "WEEKLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn validate_frequency(field: &str, value: &str) -> Result<(), ValidationError> {
    if value != "WEEKLY" {
        return Err(ValidationError::constraint(
            field,
            format!("only 'WEEKLY' frequency is supported, got '{}'", value),
        ));
    }
    Ok(())
}
