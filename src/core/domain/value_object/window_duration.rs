use crate::core::domain::error::ValidationError;

/// Length of a maintenance window in whole hours, between 4 and 24 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDuration(u8);

impl WindowDuration {
    pub const MIN_HOURS: i64 = 4;
    pub const MAX_HOURS: i64 = 24;

    pub fn new(field: &str, hours: i64) -> Result<Self, ValidationError> {
        validate_duration_hours(field, hours)?;
        Ok(Self(hours as u8))
    }

    #[must_use]
    pub fn hours(&self) -> u8 {
        self.0
    }
}

pub(crate) fn validate_duration_hours(field: &str, hours: i64) -> Result<(), ValidationError> {
    if !(WindowDuration::MIN_HOURS..=WindowDuration::MAX_HOURS).contains(&hours) {
        return Err(ValidationError::constraint(
            field,
            format!(
                "must be between {} and {} hours, got {}",
                WindowDuration::MIN_HOURS,
                WindowDuration::MAX_HOURS,
                hours
            ),
        ));
    }
    Ok(())
}
