use crate::core::domain::error::ValidationError;
use std::fmt;

/// A 24-hour clock-of-day without a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
    second: u8,
}

impl ClockTime {
    pub(crate) fn new_unchecked(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    /// Parses the fixed-width `HH:MM` form. Seconds and 12-hour forms are rejected.
    pub fn parse_hh_mm(field: &str, value: &str) -> Result<Self, ValidationError> {
        let parts = split_fixed_width(field, value, 2, "HH:MM")?;
        build(field, parts[0], parts[1], 0)
    }

    /// Parses the fixed-width `HH:MM:SS` form.
    pub fn parse_hh_mm_ss(field: &str, value: &str) -> Result<Self, ValidationError> {
        let parts = split_fixed_width(field, value, 3, "HH:MM:SS")?;
        build(field, parts[0], parts[1], parts[2])
    }

    #[must_use]
    pub fn hour(&self) -> u8 {
        self.hour
    }

    #[must_use]
    pub fn minute(&self) -> u8 {
        self.minute
    }

    #[must_use]
    pub fn second(&self) -> u8 {
        self.second
    }

    /// Advances the clock by whole hours, wrapping at midnight.
    #[must_use]
    pub fn plus_hours(&self, hours: u8) -> Self {
        let hour = ((u16::from(self.hour) + u16::from(hours)) % 24) as u8;
        Self {
            hour,
            minute: self.minute,
            second: self.second,
        }
    }

    #[must_use]
    pub fn format_hh_mm(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    #[must_use]
    pub fn format_hh_mm_ss(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_hh_mm_ss())
    }
}

fn split_fixed_width(
    field: &str,
    value: &str,
    groups: usize,
    pattern: &str,
) -> Result<Vec<u8>, ValidationError> {
    let parts: Vec<&str> = value.split(':').collect();
    let well_formed = parts.len() == groups
        && parts
            .iter()
            .all(|p| p.len() == 2 && p.bytes().all(|b| b.is_ascii_digit()));
    if !well_formed {
        return Err(ValidationError::format(
            field,
            format!("must be in {} format, got '{}'", pattern, value),
        ));
    }

    Ok(parts
        .iter()
        .map(|p| p.bytes().fold(0u8, |acc, b| acc * 10 + (b - b'0')))
        .collect())
}

fn build(field: &str, hour: u8, minute: u8, second: u8) -> Result<ClockTime, ValidationError> {
    if hour > 23 || minute > 59 || second > 59 {
        return Err(ValidationError::constraint(
            field,
            "hour must be 00-23, minutes and seconds 00-59",
        ));
    }
    Ok(ClockTime::new_unchecked(hour, minute, second))
}
