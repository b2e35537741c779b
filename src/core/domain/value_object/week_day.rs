use crate::core::domain::error::ValidationError;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// A day of the week, as used both by RFC 5545 `BYDAY` codes and by
/// ISO 8601 weekday numbers (1 = Monday, 7 = Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum WeekDay {
    #[serde(rename = "MO")]
    Monday,
    #[serde(rename = "TU")]
    Tuesday,
    #[serde(rename = "WE")]
    Wednesday,
    #[serde(rename = "TH")]
    Thursday,
    #[serde(rename = "FR")]
    Friday,
    #[serde(rename = "SA")]
    Saturday,
    #[serde(rename = "SU")]
    Sunday,
}

impl WeekDay {
    const ALL: [WeekDay; 7] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
        WeekDay::Saturday,
        WeekDay::Sunday,
    ];

    /// Two-letter RFC 5545 code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            WeekDay::Monday => "MO",
            WeekDay::Tuesday => "TU",
            WeekDay::Wednesday => "WE",
            WeekDay::Thursday => "TH",
            WeekDay::Friday => "FR",
            WeekDay::Saturday => "SA",
            WeekDay::Sunday => "SU",
        }
    }

    /// ISO 8601 weekday number.
    #[must_use]
    pub fn iso_number(&self) -> u8 {
        match self {
            WeekDay::Monday => 1,
            WeekDay::Tuesday => 2,
            WeekDay::Wednesday => 3,
            WeekDay::Thursday => 4,
            WeekDay::Friday => 5,
            WeekDay::Saturday => 6,
            WeekDay::Sunday => 7,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.code() == code)
    }

    pub fn from_iso_number(number: i64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|day| i64::from(day.iso_number()) == number)
    }

    /// Parses a list of `BYDAY` codes, reporting every unrecognized code at once.
    ///
    /// Order is preserved so the composed recurrence reads like the request.
    pub fn parse_codes(field: &str, codes: &[String]) -> Result<Vec<Self>, ValidationError> {
        if codes.is_empty() {
            return Err(ValidationError::field(field, "at least one day is required"));
        }

        let invalid: Vec<String> = codes
            .iter()
            .filter(|code| Self::from_code(code).is_none())
            .cloned()
            .collect();
        if !invalid.is_empty() {
            return Err(ValidationError::InvalidDays {
                field: field.to_string(),
                codes: invalid,
            });
        }

        Ok(codes.iter().filter_map(|code| Self::from_code(code)).collect())
    }

    /// Parses a list of ISO weekday numbers. Duplicates are rejected.
    pub fn parse_iso_numbers(field: &str, numbers: &[i64]) -> Result<Vec<Self>, ValidationError> {
        if numbers.is_empty() {
            return Err(ValidationError::field(field, "at least one day is required"));
        }

        let invalid: Vec<String> = numbers
            .iter()
            .filter(|n| Self::from_iso_number(**n).is_none())
            .map(|n| n.to_string())
            .collect();
        if !invalid.is_empty() {
            return Err(ValidationError::InvalidDays {
                field: field.to_string(),
                codes: invalid,
            });
        }

        let mut seen = HashSet::new();
        let mut days = Vec::with_capacity(numbers.len());
        for day in numbers.iter().filter_map(|n| Self::from_iso_number(*n)) {
            if !seen.insert(day) {
                return Err(ValidationError::constraint(
                    field,
                    format!("day {} is listed more than once", day.iso_number()),
                ));
            }
            days.push(day);
        }
        Ok(days)
    }
}

impl fmt::Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
