//! Serde helpers for custom serialization of schedule records.

use serde::Serializer;

/// Serialization of weekday lists as ISO 8601 weekday numbers (`[1, 2, 3]`).
pub mod iso_days {
    use super::*;
    use crate::core::domain::value_object::WeekDay;
    use serde::ser::SerializeSeq;

    pub fn serialize<S>(days: &[WeekDay], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(days.len()))?;
        for day in days {
            seq.serialize_element(&day.iso_number())?;
        }
        seq.end()
    }
}

/// Serialization of a `ClockTime` as `HH:MM:SS`.
pub mod clock_hms {
    use super::*;
    use crate::core::domain::value_object::ClockTime;

    pub fn serialize<S>(time: &ClockTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format_hh_mm_ss())
    }
}

/// Serialization of a `ClockTime` as `HH:MM`.
pub mod clock_hm {
    use super::*;
    use crate::core::domain::value_object::ClockTime;

    pub fn serialize<S>(time: &ClockTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format_hh_mm())
    }
}

/// Serialization of a timestamp as RFC 3339, keeping its offset and writing
/// `Z` for UTC.
pub mod rfc3339 {
    use super::*;
    use chrono::{DateTime, FixedOffset, SecondsFormat};

    pub fn serialize<S>(timestamp: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}
