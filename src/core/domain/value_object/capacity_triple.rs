use crate::core::domain::error::ValidationError;
use serde::{Serialize, Serializer};
use std::fmt;

/// A `"min,max,desired"` node-count triple describing one schedule phase.
///
/// A triple of `"0,0,0"` describes a pool scaled down to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityTriple {
    min: u32,
    max: u32,
    desired: u32,
}

impl CapacityTriple {
    /// Parses and validates the comma-separated form.
    pub fn parse(field: &str, value: &str) -> Result<Self, ValidationError> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ValidationError::format(
                field,
                format!("must be 'min,max,desired', got '{}'", value),
            ));
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse::<u32>().map_err(|_| {
                ValidationError::format(
                    field,
                    format!("'{}' is not a non-negative node count", part),
                )
            })?;
        }

        let [min, max, desired] = numbers;
        validate_triple(field, min, max, desired)?;
        Ok(Self { min, max, desired })
    }

    #[must_use]
    pub fn min(&self) -> u32 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[must_use]
    pub fn desired(&self) -> u32 {
        self.desired
    }
}

pub(crate) fn validate_triple(
    field: &str,
    min: u32,
    max: u32,
    desired: u32,
) -> Result<(), ValidationError> {
    if min > max {
        return Err(ValidationError::constraint(
            field,
            format!("min ({}) must not exceed max ({})", min, max),
        ));
    }
    if desired < min || desired > max {
        return Err(ValidationError::constraint(
            field,
            format!(
                "desired ({}) must lie between min ({}) and max ({})",
                desired, min, max
            ),
        ));
    }
    Ok(())
}

impl fmt::Display for CapacityTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.min, self.max, self.desired)
    }
}

impl Serialize for CapacityTriple {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
