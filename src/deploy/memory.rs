use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug, PartialEq, Eq)]
pub enum MemoryThresholdError {
    #[error("memory threshold is empty")]
    Empty,
    #[error("memory threshold {0:?} has no digits")]
    NoDigits(String),
    #[error("memory threshold {0:?} has an unknown unit, expected K, M or G")]
    UnknownUnit(String),
    #[error("memory threshold {0:?} must be greater than zero")]
    Zero(String),
    #[error("memory threshold {0:?} does not fit in 64 bits")]
    Overflow(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Bytes,
    Kilo,
    Mega,
    Giga,
}

impl SizeUnit {
    fn multiplier(self) -> u64 {
        match self {
            SizeUnit::Bytes => 1,
            SizeUnit::Kilo => 1 << 10,
            SizeUnit::Mega => 1 << 20,
            SizeUnit::Giga => 1 << 30,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            SizeUnit::Bytes => "",
            SizeUnit::Kilo => "K",
            SizeUnit::Mega => "M",
            SizeUnit::Giga => "G",
        }
    }
}

/// `max_memory_restart` value, e.g. `200M`. Kept in the unit it was written in so it renders
/// back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemoryThreshold {
    amount: u64,
    unit: SizeUnit,
}

impl MemoryThreshold {
    pub const fn megabytes(amount: u64) -> Self {
        Self {
            amount,
            unit: SizeUnit::Mega,
        }
    }

    pub fn bytes(&self) -> u64 {
        // checked at parse time
        self.amount.saturating_mul(self.unit.multiplier())
    }
}

impl FromStr for MemoryThreshold {
    type Err = MemoryThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(MemoryThresholdError::Empty);
        }
        let split = raw
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(raw.len());
        let (digits, suffix) = raw.split_at(split);
        if digits.is_empty() {
            return Err(MemoryThresholdError::NoDigits(s.to_string()));
        }
        let unit = match suffix {
            "" => SizeUnit::Bytes,
            "K" | "k" => SizeUnit::Kilo,
            "M" | "m" => SizeUnit::Mega,
            "G" | "g" => SizeUnit::Giga,
            _ => return Err(MemoryThresholdError::UnknownUnit(s.to_string())),
        };
        let amount: u64 = digits
            .parse()
            .map_err(|_| MemoryThresholdError::Overflow(s.to_string()))?;
        if amount == 0 {
            return Err(MemoryThresholdError::Zero(s.to_string()));
        }
        if amount.checked_mul(unit.multiplier()).is_none() {
            return Err(MemoryThresholdError::Overflow(s.to_string()));
        }
        Ok(Self { amount, unit })
    }
}

impl fmt::Display for MemoryThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl TryFrom<String> for MemoryThreshold {
    type Error = MemoryThresholdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MemoryThreshold> for String {
    fn from(value: MemoryThreshold) -> Self {
        value.to_string()
    }
}
