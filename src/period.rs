use serde::{Deserialize, Serialize};
use std::fmt;

/// A class slot within a day, 1 through 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PeriodNumber(u8);

impl PeriodNumber {
    pub const LAST: Self = Self(9);

    pub fn new(value: u8) -> Option<Self> {
        (1..=9).contains(&value).then_some(Self(value))
    }

    /// Accepts the ASCII digits '1'..='9'; '0' and everything else is rejected.
    pub fn from_digit(ch: char) -> Option<Self> {
        match ch {
            '1'..='9' => Some(Self(ch as u8 - b'0')),
            _ => None,
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Build a run of consecutive periods `first..=last`, clamped to 1..=9.
    pub fn range(first: u8, last: u8) -> Vec<Self> {
        (first.max(1)..=last.min(9)).map(Self).collect()
    }
}

impl TryFrom<u8> for PeriodNumber {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("period {value} out of range 1..=9"))
    }
}

impl TryFrom<i64> for PeriodNumber {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| format!("period {value} out of range 1..=9"))
    }
}

impl From<PeriodNumber> for u8 {
    fn from(value: PeriodNumber) -> Self {
        value.0
    }
}

impl fmt::Display for PeriodNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
