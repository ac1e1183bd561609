//! School term numbers.
//!
//! The academic year has exactly three terms. Storing the term as a
//! validated newtype keeps out-of-range values from ever reaching the
//! fee catalog or the payment ledger.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected term number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Term number must be 1, 2 or 3, got {0}")]
pub struct TermError(pub i64);

/// A term within an academic year (1, 2 or 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct TermNumber(u8);

impl TermNumber {
    /// First term.
    pub const FIRST: Self = Self(1);
    /// Second term.
    pub const SECOND: Self = Self(2);
    /// Third term.
    pub const THIRD: Self = Self(3);

    /// All terms in calendar order.
    pub const ALL: [Self; 3] = [Self::FIRST, Self::SECOND, Self::THIRD];

    /// Creates a term number, rejecting anything outside 1..=3.
    pub fn new(value: i64) -> Result<Self, TermError> {
        match value {
            1..=3 => Ok(Self(u8::try_from(value).map_err(|_| TermError(value))?)),
            _ => Err(TermError(value)),
        }
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns the value in the column type used by the store.
    #[must_use]
    pub fn as_i16(self) -> i16 {
        i16::from(self.0)
    }
}

impl TryFrom<i16> for TermNumber {
    type Error = TermError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<TermNumber> for i16 {
    fn from(term: TermNumber) -> Self {
        term.as_i16()
    }
}

impl std::fmt::Display for TermNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Term {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_terms() {
        assert_eq!(TermNumber::new(1).unwrap(), TermNumber::FIRST);
        assert_eq!(TermNumber::new(2).unwrap().get(), 2);
        assert_eq!(TermNumber::try_from(3_i16).unwrap(), TermNumber::THIRD);
    }

    #[test]
    fn test_out_of_range_terms_rejected() {
        assert_eq!(TermNumber::new(0), Err(TermError(0)));
        assert_eq!(TermNumber::new(4), Err(TermError(4)));
        assert!(TermNumber::try_from(-1_i16).is_err());
    }

    #[test]
    fn test_serde_uses_plain_integer() {
        let json = serde_json::to_string(&TermNumber::SECOND).unwrap();
        assert_eq!(json, "2");
        let parsed: TermNumber = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, TermNumber::THIRD);
        assert!(serde_json::from_str::<TermNumber>("7").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(TermNumber::FIRST.to_string(), "Term 1");
    }
}
