//! Balance types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use feeledger_shared::types::{GradeId, PupilId, TermNumber};

/// Payment status of one pupil for one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing outstanding on a non-zero fee.
    Paid,
    /// Something paid, something outstanding.
    Partial,
    /// Nothing paid and the term's due date has passed.
    Overdue,
    /// Nothing paid, not yet due.
    Unpaid,
    /// No fee is owed.
    NotApplicable,
}

impl PaymentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Partial => "partial",
            Self::Overdue => "overdue",
            Self::Unpaid => "unpaid",
            Self::NotApplicable => "not_applicable",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reconciled balance of one pupil for one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PupilBalance {
    /// Pupil.
    pub pupil_id: PupilId,
    /// Pupil display name.
    pub pupil_name: String,
    /// Grade the pupil is billed under.
    pub grade_id: GradeId,
    /// Term.
    pub term: TermNumber,
    /// Academic year.
    pub year: i32,
    /// Fee owed, zero when no fee is configured.
    pub expected: Decimal,
    /// Sum of counted payments.
    pub collected: Decimal,
    /// `max(0, expected - collected)`.
    pub outstanding: Decimal,
    /// Classification.
    pub status: PaymentStatus,
}
