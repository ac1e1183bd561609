//! Fee structure types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use feeledger_shared::types::{FeeStructureId, GradeId, TermNumber};

/// Identity of a fee structure: at most one active structure per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeKey {
    /// Grade billed.
    pub grade_id: GradeId,
    /// Term billed.
    pub term: TermNumber,
    /// Academic year billed.
    pub year: i32,
}

impl FeeKey {
    /// Creates a new key.
    #[must_use]
    pub const fn new(grade_id: GradeId, term: TermNumber, year: i32) -> Self {
        Self {
            grade_id,
            term,
            year,
        }
    }
}

impl fmt::Display for FeeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grade {} {} {}", self.grade_id, self.term, self.year)
    }
}

/// Amount owed by every pupil of a grade for one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStructure {
    /// Structure id.
    pub id: FeeStructureId,
    /// Grade billed.
    pub grade_id: GradeId,
    /// Term billed.
    pub term: TermNumber,
    /// Academic year billed.
    pub year: i32,
    /// Amount owed, never negative.
    pub amount: Decimal,
    /// Whether this structure is the one in force.
    pub is_active: bool,
    /// When the structure was created.
    pub created_at: DateTime<Utc>,
}

impl FeeStructure {
    /// Returns the structure's key.
    #[must_use]
    pub const fn key(&self) -> FeeKey {
        FeeKey::new(self.grade_id, self.term, self.year)
    }
}

/// What an upsert must do to the rows sharing its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertPlan {
    /// The active structure already carries the requested amount.
    Unchanged(FeeStructureId),
    /// Deactivate these structures, then insert a new active one.
    Replace {
        /// Currently active structures for the key.
        deactivate: Vec<FeeStructureId>,
    },
}
