//! School registry types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use feeledger_shared::types::{GradeId, ParentId, PupilId};

/// A grade (class year) pupils are billed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    /// Grade id.
    pub id: GradeId,
    /// Display name, unique across the school.
    pub name: String,
    /// When the grade was created.
    pub created_at: DateTime<Utc>,
}

/// Enrolment status of a pupil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PupilStatus {
    /// Currently enrolled.
    Active,
    /// Temporarily not attending.
    Inactive,
    /// Completed the final grade.
    Graduated,
    /// Left the school.
    Withdrawn,
}

impl PupilStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Graduated => "graduated",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "graduated" => Some(Self::Graduated),
            "withdrawn" => Some(Self::Withdrawn),
            _ => None,
        }
    }
}

impl fmt::Display for PupilStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pupil. Belongs to a grade by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pupil {
    /// Pupil id.
    pub id: PupilId,
    /// Full name.
    pub full_name: String,
    /// Current grade.
    pub grade_id: GradeId,
    /// Enrolment status.
    pub status: PupilStatus,
    /// Enrolment date.
    pub enrolled_at: NaiveDate,
}

/// Input for registering a pupil.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPupil {
    /// Full name.
    pub full_name: String,
    /// Grade to enrol into.
    pub grade_id: GradeId,
    /// Enrolment date.
    pub enrolled_at: NaiveDate,
}

/// A parent or guardian.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parent {
    /// Parent id.
    pub id: ParentId,
    /// Full name.
    pub full_name: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
}

/// Input for registering a parent.
#[derive(Debug, Clone, Deserialize)]
pub struct NewParent {
    /// Full name.
    pub full_name: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
}

/// Rows that still reference a grade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GradeDependents {
    /// Pupils assigned to the grade.
    pub pupils: u64,
    /// Fee structures (active or not) for the grade.
    pub fee_structures: u64,
}

impl GradeDependents {
    /// Returns true if nothing references the grade.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pupils == 0 && self.fee_structures == 0
    }
}
