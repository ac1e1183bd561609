//! Report data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use feeledger_shared::types::{GradeId, TermNumber};

use crate::balance::PaymentStatus;

/// Number of pupils per payment status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Fully paid.
    pub paid: u64,
    /// Partly paid.
    pub partial: u64,
    /// Nothing paid, past due.
    pub overdue: u64,
    /// Nothing paid, not yet due.
    pub unpaid: u64,
    /// No fee owed.
    pub not_applicable: u64,
}

impl StatusCounts {
    /// Counts one more pupil with `status`.
    pub fn record(&mut self, status: PaymentStatus) {
        let slot = match status {
            PaymentStatus::Paid => &mut self.paid,
            PaymentStatus::Partial => &mut self.partial,
            PaymentStatus::Overdue => &mut self.overdue,
            PaymentStatus::Unpaid => &mut self.unpaid,
            PaymentStatus::NotApplicable => &mut self.not_applicable,
        };
        *slot += 1;
    }

    /// Adds another set of counts.
    pub fn merge(&mut self, other: Self) {
        self.paid += other.paid;
        self.partial += other.partial;
        self.overdue += other.overdue;
        self.unpaid += other.unpaid;
        self.not_applicable += other.not_applicable;
    }

    /// Total pupils counted.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.paid + self.partial + self.overdue + self.unpaid + self.not_applicable
    }
}

/// Collection figures for one grade and term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeSummary {
    /// Grade.
    pub grade_id: GradeId,
    /// Grade display name.
    pub grade_name: String,
    /// Term.
    pub term: TermNumber,
    /// Academic year.
    pub year: i32,
    /// Pupils folded into the summary.
    pub pupil_count: u64,
    /// Total owed.
    pub expected: Decimal,
    /// Total collected.
    pub collected: Decimal,
    /// Total outstanding.
    pub outstanding: Decimal,
    /// Whole-number percentage of expected that was collected.
    pub collection_rate: Decimal,
    /// Pupils per status.
    pub counts: StatusCounts,
}

/// Collection figures for the whole school and one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolSummary {
    /// Term.
    pub term: TermNumber,
    /// Academic year.
    pub year: i32,
    /// Pupils folded into the summary.
    pub pupil_count: u64,
    /// Total owed.
    pub expected: Decimal,
    /// Total collected.
    pub collected: Decimal,
    /// Total outstanding.
    pub outstanding: Decimal,
    /// Whole-number percentage of expected that was collected.
    pub collection_rate: Decimal,
    /// Pupils per status.
    pub counts: StatusCounts,
    /// Per-grade breakdown.
    pub grades: Vec<GradeSummary>,
}

/// School-wide collection for one term of a trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCollection {
    /// Term.
    pub term: TermNumber,
    /// Total owed.
    pub expected: Decimal,
    /// Total collected.
    pub collected: Decimal,
    /// Total outstanding.
    pub outstanding: Decimal,
    /// Collection rate.
    pub collection_rate: Decimal,
}

/// Collection across the terms of a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionTrend {
    /// Academic year.
    pub year: i32,
    /// One entry per term, in term order.
    pub terms: Vec<TermCollection>,
}

/// Heatmap colour band for a collection rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatBucket {
    /// No fee owed.
    NotApplicable,
    /// Nothing collected.
    None,
    /// Below 50%.
    Low,
    /// 50% to below 75%.
    Medium,
    /// 75% to below 100%.
    High,
    /// 100% or more.
    Full,
}

/// One grade × term cell of the heatmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapCell {
    /// Grade.
    pub grade_id: GradeId,
    /// Grade display name.
    pub grade_name: String,
    /// Term.
    pub term: TermNumber,
    /// Collection rate.
    pub collection_rate: Decimal,
    /// Band.
    pub bucket: HeatBucket,
}

/// Grade × term collection heatmap for a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heatmap {
    /// Academic year.
    pub year: i32,
    /// Cells ordered by grade name, then term.
    pub cells: Vec<HeatmapCell>,
}
