//! Report folding service.

use rust_decimal::{Decimal, RoundingStrategy};

use feeledger_shared::types::TermNumber;

use super::types::{
    CollectionTrend, GradeSummary, HeatBucket, Heatmap, HeatmapCell, SchoolSummary, StatusCounts,
    TermCollection,
};
use crate::balance::PupilBalance;
use crate::school::Grade;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Service for folding balances into reports.
pub struct ReportService;

impl ReportService {
    /// Collected as a whole-number percentage of expected.
    ///
    /// With nothing expected the rate is 100 when nothing was collected
    /// either, and 0 otherwise.
    #[must_use]
    pub fn collection_rate(expected: Decimal, collected: Decimal) -> Decimal {
        if expected.is_zero() {
            return if collected.is_zero() {
                HUNDRED
            } else {
                Decimal::ZERO
            };
        }
        (collected * HUNDRED / expected)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Folds the balances of one grade's pupils.
    #[must_use]
    pub fn grade_summary(
        grade: &Grade,
        term: TermNumber,
        year: i32,
        balances: &[PupilBalance],
    ) -> GradeSummary {
        let mut counts = StatusCounts::default();
        let mut expected = Decimal::ZERO;
        let mut collected = Decimal::ZERO;
        let mut outstanding = Decimal::ZERO;

        for balance in balances {
            expected += balance.expected;
            collected += balance.collected;
            outstanding += balance.outstanding;
            counts.record(balance.status);
        }

        GradeSummary {
            grade_id: grade.id,
            grade_name: grade.name.clone(),
            term,
            year,
            pupil_count: counts.total(),
            expected,
            collected,
            outstanding,
            collection_rate: Self::collection_rate(expected, collected),
            counts,
        }
    }

    /// Folds grade summaries into the school summary.
    ///
    /// Outstanding is the sum of per-pupil outstanding, so one pupil's
    /// overpayment never offsets another pupil's debt.
    #[must_use]
    pub fn school_summary(term: TermNumber, year: i32, grades: Vec<GradeSummary>) -> SchoolSummary {
        let mut counts = StatusCounts::default();
        let mut expected = Decimal::ZERO;
        let mut collected = Decimal::ZERO;
        let mut outstanding = Decimal::ZERO;

        for grade in &grades {
            expected += grade.expected;
            collected += grade.collected;
            outstanding += grade.outstanding;
            counts.merge(grade.counts);
        }

        SchoolSummary {
            term,
            year,
            pupil_count: counts.total(),
            expected,
            collected,
            outstanding,
            collection_rate: Self::collection_rate(expected, collected),
            counts,
            grades,
        }
    }

    /// Builds the term-by-term trend from per-term school summaries.
    #[must_use]
    pub fn collection_trend(year: i32, summaries: &[SchoolSummary]) -> CollectionTrend {
        let mut terms: Vec<TermCollection> = summaries
            .iter()
            .filter(|s| s.year == year)
            .map(|s| TermCollection {
                term: s.term,
                expected: s.expected,
                collected: s.collected,
                outstanding: s.outstanding,
                collection_rate: s.collection_rate,
            })
            .collect();
        terms.sort_by_key(|t| t.term);
        CollectionTrend { year, terms }
    }

    /// Bands a grade's collection for the heatmap.
    ///
    /// Bands compare the exact ratio, so a grade that collected less than it
    /// was owed never lands in `Full`.
    #[must_use]
    pub fn heat_bucket(expected: Decimal, collected: Decimal) -> HeatBucket {
        if expected.is_zero() {
            return HeatBucket::NotApplicable;
        }
        if collected.is_zero() {
            return HeatBucket::None;
        }
        let percent = collected * HUNDRED;
        if percent < expected * Decimal::from(50) {
            HeatBucket::Low
        } else if percent < expected * Decimal::from(75) {
            HeatBucket::Medium
        } else if collected < expected {
            HeatBucket::High
        } else {
            HeatBucket::Full
        }
    }

    /// Lays grade summaries for a year out as a grade × term heatmap.
    #[must_use]
    pub fn heatmap(year: i32, summaries: &[GradeSummary]) -> Heatmap {
        let mut cells: Vec<HeatmapCell> = summaries
            .iter()
            .filter(|s| s.year == year)
            .map(|s| HeatmapCell {
                grade_id: s.grade_id,
                grade_name: s.grade_name.clone(),
                term: s.term,
                collection_rate: s.collection_rate,
                bucket: Self::heat_bucket(s.expected, s.collected),
            })
            .collect();
        cells.sort_by(|a, b| a.grade_name.cmp(&b.grade_name).then(a.term.cmp(&b.term)));
        Heatmap { year, cells }
    }
}
