//! Academic calendar: valid years and term due dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use feeledger_shared::config::{BillingConfig, LedgerConfig, TermDueConfig};
use feeledger_shared::types::TermNumber;

/// Inclusive range of academic years the ledger accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    /// Earliest accepted year.
    pub min: i32,
    /// Latest accepted year.
    pub max: i32,
}

impl YearRange {
    /// Returns true if `year` lies within the range.
    #[must_use]
    pub const fn contains(&self, year: i32) -> bool {
        year >= self.min && year <= self.max
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::from(&LedgerConfig::default())
    }
}

impl From<&LedgerConfig> for YearRange {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            min: config.min_year,
            max: config.max_year,
        }
    }
}

/// Supplies the date after which an unpaid term counts as overdue.
pub trait DuePolicy: Send + Sync {
    /// Due date for the term, or `None` if the term has no due date.
    fn due_date(&self, term: TermNumber, year: i32) -> Option<NaiveDate>;

    /// Returns true if `today` is strictly after the term's due date.
    fn is_overdue(&self, term: TermNumber, year: i32, today: NaiveDate) -> bool {
        self.due_date(term, year).is_some_and(|due| today > due)
    }
}

/// Fixed month/day due date per term, repeated every year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermDueDates {
    dates: [(u32, u32); 3],
}

impl TermDueDates {
    /// Creates a policy from (month, day) pairs for terms 1, 2 and 3.
    #[must_use]
    pub const fn new(term1: (u32, u32), term2: (u32, u32), term3: (u32, u32)) -> Self {
        Self {
            dates: [term1, term2, term3],
        }
    }
}

impl Default for TermDueDates {
    fn default() -> Self {
        Self::from(&BillingConfig::default())
    }
}

impl From<&BillingConfig> for TermDueDates {
    fn from(config: &BillingConfig) -> Self {
        let pair = |c: TermDueConfig| (c.month, c.day);
        Self::new(pair(config.term1), pair(config.term2), pair(config.term3))
    }
}

impl DuePolicy for TermDueDates {
    fn due_date(&self, term: TermNumber, year: i32) -> Option<NaiveDate> {
        let (month, day) = self.dates[usize::from(term.get() - 1)];
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Policy under which nothing is ever overdue.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDueDates;

impl DuePolicy for NoDueDates {
    fn due_date(&self, _term: TermNumber, _year: i32) -> Option<NaiveDate> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_due_dates() {
        let policy = TermDueDates::default();
        assert_eq!(
            policy.due_date(TermNumber::FIRST, 2024),
            Some(date(2024, 2, 15))
        );
        assert_eq!(
            policy.due_date(TermNumber::THIRD, 2024),
            Some(date(2024, 10, 15))
        );
    }

    #[test]
    fn test_overdue_is_strictly_after_due_date() {
        let policy = TermDueDates::default();
        assert!(!policy.is_overdue(TermNumber::FIRST, 2024, date(2024, 2, 15)));
        assert!(policy.is_overdue(TermNumber::FIRST, 2024, date(2024, 2, 16)));
        assert!(!policy.is_overdue(TermNumber::SECOND, 2024, date(2024, 2, 16)));
    }

    #[test]
    fn test_invalid_configured_date_is_never_overdue() {
        let policy = TermDueDates::new((2, 30), (6, 15), (10, 15));
        assert_eq!(policy.due_date(TermNumber::FIRST, 2024), None);
        assert!(!policy.is_overdue(TermNumber::FIRST, 2024, date(2030, 1, 1)));
    }

    #[test]
    fn test_no_due_dates() {
        assert!(!NoDueDates.is_overdue(TermNumber::FIRST, 2000, date(2030, 1, 1)));
    }

    #[test]
    fn test_year_range() {
        let range = YearRange::default();
        assert!(range.contains(2024));
        assert!(!range.contains(1999));
        assert!(!range.contains(2101));
    }
}
