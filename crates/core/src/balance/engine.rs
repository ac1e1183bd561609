//! Balance reconciliation engine.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use feeledger_shared::types::{PupilId, TermNumber};

use crate::balance::types::{PaymentStatus, PupilBalance};
use crate::calendar::DuePolicy;
use crate::fees::FeeStructure;
use crate::payment::Payment;
use crate::school::Pupil;

/// The term being reconciled and the date overdue checks are made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceQuery {
    /// Term.
    pub term: TermNumber,
    /// Academic year.
    pub year: i32,
    /// Reference date for overdue checks.
    pub today: NaiveDate,
}

impl BalanceQuery {
    /// Creates a query.
    #[must_use]
    pub const fn new(term: TermNumber, year: i32, today: NaiveDate) -> Self {
        Self { term, year, today }
    }
}

/// Stateless reconciliation rules.
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    /// Sums the counted payments of `pupil_id` for the term.
    ///
    /// `DeletionApproved` payments are skipped; pending and rejected
    /// deletions still count.
    pub fn collected<'a>(
        payments: impl IntoIterator<Item = &'a Payment>,
        pupil_id: PupilId,
        term: TermNumber,
        year: i32,
    ) -> Decimal {
        payments
            .into_iter()
            .filter(|p| p.pupil_id == pupil_id && p.term == term && p.year == year)
            .filter(|p| p.state.is_counted())
            .map(|p| p.amount)
            .sum()
    }

    /// `max(0, expected - collected)`. Overpayment never goes negative.
    #[must_use]
    pub fn outstanding(expected: Decimal, collected: Decimal) -> Decimal {
        (expected - collected).max(Decimal::ZERO)
    }

    /// Classifies a balance.
    #[must_use]
    pub fn classify(expected: Decimal, collected: Decimal, past_due: bool) -> PaymentStatus {
        if expected <= Decimal::ZERO {
            PaymentStatus::NotApplicable
        } else if collected >= expected {
            PaymentStatus::Paid
        } else if collected > Decimal::ZERO {
            PaymentStatus::Partial
        } else if past_due {
            PaymentStatus::Overdue
        } else {
            PaymentStatus::Unpaid
        }
    }

    /// Reconciles one pupil for one term.
    ///
    /// `fee` is the resolved active structure, or `None` when the catalog has
    /// none. With no structure the term reports zero expected and zero
    /// collected regardless of payments on file.
    pub fn compute_pupil_balance(
        pupil: &Pupil,
        fee: Option<&FeeStructure>,
        payments: &[Payment],
        query: BalanceQuery,
        due: &dyn DuePolicy,
    ) -> PupilBalance {
        let (expected, collected) = match fee {
            Some(fee) => (
                fee.amount,
                Self::collected(payments, pupil.id, query.term, query.year),
            ),
            None => (Decimal::ZERO, Decimal::ZERO),
        };
        let past_due = due.is_overdue(query.term, query.year, query.today);

        PupilBalance {
            pupil_id: pupil.id,
            pupil_name: pupil.full_name.clone(),
            grade_id: pupil.grade_id,
            term: query.term,
            year: query.year,
            expected,
            collected,
            outstanding: Self::outstanding(expected, collected),
            status: Self::classify(expected, collected, past_due),
        }
    }
}
