//! Property-based tests for the reconciliation engine.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use feeledger_shared::types::{FeeStructureId, GradeId, PaymentId, PupilId, TermNumber, UserId};

use crate::access::{ActorContext, ActorRole};
use crate::balance::engine::{BalanceQuery, ReconciliationEngine};
use crate::balance::types::PaymentStatus;
use crate::calendar::TermDueDates;
use crate::fees::FeeStructure;
use crate::payment::{LedgerPolicy, Payment, PaymentLedger, PaymentState};
use crate::school::{Pupil, PupilStatus};

fn arb_state() -> impl Strategy<Value = PaymentState> {
    prop_oneof![
        Just(PaymentState::Active),
        Just(PaymentState::PendingDeletion),
        Just(PaymentState::DeletionApproved),
        Just(PaymentState::DeletionRejected),
    ]
}

fn arb_money() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn pupil() -> Pupil {
    Pupil {
        id: PupilId::new(),
        full_name: "Test Pupil".to_string(),
        grade_id: GradeId::new(),
        status: PupilStatus::Active,
        enrolled_at: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    }
}

fn payment(pupil_id: PupilId, cents: i64, state: PaymentState) -> Payment {
    Payment {
        id: PaymentId::new(),
        pupil_id,
        term: TermNumber::FIRST,
        year: 2024,
        amount: Decimal::new(cents, 2),
        reference: None,
        recorded_at: Utc::now(),
        recorded_by: UserId::new(),
        state,
        deletion_reason: None,
        deletion_requested_by: None,
        deletion_requested_at: None,
        deletion_reviewed_by: None,
        deletion_reviewed_at: None,
        rejection_reason: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Outstanding is never negative and equals max(0, expected - collected).
    #[test]
    fn prop_outstanding_is_clamped_difference(
        expected in arb_money(),
        collected in arb_money(),
    ) {
        let outstanding = ReconciliationEngine::outstanding(expected, collected);
        prop_assert!(outstanding >= Decimal::ZERO);
        prop_assert_eq!(outstanding, (expected - collected).max(Decimal::ZERO));
    }

    /// Collected equals the sum of non-excluded payments, never more.
    #[test]
    fn prop_collected_excludes_only_approved_deletions(
        rows in prop::collection::vec((1i64..1_000_000, arb_state()), 0..25),
    ) {
        let pupil = pupil();
        let payments: Vec<Payment> = rows
            .iter()
            .map(|(cents, state)| payment(pupil.id, *cents, *state))
            .collect();

        let collected = ReconciliationEngine::collected(&payments, pupil.id, TermNumber::FIRST, 2024);
        let expected: Decimal = payments
            .iter()
            .filter(|p| p.state != PaymentState::DeletionApproved)
            .map(|p| p.amount)
            .sum();
        let everything: Decimal = payments.iter().map(|p| p.amount).sum();

        prop_assert_eq!(collected, expected);
        prop_assert!(collected <= everything);
    }

    /// Status agrees with the figures it was derived from.
    #[test]
    fn prop_status_consistent_with_figures(
        fee_amount in arb_money(),
        rows in prop::collection::vec((1i64..1_000_000, arb_state()), 0..10),
        day in 1u32..=28,
        month in 1u32..=12,
    ) {
        let pupil = pupil();
        let fee = FeeStructure {
            id: FeeStructureId::new(),
            grade_id: pupil.grade_id,
            term: TermNumber::FIRST,
            year: 2024,
            amount: fee_amount,
            is_active: true,
            created_at: Utc::now(),
        };
        let payments: Vec<Payment> = rows
            .iter()
            .map(|(cents, state)| payment(pupil.id, *cents, *state))
            .collect();
        let today = NaiveDate::from_ymd_opt(2024, month, day).unwrap();

        let b = ReconciliationEngine::compute_pupil_balance(
            &pupil,
            Some(&fee),
            &payments,
            BalanceQuery::new(TermNumber::FIRST, 2024, today),
            &TermDueDates::default(),
        );

        prop_assert!(b.outstanding >= Decimal::ZERO);
        match b.status {
            PaymentStatus::NotApplicable => prop_assert_eq!(b.expected, Decimal::ZERO),
            PaymentStatus::Paid => {
                prop_assert!(b.expected > Decimal::ZERO);
                prop_assert_eq!(b.outstanding, Decimal::ZERO);
            }
            PaymentStatus::Partial => {
                prop_assert!(b.collected > Decimal::ZERO && b.collected < b.expected);
            }
            PaymentStatus::Overdue | PaymentStatus::Unpaid => {
                prop_assert_eq!(b.collected, Decimal::ZERO);
                prop_assert!(b.expected > Decimal::ZERO);
            }
        }
    }

    /// Soft delete followed by rejection restores the exact collected value.
    #[test]
    fn prop_soft_delete_then_reject_restores_collected(
        amounts in prop::collection::vec(1i64..1_000_000, 1..10),
        target in any::<prop::sample::Index>(),
    ) {
        let pupil = pupil();
        let mut payments: Vec<Payment> = amounts
            .iter()
            .map(|cents| payment(pupil.id, *cents, PaymentState::Active))
            .collect();
        let before = ReconciliationEngine::collected(&payments, pupil.id, TermNumber::FIRST, 2024);

        let ledger = PaymentLedger::new(LedgerPolicy::default());
        let clerk = ActorContext::new(UserId::new(), ActorRole::Clerk);
        let admin = ActorContext::new(UserId::new(), ActorRole::Admin);
        let idx = target.index(payments.len());

        let pending = ledger.soft_delete(&payments[idx], "check", &clerk).unwrap().apply(&payments[idx]);
        payments[idx] = pending.clone();
        prop_assert_eq!(
            ReconciliationEngine::collected(&payments, pupil.id, TermNumber::FIRST, 2024),
            before
        );

        payments[idx] = ledger.reject_deletion(&pending, "valid", &admin).unwrap().apply(&pending);
        prop_assert_eq!(
            ReconciliationEngine::collected(&payments, pupil.id, TermNumber::FIRST, 2024),
            before
        );
    }
}
