//! Property-based tests for the payment ledger state machine.

use proptest::prelude::*;
use rust_decimal::Decimal;

use feeledger_shared::types::{PupilId, TermNumber, UserId};

use crate::access::{ActorContext, ActorRole};
use crate::payment::error::LedgerError;
use crate::payment::service::{LedgerPolicy, PaymentLedger};
use crate::payment::types::{NewPayment, Payment, PaymentOperation, PaymentState};

fn arb_state() -> impl Strategy<Value = PaymentState> {
    prop_oneof![
        Just(PaymentState::Active),
        Just(PaymentState::PendingDeletion),
        Just(PaymentState::DeletionApproved),
        Just(PaymentState::DeletionRejected),
    ]
}

fn arb_operation() -> impl Strategy<Value = PaymentOperation> {
    prop_oneof![
        Just(PaymentOperation::SoftDelete),
        Just(PaymentOperation::ApproveDeletion),
        Just(PaymentOperation::RejectDeletion),
    ]
}

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn ledger() -> PaymentLedger {
    PaymentLedger::new(LedgerPolicy {
        segregation_of_duties: false,
        ..LedgerPolicy::default()
    })
}

fn payment_in(state: PaymentState, amount: Decimal) -> Payment {
    let admin = ActorContext::new(UserId::new(), ActorRole::Admin);
    let mut payment = ledger()
        .new_payment(
            NewPayment {
                pupil_id: PupilId::new(),
                term: TermNumber::SECOND,
                year: 2025,
                amount,
                reference: None,
            },
            &admin,
        )
        .unwrap();
    payment.state = state;
    payment
}

fn run(
    ledger: &PaymentLedger,
    payment: &Payment,
    op: PaymentOperation,
    actor: &ActorContext,
) -> Result<Payment, LedgerError> {
    let transition = match op {
        PaymentOperation::SoftDelete => ledger.soft_delete(payment, "reason", actor),
        PaymentOperation::ApproveDeletion => ledger.approve_deletion(payment, actor),
        PaymentOperation::RejectDeletion => ledger.reject_deletion(payment, "reason", actor),
    }?;
    Ok(transition.apply(payment))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every (state, operation) pair either follows the transition table or
    /// fails with InvalidState, leaving the payment untouched.
    #[test]
    fn prop_transitions_follow_table(
        state in arb_state(),
        op in arb_operation(),
        amount in arb_amount(),
    ) {
        let admin = ActorContext::new(UserId::new(), ActorRole::Admin);
        let payment = payment_in(state, amount);

        match (state.next(op), run(&ledger(), &payment, op, &admin)) {
            (Some(expected), Ok(next)) => {
                prop_assert_eq!(next.state, expected);
                prop_assert_eq!(next.amount, payment.amount);
                prop_assert_eq!(next.id, payment.id);
            }
            (None, Err(LedgerError::InvalidState { state: reported, operation, .. })) => {
                prop_assert_eq!(reported, state);
                prop_assert_eq!(operation, op);
            }
            (expected, actual) => {
                prop_assert!(false, "{state} + {op}: expected {expected:?}, got {actual:?}");
            }
        }
    }

    /// Once approved, a payment never leaves DeletionApproved and never counts.
    #[test]
    fn prop_deletion_approved_is_terminal(
        ops in prop::collection::vec(arb_operation(), 0..20),
        amount in arb_amount(),
    ) {
        let admin = ActorContext::new(UserId::new(), ActorRole::Admin);
        let ledger = ledger();
        let mut payment = payment_in(PaymentState::Active, amount);
        let mut approved = false;

        for op in ops {
            if let Ok(next) = run(&ledger, &payment, op, &admin) {
                prop_assert!(!approved, "transition after approval");
                payment = next;
            }
            approved = payment.state == PaymentState::DeletionApproved;
            prop_assert_eq!(payment.state.is_counted(), !approved);
        }
    }

    /// Non-positive amounts are always rejected.
    #[test]
    fn prop_non_positive_amount_rejected(cents in -10_000_000i64..=0) {
        let clerk = ActorContext::new(UserId::new(), ActorRole::Clerk);
        let result = ledger().new_payment(
            NewPayment {
                pupil_id: PupilId::new(),
                term: TermNumber::FIRST,
                year: 2025,
                amount: Decimal::new(cents, 2),
                reference: None,
            },
            &clerk,
        );
        prop_assert!(matches!(result, Err(LedgerError::NonPositiveAmount(_))), "non-positive amount accepted");
    }

    /// Positive amounts finer than a cent never reach the store.
    #[test]
    fn prop_sub_cent_amount_rejected(mills in 1i64..10_000_000) {
        prop_assume!(mills % 10 != 0);
        let clerk = ActorContext::new(UserId::new(), ActorRole::Clerk);
        let result = ledger().new_payment(
            NewPayment {
                pupil_id: PupilId::new(),
                term: TermNumber::FIRST,
                year: 2025,
                amount: Decimal::new(mills, 3),
                reference: None,
            },
            &clerk,
        );
        prop_assert!(
            matches!(result, Err(LedgerError::InvalidAmount(_))),
            "sub-cent amount accepted"
        );
    }
}
