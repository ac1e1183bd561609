//! Property-based tests for the fee catalog.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;

use feeledger_shared::types::{FeeStructureId, GradeId, TermNumber};

use crate::fees::catalog::FeeCatalog;
use crate::fees::types::{FeeKey, FeeStructure, UpsertPlan};

/// Applies an upsert plan the way the store does inside one transaction.
fn apply(rows: &mut Vec<FeeStructure>, key: FeeKey, amount: Decimal) {
    match FeeCatalog::plan_upsert(rows, key, amount) {
        UpsertPlan::Unchanged(_) => {}
        UpsertPlan::Replace { deactivate } => {
            for row in rows.iter_mut().filter(|r| deactivate.contains(&r.id)) {
                row.is_active = false;
            }
            rows.push(FeeStructure {
                id: FeeStructureId::new(),
                grade_id: key.grade_id,
                term: key.term,
                year: key.year,
                amount,
                is_active: true,
                created_at: Utc::now(),
            });
        }
    }
}

fn arb_term() -> impl Strategy<Value = TermNumber> {
    prop_oneof![
        Just(TermNumber::FIRST),
        Just(TermNumber::SECOND),
        Just(TermNumber::THIRD),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any sequence of upserts leaves exactly one active structure per key,
    /// carrying the last requested amount, and never drops history.
    #[test]
    fn prop_upserts_keep_single_active_structure(
        ops in prop::collection::vec((0usize..2, arb_term(), 0i64..100_000), 1..30)
    ) {
        let grades = [GradeId::new(), GradeId::new()];
        let mut rows: Vec<FeeStructure> = Vec::new();
        let mut last = std::collections::HashMap::new();

        for (grade_idx, term, cents) in ops {
            let key = FeeKey::new(grades[grade_idx], term, 2024);
            let amount = Decimal::new(cents, 2);
            let before = rows.len();
            apply(&mut rows, key, amount);
            prop_assert!(rows.len() >= before);
            last.insert(key, amount);
        }

        for (key, amount) in last {
            let active: Vec<_> = rows.iter().filter(|r| r.is_active && r.key() == key).collect();
            prop_assert_eq!(active.len(), 1);
            prop_assert_eq!(FeeCatalog::resolve(&rows, key).unwrap().amount, amount);
        }
    }
}
