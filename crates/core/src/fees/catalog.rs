//! Fee resolution and upsert planning.

use rust_decimal::Decimal;

use feeledger_shared::types::{FeeStructureId, to_money};

use crate::calendar::YearRange;
use crate::fees::error::FeeError;
use crate::fees::types::{FeeKey, FeeStructure, UpsertPlan};

/// Stateless fee catalog rules.
///
/// The store loads candidate rows; these functions decide what they mean.
pub struct FeeCatalog;

impl FeeCatalog {
    /// Returns the unique active structure for `key`.
    ///
    /// # Returns
    /// * `Ok(structure)` if exactly one active structure matches
    /// * `Err(FeeError::NotFound)` if none is active, so callers can tell
    ///   "no fee configured" apart from "fee is zero"
    /// * `Err(FeeError::DuplicateActive)` if the store holds more than one
    pub fn resolve(structures: &[FeeStructure], key: FeeKey) -> Result<&FeeStructure, FeeError> {
        let mut active = structures
            .iter()
            .filter(|s| s.is_active && s.key() == key);

        match (active.next(), active.next()) {
            (Some(structure), None) => Ok(structure),
            (None, _) => Err(FeeError::NotFound(key)),
            (Some(_), Some(_)) => Err(FeeError::DuplicateActive(key)),
        }
    }

    /// Validates a fee structure before it is written.
    pub fn validate(key: FeeKey, amount: Decimal, years: YearRange) -> Result<(), FeeError> {
        if amount < Decimal::ZERO {
            return Err(FeeError::NegativeAmount(amount));
        }
        to_money(amount)?;
        if !years.contains(key.year) {
            return Err(FeeError::YearOutOfRange {
                year: key.year,
                min: years.min,
                max: years.max,
            });
        }
        Ok(())
    }

    /// Plans an upsert of `amount` against the rows that share `key`.
    ///
    /// Every active row for the key is deactivated before the new one is
    /// inserted, unless the single active row already carries `amount`.
    #[must_use]
    pub fn plan_upsert(existing: &[FeeStructure], key: FeeKey, amount: Decimal) -> UpsertPlan {
        let active: Vec<&FeeStructure> = existing
            .iter()
            .filter(|s| s.is_active && s.key() == key)
            .collect();

        if let [only] = active.as_slice()
            && only.amount == amount
        {
            return UpsertPlan::Unchanged(only.id);
        }

        UpsertPlan::Replace {
            deactivate: active.iter().map(|s| s.id).collect(),
        }
    }

    /// Returns the structures to deactivate before `target` is reactivated.
    #[must_use]
    pub fn conflicts_for_activation(
        existing: &[FeeStructure],
        target: &FeeStructure,
    ) -> Vec<FeeStructureId> {
        existing
            .iter()
            .filter(|s| s.is_active && s.id != target.id && s.key() == target.key())
            .map(|s| s.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use feeledger_shared::types::{AmountError, GradeId, TermNumber};
    use rust_decimal_macros::dec;

    fn structure(key: FeeKey, amount: Decimal, is_active: bool) -> FeeStructure {
        FeeStructure {
            id: FeeStructureId::new(),
            grade_id: key.grade_id,
            term: key.term,
            year: key.year,
            amount,
            is_active,
            created_at: Utc::now(),
        }
    }

    fn key() -> FeeKey {
        FeeKey::new(GradeId::new(), TermNumber::FIRST, 2024)
    }

    #[test]
    fn test_resolve_returns_active_structure() {
        let key = key();
        let rows = vec![
            structure(key, dec!(400), false),
            structure(key, dec!(500), true),
        ];
        let resolved = FeeCatalog::resolve(&rows, key).unwrap();
        assert_eq!(resolved.amount, dec!(500));
    }

    #[test]
    fn test_resolve_inactive_only_is_not_found() {
        let key = key();
        let rows = vec![structure(key, dec!(400), false)];
        assert!(matches!(
            FeeCatalog::resolve(&rows, key),
            Err(FeeError::NotFound(k)) if k == key
        ));
    }

    #[test]
    fn test_resolve_zero_fee_is_found() {
        let key = key();
        let rows = vec![structure(key, Decimal::ZERO, true)];
        assert_eq!(
            FeeCatalog::resolve(&rows, key).unwrap().amount,
            Decimal::ZERO
        );
    }

    #[test]
    fn test_resolve_ignores_other_keys() {
        let key = key();
        let other = FeeKey::new(key.grade_id, TermNumber::SECOND, 2024);
        let rows = vec![structure(other, dec!(500), true)];
        assert!(matches!(
            FeeCatalog::resolve(&rows, key),
            Err(FeeError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_duplicate_active_is_reported() {
        let key = key();
        let rows = vec![
            structure(key, dec!(500), true),
            structure(key, dec!(600), true),
        ];
        assert!(matches!(
            FeeCatalog::resolve(&rows, key),
            Err(FeeError::DuplicateActive(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_amount() {
        assert!(matches!(
            FeeCatalog::validate(key(), dec!(-1), YearRange::default()),
            Err(FeeError::NegativeAmount(_))
        ));
        assert!(FeeCatalog::validate(key(), Decimal::ZERO, YearRange::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_amount_column_cannot_hold() {
        assert!(matches!(
            FeeCatalog::validate(key(), dec!(500.004), YearRange::default()),
            Err(FeeError::InvalidAmount(AmountError::TooPrecise(_)))
        ));
        assert!(matches!(
            FeeCatalog::validate(key(), dec!(1000000000000), YearRange::default()),
            Err(FeeError::InvalidAmount(AmountError::TooLarge(_)))
        ));
        assert!(FeeCatalog::validate(key(), dec!(500.00), YearRange::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_year_out_of_range() {
        let key = FeeKey::new(GradeId::new(), TermNumber::FIRST, 1850);
        assert!(matches!(
            FeeCatalog::validate(key, dec!(100), YearRange::default()),
            Err(FeeError::YearOutOfRange { year: 1850, .. })
        ));
    }

    #[test]
    fn test_plan_upsert_same_amount_is_unchanged() {
        let key = key();
        let current = structure(key, dec!(500), true);
        let rows = vec![current.clone()];
        assert_eq!(
            FeeCatalog::plan_upsert(&rows, key, dec!(500)),
            UpsertPlan::Unchanged(current.id)
        );
    }

    #[test]
    fn test_plan_upsert_new_amount_replaces_active() {
        let key = key();
        let current = structure(key, dec!(500), true);
        let history = structure(key, dec!(450), false);
        let rows = vec![current.clone(), history];
        assert_eq!(
            FeeCatalog::plan_upsert(&rows, key, dec!(550)),
            UpsertPlan::Replace {
                deactivate: vec![current.id]
            }
        );
    }

    #[test]
    fn test_plan_upsert_first_structure() {
        assert_eq!(
            FeeCatalog::plan_upsert(&[], key(), dec!(500)),
            UpsertPlan::Replace { deactivate: vec![] }
        );
    }

    #[test]
    fn test_conflicts_for_activation() {
        let key = key();
        let target = structure(key, dec!(450), false);
        let active = structure(key, dec!(500), true);
        let rows = vec![target.clone(), active.clone()];
        assert_eq!(
            FeeCatalog::conflicts_for_activation(&rows, &target),
            vec![active.id]
        );
    }
}
