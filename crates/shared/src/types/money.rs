//! Money amounts as the ledger stores them.
//!
//! CRITICAL: Never use floating-point for money.
//! Amounts live in `NUMERIC(14, 2)` columns, so anything finer than a cent
//! or wider than twelve integer digits is rejected before it reaches the
//! store instead of being rounded or overflowing there.

use rust_decimal::Decimal;
use thiserror::Error;

/// Decimal places kept for every stored amount.
pub const MONEY_SCALE: u32 = 2;

/// Largest magnitude a `NUMERIC(14, 2)` column holds.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, MONEY_SCALE);

/// Amount the store cannot hold exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    /// More than two decimal places.
    #[error("Amount {0} has more than {MONEY_SCALE} decimal places")]
    TooPrecise(Decimal),

    /// Magnitude above [`MAX_AMOUNT`].
    #[error("Amount {0} exceeds the maximum of {MAX_AMOUNT}")]
    TooLarge(Decimal),
}

/// Checks that `amount` fits the money column without rounding.
///
/// Trailing zeros are not counted, so `100.000` is accepted. The returned
/// value carries at most [`MONEY_SCALE`] decimal places.
pub fn to_money(amount: Decimal) -> Result<Decimal, AmountError> {
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(AmountError::TooPrecise(amount));
    }
    if amount.abs() > MAX_AMOUNT {
        return Err(AmountError::TooLarge(amount));
    }
    Ok(amount.round_dp(MONEY_SCALE))
}
