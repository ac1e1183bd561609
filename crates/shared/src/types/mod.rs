//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;
pub mod term;

pub use id::*;
pub use money::{AmountError, MAX_AMOUNT, MONEY_SCALE, to_money};
pub use pagination::{PageMeta, PageRequest, PageResponse};
pub use term::{TermError, TermNumber};
