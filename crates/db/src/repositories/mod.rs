//! Repository abstractions for data access.
//!
//! Repositories own the transaction boundaries: they load and lock rows,
//! hand them to the core services for validation and persist the outcome
//! together with its audit entries.

pub mod audit;
pub mod balance;
pub mod fee_structure;
pub mod grade;
pub mod payment;
pub mod pupil;

pub use audit::{AuditLogRepository, AuditRecorder};
pub use balance::BalanceRepository;
pub use fee_structure::{FeeStructureFilter, FeeStructureRepository, FeeUpsert};
pub use grade::GradeRepository;
pub use payment::PaymentRepository;
pub use pupil::PupilRepository;
