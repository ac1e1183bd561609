//! Grades, pupils and guardians.

pub mod error;
pub mod service;
pub mod types;

pub use error::SchoolError;
pub use service::SchoolService;
pub use types::{
    Grade, GradeDependents, NewParent, NewPupil, Parent, Pupil, PupilStatus,
};
