//! Validation rules for the school registry.

use chrono::Utc;

use feeledger_shared::types::{GradeId, ParentId, PupilId};

use crate::access::{ActorContext, Permission};
use crate::school::error::SchoolError;
use crate::school::types::{
    Grade, GradeDependents, NewParent, NewPupil, Parent, Pupil, PupilStatus,
};

const MAX_NAME_LEN: usize = 120;

/// Stateless service for grade, pupil and guardian rules.
pub struct SchoolService;

impl SchoolService {
    /// Trims and validates a display name.
    pub fn normalize_name(field: &str, name: &str) -> Result<String, SchoolError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(SchoolError::Validation(format!("{field} is required")));
        }
        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(SchoolError::Validation(format!(
                "{field} must be at most {MAX_NAME_LEN} characters"
            )));
        }
        Ok(trimmed.to_string())
    }

    /// Builds a new grade.
    pub fn new_grade(name: &str, actor: &ActorContext) -> Result<Grade, SchoolError> {
        actor.require(Permission::ManageGrades)?;
        Ok(Grade {
            id: GradeId::new(),
            name: Self::normalize_name("Grade name", name)?,
            created_at: Utc::now(),
        })
    }

    /// Renames a grade. Rename is the only mutation a grade allows.
    pub fn rename_grade(
        grade: &Grade,
        new_name: &str,
        actor: &ActorContext,
    ) -> Result<Grade, SchoolError> {
        actor.require(Permission::ManageGrades)?;
        Ok(Grade {
            name: Self::normalize_name("Grade name", new_name)?,
            ..grade.clone()
        })
    }

    /// Rejects deleting a grade that pupils or fee structures still reference.
    pub fn ensure_grade_deletable(
        grade_id: GradeId,
        dependents: GradeDependents,
        actor: &ActorContext,
    ) -> Result<(), SchoolError> {
        actor.require(Permission::ManageGrades)?;
        if dependents.is_empty() {
            Ok(())
        } else {
            Err(SchoolError::GradeInUse {
                grade_id,
                pupils: dependents.pupils,
                fee_structures: dependents.fee_structures,
            })
        }
    }

    /// Builds a new pupil in `Active` status.
    pub fn new_pupil(input: NewPupil, actor: &ActorContext) -> Result<Pupil, SchoolError> {
        actor.require(Permission::ManagePupils)?;
        Ok(Pupil {
            id: PupilId::new(),
            full_name: Self::normalize_name("Pupil name", &input.full_name)?,
            grade_id: input.grade_id,
            status: PupilStatus::Active,
            enrolled_at: input.enrolled_at,
        })
    }

    /// Changes a pupil's enrolment status.
    ///
    /// Returns `None` if the pupil already has `status`.
    pub fn change_status(
        pupil: &Pupil,
        status: PupilStatus,
        actor: &ActorContext,
    ) -> Result<Option<Pupil>, SchoolError> {
        actor.require(Permission::ManagePupils)?;
        if pupil.status == status {
            return Ok(None);
        }
        Ok(Some(Pupil {
            status,
            ..pupil.clone()
        }))
    }

    /// Moves a pupil to another grade.
    ///
    /// Returns `None` if the pupil is already in `grade_id`.
    pub fn move_grade(
        pupil: &Pupil,
        grade_id: GradeId,
        actor: &ActorContext,
    ) -> Result<Option<Pupil>, SchoolError> {
        actor.require(Permission::ManagePupils)?;
        if pupil.grade_id == grade_id {
            return Ok(None);
        }
        Ok(Some(Pupil {
            grade_id,
            ..pupil.clone()
        }))
    }

    /// Builds a new parent record.
    pub fn new_parent(input: NewParent, actor: &ActorContext) -> Result<Parent, SchoolError> {
        actor.require(Permission::ManagePupils)?;
        let email = input
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        if let Some(email) = &email
            && !email.contains('@')
        {
            return Err(SchoolError::Validation(format!(
                "Invalid email address: {email}"
            )));
        }
        Ok(Parent {
            id: ParentId::new(),
            full_name: Self::normalize_name("Parent name", &input.full_name)?,
            phone: input
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            email,
        })
    }
}
