//! Actor roles and permission checks.
//!
//! Identity comes from an external provider; every ledger operation
//! receives an explicit [`ActorContext`] instead of reading ambient
//! session state.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use feeledger_shared::AppError;
use feeledger_shared::types::UserId;

/// Actor role, ordered from lowest to highest privilege.
///
/// Higher roles can perform all actions of lower roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    /// Read-only access to balances and reports.
    Viewer = 0,
    /// Records payments and requests deletions.
    Clerk = 1,
    /// Manages grades and fee structures.
    Bursar = 2,
    /// Reviews deletion requests.
    Admin = 3,
}

impl ActorRole {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Some(Self::Viewer),
            "clerk" => Some(Self::Clerk),
            "bursar" => Some(Self::Bursar),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Clerk => "clerk",
            Self::Bursar => "bursar",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action guarded by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Read balances, summaries and the approval queue.
    ReadLedger,
    /// Record a new payment.
    RecordPayment,
    /// Ask for a payment to be soft-deleted.
    RequestPaymentDeletion,
    /// Approve or reject a deletion request.
    ReviewPaymentDeletion,
    /// Create, replace or toggle fee structures.
    ManageFees,
    /// Create, rename or delete grades.
    ManageGrades,
    /// Register pupils and guardians.
    ManagePupils,
}

impl Permission {
    /// Lowest role allowed to perform the action.
    #[must_use]
    pub const fn minimum_role(self) -> ActorRole {
        match self {
            Self::ReadLedger => ActorRole::Viewer,
            Self::RecordPayment | Self::RequestPaymentDeletion | Self::ManagePupils => {
                ActorRole::Clerk
            }
            Self::ManageFees | Self::ManageGrades => ActorRole::Bursar,
            Self::ReviewPaymentDeletion => ActorRole::Admin,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::ReadLedger => "read the ledger",
            Self::RecordPayment => "record payments",
            Self::RequestPaymentDeletion => "request payment deletion",
            Self::ReviewPaymentDeletion => "review payment deletion",
            Self::ManageFees => "manage fee structures",
            Self::ManageGrades => "manage grades",
            Self::ManagePupils => "manage pupils",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actor lacks the role required for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Role {role} may not {permission}")]
pub struct AccessDenied {
    /// The actor's role.
    pub role: ActorRole,
    /// The attempted action.
    pub permission: Permission,
}

impl From<AccessDenied> for AppError {
    fn from(err: AccessDenied) -> Self {
        Self::Forbidden(err.to_string())
    }
}

/// Who is performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorContext {
    /// The acting user.
    pub actor_id: UserId,
    /// The acting user's role.
    pub role: ActorRole,
}

impl ActorContext {
    /// Creates a new actor context.
    #[must_use]
    pub const fn new(actor_id: UserId, role: ActorRole) -> Self {
        Self { actor_id, role }
    }

    /// Returns true if the actor may perform the action.
    #[must_use]
    pub fn can(&self, permission: Permission) -> bool {
        self.role >= permission.minimum_role()
    }

    /// Fails unless the actor may perform the action.
    pub fn require(&self, permission: Permission) -> Result<(), AccessDenied> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(AccessDenied {
                role: self.role,
                permission,
            })
        }
    }
}
