//! Actor identity extraction.
//!
//! Authentication happens upstream. The identity provider forwards the
//! authenticated user and role in `x-actor-id` and `x-actor-role`; every
//! handler that touches the ledger takes an [`Actor`] and passes its
//! [`ActorContext`] down explicitly.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use uuid::Uuid;

use feeledger_core::access::{ActorContext, ActorRole};
use feeledger_shared::AppError;
use feeledger_shared::types::UserId;

use crate::error::ApiError;

/// Header carrying the acting user's id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the acting user's role.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extractor for the acting user.
///
/// Repositories check the actor's role, so handlers only pass it on:
///
/// ```ignore
/// async fn handler(State(state): State<AppState>, Actor(actor): Actor) -> impl IntoResponse {
///     let grades = state.grades.list_grades(&actor).await?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub ActorContext);

impl Actor {
    /// Reads the actor from request headers.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::Unauthorized(format!("{name} header is required")))
        };

        let actor_id = Uuid::parse_str(header(ACTOR_ID_HEADER)?)
            .map_err(|_| AppError::Unauthorized(format!("{ACTOR_ID_HEADER} must be a UUID")))?;
        let role_value = header(ACTOR_ROLE_HEADER)?;
        let role = ActorRole::parse(role_value)
            .ok_or_else(|| AppError::Unauthorized(format!("Unknown role: {role_value}")))?;

        Ok(Self(ActorContext::new(UserId::from_uuid(actor_id), role)))
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers).map_err(ApiError::from)
    }
}
