//! Bearer-token extractors.
//!
//! Writes require [`AuthUser`]. Reads that change shape for the author or a
//! moderator (a pending comment, for instance) take [`MaybeAuthUser`].

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use quill_core::actor::Actor;
use quill_core::error::CoreError;
use quill_core::types::DbId;

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::state::AppState;

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

/// The token in `Authorization: Bearer <token>`, or `None` without the header.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| unauthorized("Malformed Authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(|token| Some(token.trim()))
        .ok_or_else(|| unauthorized("Expected a Bearer token"))
}

/// Signed-in commenter.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: String,
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role.clone())
    }

    fn from_token(token: &str, state: &AppState) -> Result<Self, AppError> {
        let claims = verify_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;
        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| unauthorized("Sign in to continue"))?;
        AuthUser::from_token(token, state)
    }
}

/// Anonymous or signed-in caller. A header that is present but invalid is
/// still a 401 rather than silently anonymous.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn actor(&self) -> Option<Actor> {
        self.0.as_ref().map(AuthUser::actor)
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = bearer_token(parts)?
            .map(|token| AuthUser::from_token(token, state))
            .transpose()?;
        Ok(MaybeAuthUser(user))
    }
}
