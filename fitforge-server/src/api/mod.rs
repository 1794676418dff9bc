pub mod auth;
pub mod chat;
pub mod error;
pub mod exercises;
pub mod payments;
pub mod plans;
pub mod profile;
pub mod social;
pub mod workouts;

pub use error::{ApiError, ApiResult};

use axum::http::{header::AUTHORIZATION, HeaderMap};
use uuid::Uuid;

use fitforge_types::User;

use crate::db::repositories::UserRepository;
use crate::state::AppState;

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolve the caller's user id from the bearer session
pub fn authenticated_user_id(state: &AppState, headers: &HeaderMap) -> ApiResult<Uuid> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    state
        .session_manager
        .validate_session(token)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session".to_string()))
}

/// Load the caller's full user record
pub fn authenticated_user(state: &AppState, headers: &HeaderMap) -> ApiResult<User> {
    let user_id = authenticated_user_id(state, headers)?;
    UserRepository::new(state.db.pool.clone())
        .get_by_id(&user_id)?
        .ok_or_else(|| ApiError::Unauthorized("Session user no longer exists".to_string()))
}

/// Parse a path id, mapping garbage to 400
pub(crate) fn parse_id(raw: &str, what: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {} ID", what)))
}
