use axum::{extract::State, http::HeaderMap, Json};

use fitforge_types::{AccountStatus, UpdateUserRequest, User, UserStats};

use crate::{
    api::{authenticated_user, authenticated_user_id, ApiError, ApiResult},
    db::{repositories::UserRepository, Inserted},
    state::AppState,
};

/// GET /user - The authenticated user's profile
pub async fn get_me(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<User>> {
    Ok(Json(authenticated_user(&state, &headers)?))
}

/// PATCH /user - Update email, goal or experience level
pub async fn update_me(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let user_id = authenticated_user_id(&state, &headers)?;

    let email = payload.email.as_deref().map(str::trim);
    if let Some(email) = email {
        if !email.contains('@') {
            return Err(ApiError::BadRequest("A valid email is required".to_string()));
        }
    }

    let repo = UserRepository::new(state.db.pool.clone());
    if let Inserted::Duplicate =
        repo.update_profile(&user_id, email, payload.fitness_goal, payload.experience_level)?
    {
        return Err(ApiError::Conflict("Email is already in use".to_string()));
    }

    let user = repo
        .get_by_id(&user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

/// GET /user/stats - Training and social totals
pub async fn get_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<UserStats>> {
    let user_id = authenticated_user_id(&state, &headers)?;
    let stats = UserRepository::new(state.db.pool.clone()).stats(&user_id)?;
    Ok(Json(stats))
}

/// GET /account/status - Current premium entitlement
pub async fn account_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<AccountStatus>> {
    let user = authenticated_user(&state, &headers)?;
    Ok(Json(AccountStatus {
        is_premium: user.is_premium,
        premium_since: user.premium_since,
    }))
}
