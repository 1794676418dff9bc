use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};

use fitforge_types::{LoginRequest, LoginResponse, RegisterRequest};

use crate::{
    api::{bearer_token, ApiError, ApiResult},
    db::{
        repositories::{NewUser, UserRepository},
        Inserted,
    },
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;

fn bcrypt_cost() -> u32 {
    // Fast hashing for debug builds and tests
    if cfg!(debug_assertions) {
        4
    } else {
        bcrypt::DEFAULT_COST
    }
}

fn validate_registration(payload: &RegisterRequest) -> ApiResult<()> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::BadRequest("Username is required".to_string()));
    }
    if !payload.email.contains('@') {
        return Err(ApiError::BadRequest("A valid email is required".to_string()));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if payload.password != payload.password2 {
        return Err(ApiError::BadRequest("Password fields didn't match".to_string()));
    }
    Ok(())
}

/// POST /register - Create an account and start a session
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<LoginResponse>)> {
    validate_registration(&payload)?;

    let password = payload.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt_cost()))
        .await
        .map_err(|e| ApiError::InternalError(format!("Hashing task failed: {}", e)))?
        .map_err(|e| ApiError::InternalError(format!("Failed to hash password: {}", e)))?;

    let repo = UserRepository::new(state.db.pool.clone());
    let user = match repo.create(&NewUser {
        username: payload.username.trim(),
        email: payload.email.trim(),
        password_hash: &password_hash,
        fitness_goal: payload.fitness_goal.unwrap_or_default(),
        experience_level: payload.experience_level.unwrap_or_default(),
    })? {
        Inserted::Created(user) => user,
        Inserted::Duplicate => {
            return Err(ApiError::Conflict(
                "Username or email is already taken".to_string(),
            ))
        }
    };

    let session_token = state.session_manager.create_session(user.id)?;
    tracing::info!("Registered user {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(LoginResponse {
            user,
            session_token,
        }),
    ))
}

/// POST /login - Exchange credentials for a session token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let repo = UserRepository::new(state.db.pool.clone());

    let Some((user, password_hash)) = repo.get_credentials(payload.username.trim())? else {
        return Err(ApiError::Unauthorized("Invalid username or password".to_string()));
    };

    let password = payload.password;
    let valid = tokio::task::spawn_blocking(move || {
        bcrypt::verify(&password, &password_hash).unwrap_or(false)
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("Verification task failed: {}", e)))?;

    if !valid {
        return Err(ApiError::Unauthorized("Invalid username or password".to_string()));
    }

    let session_token = state.session_manager.create_session(user.id)?;

    Ok(Json(LoginResponse {
        user,
        session_token,
    }))
}

/// POST /logout - End the current session
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<serde_json::Value>> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    state.session_manager.delete_session(token)?;

    Ok(Json(serde_json::json!({
        "message": "Successfully logged out."
    })))
}
