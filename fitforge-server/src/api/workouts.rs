use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use fitforge_types::{
    CompleteRoutineRequest, CreateCommentRequest, CreateWorkoutLogRequest, WorkoutCompletion,
    WorkoutLog, WorkoutLogComment,
};

use crate::{
    api::{authenticated_user_id, parse_id, ApiError, ApiResult},
    db::{
        repositories::{
            CompletionRepository, NewWorkoutLog, ReactionRepository, WorkoutLogRepository,
        },
        Inserted,
    },
    state::AppState,
};

fn validate_log(payload: &CreateWorkoutLogRequest) -> ApiResult<()> {
    if payload.exercise.trim().is_empty() {
        return Err(ApiError::BadRequest("Exercise is required".to_string()));
    }
    if payload.sets == 0 || payload.reps == 0 {
        return Err(ApiError::BadRequest(
            "Sets and reps must be positive".to_string(),
        ));
    }
    if payload.weight.is_some_and(|w| !w.is_finite() || w < 0.0) {
        return Err(ApiError::BadRequest("Weight must be non-negative".to_string()));
    }
    Ok(())
}

/// POST /workouts/logs - Log a set of work and announce it in the feed
pub async fn create_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateWorkoutLogRequest>,
) -> ApiResult<(StatusCode, Json<WorkoutLog>)> {
    let user_id = authenticated_user_id(&state, &headers)?;
    validate_log(&payload)?;

    let log = WorkoutLogRepository::new(state.db.pool.clone()).create(
        &user_id,
        &NewWorkoutLog {
            exercise: payload.exercise.trim(),
            sets: payload.sets,
            reps: payload.reps,
            weight: payload.weight,
            calories: payload.calories.unwrap_or(0),
            duration: payload.duration.unwrap_or(0),
        },
    )?;

    Ok((StatusCode::CREATED, Json(log)))
}

/// GET /workouts/logs - The caller's logs, newest first
pub async fn list_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<WorkoutLog>>> {
    let user_id = authenticated_user_id(&state, &headers)?;
    let logs = WorkoutLogRepository::new(state.db.pool.clone()).list_for_user(&user_id)?;
    Ok(Json(logs))
}

/// POST /workouts/completed - Mark a routine done for today
pub async fn complete_routine(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CompleteRoutineRequest>,
) -> ApiResult<(StatusCode, Json<WorkoutCompletion>)> {
    let user_id = authenticated_user_id(&state, &headers)?;

    match CompletionRepository::new(state.db.pool.clone()).complete(&user_id, &payload.routine_id)? {
        Inserted::Created(completion) => Ok((StatusCode::CREATED, Json(completion))),
        Inserted::Duplicate => Err(ApiError::Conflict(
            "Routine already completed today".to_string(),
        )),
    }
}

/// GET /workouts/completed
pub async fn list_completions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<WorkoutCompletion>>> {
    let user_id = authenticated_user_id(&state, &headers)?;
    let completions = CompletionRepository::new(state.db.pool.clone()).list_for_user(&user_id)?;
    Ok(Json(completions))
}

fn existing_log(state: &AppState, raw_id: &str) -> ApiResult<WorkoutLog> {
    let log_id = parse_id(raw_id, "workout log")?;
    WorkoutLogRepository::new(state.db.pool.clone())
        .get_by_id(&log_id)?
        .ok_or_else(|| ApiError::NotFound("Workout log not found".to_string()))
}

/// POST /workouts/logs/:id/like
pub async fn like_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(log_id): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = authenticated_user_id(&state, &headers)?;
    let log = existing_log(&state, &log_id)?;

    match ReactionRepository::new(state.db.pool.clone()).like(&user_id, &log.id)? {
        Inserted::Created(()) => Ok(StatusCode::CREATED),
        Inserted::Duplicate => Err(ApiError::Conflict("Already liked".to_string())),
    }
}

/// DELETE /workouts/logs/:id/like
pub async fn unlike_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(log_id): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = authenticated_user_id(&state, &headers)?;
    let log_id = parse_id(&log_id, "workout log")?;

    let removed = ReactionRepository::new(state.db.pool.clone()).unlike(&user_id, &log_id)?;
    if removed == 0 {
        return Err(ApiError::NotFound("Like not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /workouts/logs/:id/comments
pub async fn add_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(log_id): Path<String>,
    Json(payload): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<WorkoutLogComment>)> {
    let user_id = authenticated_user_id(&state, &headers)?;
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Comment text is required".to_string()));
    }
    let log = existing_log(&state, &log_id)?;

    let reactions = ReactionRepository::new(state.db.pool.clone());
    let created = reactions.add_comment(&user_id, &log.id, text)?;
    // Reload to pick up the author's username
    let comment = reactions
        .comments(&log.id)?
        .into_iter()
        .find(|c| c.id == created.id)
        .unwrap_or(created);

    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /workouts/logs/:id/comments - Oldest first
pub async fn list_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(log_id): Path<String>,
) -> ApiResult<Json<Vec<WorkoutLogComment>>> {
    authenticated_user_id(&state, &headers)?;
    let log = existing_log(&state, &log_id)?;
    let comments = ReactionRepository::new(state.db.pool.clone()).comments(&log.id)?;
    Ok(Json(comments))
}
