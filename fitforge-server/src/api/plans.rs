use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use fitforge_types::{CreatePlanRequest, WorkoutPlan};

use crate::{
    api::{authenticated_user, authenticated_user_id, parse_id, ApiError, ApiResult},
    db::repositories::PlanRepository,
    planner::{assemble_plan, PlanRequest},
    state::AppState,
};

const DEFAULT_PLAN_DAYS: i64 = 3;

/// POST /workout-plans - Assemble a plan from the exercise catalog
pub async fn create_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreatePlanRequest>,
) -> ApiResult<(StatusCode, Json<WorkoutPlan>)> {
    let user = authenticated_user(&state, &headers)?;

    let request = PlanRequest {
        goal: non_empty(payload.goal).unwrap_or_else(|| user.fitness_goal.as_str().to_string()),
        level: non_empty(payload.level)
            .unwrap_or_else(|| user.experience_level.as_str().to_string()),
        days: payload.days.unwrap_or(DEFAULT_PLAN_DAYS),
        muscle_groups: payload.muscle_groups,
    };

    let plans = PlanRepository::new(state.db.pool.clone());
    let plan = assemble_plan(state.services.catalog.as_ref(), &plans, &user.id, &request)
        .await
        .map_err(|e| ApiError::InternalError(format!("Failed to create workout plan: {:#}", e)))?;

    Ok((StatusCode::CREATED, Json(plan)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

/// GET /workout-plans - All of the caller's plans, newest first
pub async fn list_plans(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<WorkoutPlan>>> {
    let user_id = authenticated_user_id(&state, &headers)?;
    let plans = PlanRepository::new(state.db.pool.clone()).list_for_user(&user_id)?;
    Ok(Json(plans))
}

/// GET /workout-plans/current - The most recently created plan
pub async fn current_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<WorkoutPlan>> {
    let user_id = authenticated_user_id(&state, &headers)?;
    PlanRepository::new(state.db.pool.clone())
        .get_current(&user_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No workout plan found".to_string()))
}

/// GET /workout-plans/:id
pub async fn get_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(plan_id): Path<String>,
) -> ApiResult<Json<WorkoutPlan>> {
    let user_id = authenticated_user_id(&state, &headers)?;
    let plan_id = parse_id(&plan_id, "plan")?;

    PlanRepository::new(state.db.pool.clone())
        .get_by_id(&user_id, &plan_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Workout plan not found".to_string()))
}
