use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use fitforge_types::{CreateExerciseRequest, Exercise};

use crate::{
    api::{authenticated_user_id, ApiError, ApiResult},
    catalog::CatalogEntry,
    db::{repositories::ExerciseRepository, Inserted},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ExerciseFilter {
    pub muscle: Option<String>,
    pub equipment: Option<String>,
}

fn filter_value(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// GET /exercises?muscle=&equipment= - Persisted catalog entries
pub async fn list_exercises(
    State(state): State<AppState>,
    Query(filter): Query<ExerciseFilter>,
) -> ApiResult<Json<Vec<Exercise>>> {
    let exercises = ExerciseRepository::new(state.db.pool.clone())
        .list(filter_value(&filter.muscle), filter_value(&filter.equipment))?;
    Ok(Json(exercises))
}

/// POST /exercises - Add a catalog entry, looking up a demo video when none is given
pub async fn create_exercise(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateExerciseRequest>,
) -> ApiResult<(StatusCode, Json<Exercise>)> {
    authenticated_user_id(&state, &headers)?;

    let name = payload.name.trim();
    let muscle_group = payload.muscle_group.trim().to_lowercase();
    if name.is_empty() || muscle_group.is_empty() {
        return Err(ApiError::BadRequest(
            "Name and muscle group are required".to_string(),
        ));
    }

    let video_url = match payload.video_url.filter(|url| !url.trim().is_empty()) {
        Some(url) => Some(url),
        None => state.services.video.find_demo(name).await,
    };

    let exercise = Exercise {
        id: Uuid::new_v4(),
        name: name.to_string(),
        muscle_group,
        difficulty: payload.difficulty.trim().to_lowercase(),
        equipment: payload.equipment.trim().to_lowercase(),
        video_url,
    };

    match ExerciseRepository::new(state.db.pool.clone()).create(&exercise)? {
        Inserted::Created(()) => Ok((StatusCode::CREATED, Json(exercise))),
        Inserted::Duplicate => Err(ApiError::Conflict(format!(
            "Exercise '{}' already exists",
            exercise.name
        ))),
    }
}

#[derive(Debug, Deserialize)]
pub struct LibraryQuery {
    pub muscle: Option<String>,
}

/// GET /exercises/library?muscle= - Browse the external exercise database
pub async fn library(
    State(state): State<AppState>,
    Query(query): Query<LibraryQuery>,
) -> ApiResult<Json<Vec<CatalogEntry>>> {
    let entries = match filter_value(&query.muscle) {
        Some(muscle) => state.services.catalog.fetch_by_muscle_group(muscle).await,
        None => state.services.catalog.fetch_all().await,
    };
    Ok(Json(entries))
}
