use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use fitforge_types::{Activity, FeedScope, FollowSummary, LeaderboardEntry};

use crate::{
    api::{authenticated_user_id, parse_id, ApiError, ApiResult},
    db::{
        repositories::{ActivityRepository, FollowRepository, UserRepository},
        Inserted,
    },
    state::AppState,
};

/// POST /users/:id/follow
pub async fn follow_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(target_id): Path<String>,
) -> ApiResult<StatusCode> {
    let follower_id = authenticated_user_id(&state, &headers)?;
    let target_id = parse_id(&target_id, "user")?;

    if follower_id == target_id {
        return Err(ApiError::BadRequest("Cannot follow yourself".to_string()));
    }

    UserRepository::new(state.db.pool.clone())
        .get_by_id(&target_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    match FollowRepository::new(state.db.pool.clone()).follow(&follower_id, &target_id)? {
        Inserted::Created(()) => {
            tracing::debug!("User {} now follows {}", follower_id, target_id);
            Ok(StatusCode::CREATED)
        }
        Inserted::Duplicate => Err(ApiError::Conflict("Already following".to_string())),
    }
}

/// DELETE /users/:id/follow
pub async fn unfollow_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(target_id): Path<String>,
) -> ApiResult<StatusCode> {
    let follower_id = authenticated_user_id(&state, &headers)?;
    let target_id = parse_id(&target_id, "user")?;

    let removed = FollowRepository::new(state.db.pool.clone()).unfollow(&follower_id, &target_id)?;
    if removed == 0 {
        return Err(ApiError::NotFound("Not following this user".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /social/following
pub async fn get_following_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<FollowSummary>>> {
    let user_id = authenticated_user_id(&state, &headers)?;
    let users = FollowRepository::new(state.db.pool.clone()).get_following(&user_id)?;
    Ok(Json(users))
}

/// GET /social/followers
pub async fn get_followers_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<FollowSummary>>> {
    let user_id = authenticated_user_id(&state, &headers)?;
    let users = FollowRepository::new(state.db.pool.clone()).get_followers(&user_id)?;
    Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub scope: Option<String>,
}

/// GET /social/activity?scope=all|following - Most recent activity
pub async fn activity_feed(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Json<Vec<Activity>>> {
    let viewer_id = authenticated_user_id(&state, &headers)?;

    let scope = match query.scope.as_deref() {
        None => FeedScope::default(),
        Some(raw) => FeedScope::parse(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown feed scope '{}'", raw)))?,
    };

    let activities = ActivityRepository::new(state.db.pool.clone()).feed(&viewer_id, scope)?;
    Ok(Json(activities))
}

/// GET /social/leaderboard - Every user ranked by logged workouts
pub async fn leaderboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    authenticated_user_id(&state, &headers)?;
    let entries = ActivityRepository::new(state.db.pool.clone()).leaderboard()?;
    Ok(Json(entries))
}
