use axum::{extract::State, http::HeaderMap, Json};

use fitforge_types::{ChatRequest, ChatResponse};

use crate::{
    api::{authenticated_user, ApiError, ApiResult},
    state::AppState,
};

/// POST /ai-chat - Premium coaching chat
pub async fn ai_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let user = authenticated_user(&state, &headers)?;
    if !user.is_premium {
        return Err(ApiError::Forbidden(
            "AI chat is available to premium members".to_string(),
        ));
    }

    let message = payload.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message is required".to_string()));
    }

    let response = state.services.chat.reply(message).await.map_err(|e| {
        tracing::warn!("Chat provider failed for user {}: {}", user.id, e);
        ApiError::ServiceUnavailable("AI service error".to_string())
    })?;

    Ok(Json(ChatResponse { response }))
}
