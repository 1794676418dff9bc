use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use fitforge_types::CheckoutSessionResponse;

use crate::{
    api::{authenticated_user, authenticated_user_id, ApiError, ApiResult},
    billing::{ReconcileOutcome, SubscriptionReconciler, WebhookEvent},
    db::repositories::UserRepository,
    state::AppState,
};

const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// POST /payments/checkout-session - Start a premium subscription checkout
pub async fn create_checkout_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<CheckoutSessionResponse>> {
    let user = authenticated_user(&state, &headers)?;

    let session = state
        .services
        .billing
        .create_checkout_session(&user)
        .await
        .map_err(|e| ApiError::ServiceUnavailable(format!("Payment provider error: {}", e)))?;

    Ok(Json(session))
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// POST /payments/webhook - Signed billing events
///
/// Unverifiable deliveries are rejected before anything is parsed. Verified
/// events that cannot be matched to a user are acknowledged and dropped.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    state
        .services
        .webhook_validator
        .verify(signature, &body)
        .map_err(|e| {
            tracing::warn!("Rejected billing webhook: {}", e);
            ApiError::BadRequest(e.to_string())
        })?;

    let delivery = WebhookEvent::from_slice(&body).map_err(|e| {
        tracing::warn!("Rejected billing webhook: {}", e);
        ApiError::BadRequest(e.to_string())
    })?;

    let outcome = SubscriptionReconciler::new(state.db.pool.clone()).apply(&delivery.event)?;
    tracing::debug!("Billing event {} -> {:?}", delivery.id, outcome);

    Ok(Json(WebhookAck { received: true }))
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub is_premium: bool,
    pub payment_status: Option<String>,
}

/// GET /payments/check-payment-status?session_id= - Pull-based entitlement check
pub async fn check_payment_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PaymentStatusQuery>,
) -> ApiResult<Json<PaymentStatusResponse>> {
    let user_id = authenticated_user_id(&state, &headers)?;
    let session_id = query
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("session_id is required".to_string()))?;

    let session = state
        .services
        .billing
        .retrieve_checkout_session(session_id)
        .await
        .map_err(|e| ApiError::ServiceUnavailable(format!("Payment provider error: {}", e)))?;

    if session.is_paid() {
        let outcome = SubscriptionReconciler::new(state.db.pool.clone())
            .checkout_completed(&session, Some(&user_id))?;
        if outcome == ReconcileOutcome::Dropped {
            return Err(ApiError::NotFound("User for this session not found".to_string()));
        }
    }

    let user = UserRepository::new(state.db.pool.clone())
        .get_by_id(&user_id)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(PaymentStatusResponse {
        is_premium: user.is_premium,
        payment_status: session.payment_status,
    }))
}
