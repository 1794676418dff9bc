use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::state::AppState;

/// Build the HTTP router with tracing and open CORS
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Accounts
        .route("/register", post(api::auth::register))
        .route("/login", post(api::auth::login))
        .route("/logout", post(api::auth::logout))
        .route("/user", get(api::profile::get_me).patch(api::profile::update_me))
        .route("/user/stats", get(api::profile::get_stats))
        .route("/account/status", get(api::profile::account_status))
        // Exercise catalog
        .route(
            "/exercises",
            get(api::exercises::list_exercises).post(api::exercises::create_exercise),
        )
        .route("/exercises/library", get(api::exercises::library))
        // Plans
        .route(
            "/workout-plans",
            get(api::plans::list_plans).post(api::plans::create_plan),
        )
        .route("/workout-plans/current", get(api::plans::current_plan))
        .route("/workout-plans/:id", get(api::plans::get_plan))
        // Logging and completion
        .route(
            "/workouts/logs",
            get(api::workouts::list_logs).post(api::workouts::create_log),
        )
        .route(
            "/workouts/logs/:id/like",
            post(api::workouts::like_log).delete(api::workouts::unlike_log),
        )
        .route(
            "/workouts/logs/:id/comments",
            get(api::workouts::list_comments).post(api::workouts::add_comment),
        )
        .route(
            "/workouts/completed",
            get(api::workouts::list_completions).post(api::workouts::complete_routine),
        )
        // Social
        .route(
            "/users/:id/follow",
            post(api::social::follow_user).delete(api::social::unfollow_user),
        )
        .route("/social/following", get(api::social::get_following_list))
        .route("/social/followers", get(api::social::get_followers_list))
        .route("/social/activity", get(api::social::activity_feed))
        .route("/social/leaderboard", get(api::social::leaderboard))
        // Billing
        .route(
            "/payments/checkout-session",
            post(api::payments::create_checkout_session),
        )
        .route("/payments/webhook", post(api::payments::webhook))
        .route(
            "/payments/check-payment-status",
            get(api::payments::check_payment_status),
        )
        // Coaching chat
        .route("/ai-chat", post(api::chat::ai_chat))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn health_check() -> &'static str {
    "OK"
}
