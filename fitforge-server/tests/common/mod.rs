// Shared harness for router-level tests: in-memory database plus stub collaborators.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use fitforge_server::{
    billing::{BillingProvider, CheckoutSession, WebhookSignatureValidator},
    catalog::{fallback_all, fallback_for, CatalogEntry, ExerciseCatalog},
    chat::ChatProvider,
    db::Database,
    routes,
    state::{AppState, Services},
    upstream::UpstreamError,
    video::VideoLookup,
};
use fitforge_types::{CheckoutSessionResponse, User};

pub const WEBHOOK_SECRET: &str = "whsec_integration";

/// Catalog that always behaves as if the external service were down
pub struct OfflineCatalog;

#[async_trait]
impl ExerciseCatalog for OfflineCatalog {
    async fn fetch_by_muscle_group(&self, group: &str) -> Vec<CatalogEntry> {
        fallback_for(group)
    }

    async fn fetch_all(&self) -> Vec<CatalogEntry> {
        fallback_all()
    }
}

/// Sessions whose id starts with `cs_paid` report as paid
pub struct StubBilling;

#[async_trait]
impl BillingProvider for StubBilling {
    async fn create_checkout_session(
        &self,
        user: &User,
    ) -> Result<CheckoutSessionResponse, UpstreamError> {
        Ok(CheckoutSessionResponse {
            url: format!("https://checkout.test/{}", user.id),
            session_id: "cs_test_1".to_string(),
        })
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, UpstreamError> {
        let paid = session_id.starts_with("cs_paid");
        Ok(CheckoutSession {
            id: session_id.to_string(),
            url: None,
            customer: paid.then(|| "cus_pull".to_string()),
            subscription: paid.then(|| "sub_pull".to_string()),
            payment_status: Some(if paid { "paid" } else { "unpaid" }.to_string()),
            metadata: HashMap::new(),
        })
    }
}

pub struct StubVideo;

#[async_trait]
impl VideoLookup for StubVideo {
    async fn find_demo(&self, exercise_name: &str) -> Option<String> {
        Some(format!("https://video.test/{}", exercise_name.replace(' ', "-")))
    }
}

/// Echoes the message; messages mentioning "outage" fail
pub struct StubChat;

#[async_trait]
impl ChatProvider for StubChat {
    async fn reply(&self, message: &str) -> Result<String, UpstreamError> {
        if message.contains("outage") {
            return Err(UpstreamError::Malformed("stub outage".to_string()));
        }
        Ok(format!("Coach: {}", message))
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: Database,
}

impl TestApp {
    pub fn new() -> Self {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        db.seed_exercises().expect("Failed to seed exercises");

        let services = Services {
            catalog: Arc::new(OfflineCatalog),
            billing: Arc::new(StubBilling),
            video: Arc::new(StubVideo),
            chat: Arc::new(StubChat),
            webhook_validator: Arc::new(WebhookSignatureValidator::new(Some(
                WEBHOOK_SECRET.to_string(),
            ))),
        };

        let router = routes::router(AppState::new(db.clone(), services));
        Self { router, db }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, Some(token), None).await
    }

    /// Register a user and return (session token, user id)
    pub async fn register(&self, username: &str) -> (String, Uuid) {
        let (status, body) = self
            .call(
                Method::POST,
                "/register",
                None,
                Some(serde_json::json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "correct horse",
                    "password2": "correct horse",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        let token = body["session_token"].as_str().expect("token").to_string();
        let id = Uuid::parse_str(body["user"]["id"].as_str().expect("id")).expect("uuid");
        (token, id)
    }

    /// Flip the premium flag directly in storage
    pub fn make_premium(&self, user_id: &Uuid) {
        let conn = self.db.connection().expect("connection");
        conn.execute(
            "UPDATE users SET is_premium = 1 WHERE id = ?",
            [user_id.to_string()],
        )
        .expect("Failed to mark premium");
    }
}
