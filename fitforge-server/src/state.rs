use std::sync::Arc;

use crate::billing::{BillingProvider, StripeClient, WebhookSignatureValidator};
use crate::catalog::{ExerciseCatalog, ExerciseDbClient};
use crate::chat::{ChatProvider, CohereClient};
use crate::config::Settings;
use crate::db::Database;
use crate::session::SessionManager;
use crate::video::{VideoLookup, YouTubeClient};

/// External collaborators, built once at startup
#[derive(Clone)]
pub struct Services {
    pub catalog: Arc<dyn ExerciseCatalog>,
    pub billing: Arc<dyn BillingProvider>,
    pub video: Arc<dyn VideoLookup>,
    pub chat: Arc<dyn ChatProvider>,
    pub webhook_validator: Arc<WebhookSignatureValidator>,
}

impl Services {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            catalog: Arc::new(ExerciseDbClient::new(&settings.exercise_db)),
            billing: Arc::new(StripeClient::new(&settings.billing)),
            video: Arc::new(YouTubeClient::new(&settings.video)),
            chat: Arc::new(CohereClient::new(&settings.chat)),
            webhook_validator: Arc::new(WebhookSignatureValidator::new(
                settings.billing.webhook_secret.clone(),
            )),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub session_manager: SessionManager,
    pub services: Services,
}

impl AppState {
    pub fn new(db: Database, services: Services) -> Self {
        let session_manager = SessionManager::new(db.clone());
        Self {
            db,
            session_manager,
            services,
        }
    }
}
