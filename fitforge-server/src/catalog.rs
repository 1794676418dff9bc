use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::ExerciseDb;

/// An exercise suggested for a muscle group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
}

impl CatalogEntry {
    fn canned(name: &str, target: &str, equipment: &str) -> Self {
        Self {
            name: name.to_string(),
            target: Some(target.to_string()),
            equipment: Some(equipment.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("exercise catalog API key is not configured")]
    NotConfigured,
    #[error("exercise catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("exercise catalog returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Source of exercise suggestions.
///
/// Implementations never fail: an unreachable catalog resolves to the local fallback.
#[async_trait]
pub trait ExerciseCatalog: Send + Sync {
    async fn fetch_by_muscle_group(&self, group: &str) -> Vec<CatalogEntry>;
    async fn fetch_all(&self) -> Vec<CatalogEntry>;
}

/// Canned entries used when the external catalog is unavailable.
/// Unknown muscle groups have no entries.
pub fn fallback_for(group: &str) -> Vec<CatalogEntry> {
    match group.trim().to_lowercase().as_str() {
        "chest" => vec![
            CatalogEntry::canned("Push-up", "chest", "body weight"),
            CatalogEntry::canned("Bench Press", "pectorals", "barbell"),
            CatalogEntry::canned("Chest Fly", "pectorals", "dumbbell"),
        ],
        "back" => vec![
            CatalogEntry::canned("Pull-up", "back", "pull-up bar"),
            CatalogEntry::canned("Bent Over Row", "upper back", "barbell"),
            CatalogEntry::canned("Lat Pulldown", "lats", "cable"),
        ],
        "legs" => vec![
            CatalogEntry::canned("Squat", "quadriceps", "body weight"),
            CatalogEntry::canned("Lunge", "glutes", "body weight"),
            CatalogEntry::canned("Romanian Deadlift", "hamstrings", "barbell"),
        ],
        "shoulders" => vec![
            CatalogEntry::canned("Shoulder Press", "delts", "dumbbell"),
            CatalogEntry::canned("Lateral Raise", "delts", "dumbbell"),
        ],
        "arms" => vec![
            CatalogEntry::canned("Bicep Curl", "biceps", "dumbbell"),
            CatalogEntry::canned("Tricep Dips", "triceps", "body weight"),
        ],
        _ => Vec::new(),
    }
}

/// Fallback for the full-list endpoint
pub fn fallback_all() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::canned("Push-up", "chest", "body weight"),
        CatalogEntry::canned("Pull-up", "back", "pull-up bar"),
        CatalogEntry::canned("Squat", "quadriceps", "body weight"),
    ]
}

/// RapidAPI ExerciseDB client
#[derive(Clone)]
pub struct ExerciseDbClient {
    client: reqwest::Client,
    base_url: String,
    host: String,
    api_key: Option<String>,
}

impl ExerciseDbClient {
    pub fn new(settings: &ExerciseDb) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            host: settings.host.clone(),
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
        }
    }

    async fn request(&self, path: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        let api_key = self.api_key.as_deref().ok_or(CatalogError::NotConfigured)?;

        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", &self.host)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status()));
        }

        Ok(response.json::<Vec<CatalogEntry>>().await?)
    }
}

#[async_trait]
impl ExerciseCatalog for ExerciseDbClient {
    async fn fetch_by_muscle_group(&self, group: &str) -> Vec<CatalogEntry> {
        match self.request(&target_path(group)).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Exercise catalog unavailable for '{}', using fallback: {}", group, e);
                fallback_for(group)
            }
        }
    }

    async fn fetch_all(&self) -> Vec<CatalogEntry> {
        match self.request("/exercises").await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Exercise catalog unavailable, using fallback list: {}", e);
                fallback_all()
            }
        }
    }
}

fn target_path(group: &str) -> String {
    format!(
        "/exercises/target/{}",
        urlencoding::encode(&group.trim().to_lowercase())
    )
}
