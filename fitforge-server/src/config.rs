use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub path: String,
}

/// Third-party exercise database (RapidAPI ExerciseDB)
#[derive(Debug, Clone, Deserialize)]
pub struct ExerciseDb {
    pub base_url: String,
    pub host: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Stripe checkout and webhook settings
#[derive(Debug, Clone, Deserialize)]
pub struct Billing {
    pub api_base: String,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub webhook_secret: Option<String>,
    pub price_id: String,
    pub frontend_url: String,
}

/// YouTube search used to attach demo videos to catalog entries
#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Cohere chat completion
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub exercise_db: ExerciseDb,
    pub billing: Billing,
    pub video: Video,
    pub chat: Chat,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // 1. Try to load from settings.toml (optional for deployment)
        let config_file_name = "settings.toml";

        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        // Check in fitforge-server directory (for development)
        let dev_path = PathBuf::from("fitforge-server").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        builder = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("database.path", "fitforge.db")?
            .set_default("exercise_db.base_url", "https://exercisedb.p.rapidapi.com")?
            .set_default("exercise_db.host", "exercisedb.p.rapidapi.com")?
            .set_default("billing.api_base", "https://api.stripe.com")?
            .set_default("billing.price_id", "price_1Rd6mN4ZxM9ej8PKJfPfgFra")?
            .set_default("billing.frontend_url", "http://localhost:5173")?
            .set_default("video.base_url", "https://www.googleapis.com/youtube/v3")?
            .set_default("chat.base_url", "https://api.cohere.com")?
            .set_default("chat.model", "command-r-plus")?;

        // 2. Override with environment variables (highest priority)
        let overrides = [
            ("DATABASE_PATH", "database.path"),
            ("PORT", "server.port"),
            ("HOST", "server.host"),
            ("EXERCISE_DB_API_KEY", "exercise_db.api_key"),
            ("EXERCISE_DB_HOST", "exercise_db.host"),
            ("STRIPE_SECRET_KEY", "billing.secret_key"),
            ("STRIPE_WEBHOOK_SECRET", "billing.webhook_secret"),
            ("STRIPE_PRICE_ID", "billing.price_id"),
            ("FRONTEND_URL", "billing.frontend_url"),
            ("YOUTUBE_API_KEY", "video.api_key"),
            ("COHERE_API_KEY", "chat.api_key"),
        ];
        for (var, key) in overrides {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        let s = builder.build()?;
        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_section() {
        let settings = Settings::new().expect("Failed to load settings");
        assert!(!settings.server.host.is_empty());
        assert!(settings.exercise_db.base_url.starts_with("https://"));
        assert!(settings.billing.api_base.contains("stripe"));
        assert!(!settings.chat.model.is_empty());
    }
}
