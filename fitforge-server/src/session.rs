use crate::db::Database;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

/// Lifetime of a bearer session
pub const SESSION_TTL_DAYS: i64 = 30;

/// Database-backed bearer sessions
///
/// Tokens are opaque UUID v4 strings stored with an expiry. Expired rows are
/// removed lazily on validation and in bulk by `cleanup_expired_sessions`.
#[derive(Clone)]
pub struct SessionManager {
    db: Database,
}

impl SessionManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a session for a user and return its token
    pub fn create_session(&self, user_id: Uuid) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let expires_at = created_at + Duration::days(SESSION_TTL_DAYS);

        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                token,
                user_id.to_string(),
                created_at.to_rfc3339(),
                expires_at.to_rfc3339(),
            ],
        )
        .context("Failed to create session")?;

        tracing::info!("Created session for user {}", user_id);
        Ok(token)
    }

    /// Resolve a token to its user.
    ///
    /// Returns `Ok(None)` for unknown or expired tokens; errors are reserved
    /// for storage failures.
    pub fn validate_session(&self, token: &str) -> Result<Option<Uuid>> {
        let row: Option<(String, String)> = {
            let conn = self.db.connection()?;
            conn.query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
                rusqlite::params![token],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .context("Failed to look up session")?
        };

        let Some((user_id_str, expires_at_str)) = row else {
            return Ok(None);
        };

        let expires_at = DateTime::parse_from_rfc3339(&expires_at_str)
            .context("Failed to parse expiry time")?
            .with_timezone(&Utc);

        if Utc::now() > expires_at {
            self.delete_session(token)?;
            tracing::debug!("Rejected expired session");
            return Ok(None);
        }

        let user_id = Uuid::parse_str(&user_id_str).context("Failed to parse user ID")?;
        Ok(Some(user_id))
    }

    /// Delete a session (logout)
    pub fn delete_session(&self, token: &str) -> Result<()> {
        let conn = self.db.connection()?;
        let rows_affected = conn
            .execute("DELETE FROM sessions WHERE token = ?1", rusqlite::params![token])
            .context("Failed to delete session")?;

        if rows_affected > 0 {
            tracing::info!("Deleted session");
        }

        Ok(())
    }

    /// Remove every session past its expiry; returns the number removed
    pub fn cleanup_expired_sessions(&self) -> Result<usize> {
        let conn = self.db.connection()?;
        let now = Utc::now().to_rfc3339();

        let rows_affected = conn
            .execute("DELETE FROM sessions WHERE expires_at < ?1", rusqlite::params![now])
            .context("Failed to cleanup expired sessions")?;

        if rows_affected > 0 {
            tracing::info!("Cleaned up {} expired sessions", rows_affected);
        }

        Ok(rows_affected)
    }
}
