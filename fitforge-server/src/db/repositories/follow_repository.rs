use anyhow::{Context, Result};
use chrono::Utc;
use uuid::Uuid;

use fitforge_types::FollowSummary;

use crate::db::{is_unique_violation, uuid_column, DbPool, Inserted};

pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Follow a user; an existing edge yields `Inserted::Duplicate`
    pub fn follow(&self, follower_id: &Uuid, following_id: &Uuid) -> Result<Inserted<()>> {
        let conn = self.pool.get()?;
        let result = conn.execute(
            "INSERT INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)",
            (
                follower_id.to_string(),
                following_id.to_string(),
                Utc::now().to_rfc3339(),
            ),
        );

        match result {
            Ok(_) => Ok(Inserted::Created(())),
            Err(e) if is_unique_violation(&e) => Ok(Inserted::Duplicate),
            Err(e) => Err(e).context("Failed to follow user"),
        }
    }

    /// Unfollow a user
    pub fn unfollow(&self, follower_id: &Uuid, following_id: &Uuid) -> Result<usize> {
        let conn = self.pool.get()?;
        let rows_affected = conn
            .execute(
                "DELETE FROM follows WHERE follower_id = ? AND following_id = ?",
                (follower_id.to_string(), following_id.to_string()),
            )
            .context("Failed to unfollow user")?;
        Ok(rows_affected)
    }

    /// Users this user follows
    pub fn get_following(&self, user_id: &Uuid) -> Result<Vec<FollowSummary>> {
        self.query_edges(
            "SELECT u.id, u.username FROM follows f
             JOIN users u ON u.id = f.following_id
             WHERE f.follower_id = ? ORDER BY f.created_at DESC",
            user_id,
        )
    }

    /// Users following this user
    pub fn get_followers(&self, user_id: &Uuid) -> Result<Vec<FollowSummary>> {
        self.query_edges(
            "SELECT u.id, u.username FROM follows f
             JOIN users u ON u.id = f.follower_id
             WHERE f.following_id = ? ORDER BY f.created_at DESC",
            user_id,
        )
    }

    fn query_edges(&self, sql: &str, user_id: &Uuid) -> Result<Vec<FollowSummary>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;
        let users = stmt
            .query_map([user_id.to_string()], |row| {
                Ok(FollowSummary {
                    id: uuid_column(row, 0)?,
                    username: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}
