use anyhow::{Context, Result};
use chrono::Utc;
use uuid::Uuid;

use fitforge_types::WorkoutLogComment;

use crate::db::{is_unique_violation, timestamp_column, uuid_column, DbPool, Inserted};

/// Likes and comments attached to workout logs
pub struct ReactionRepository {
    pool: DbPool,
}

impl ReactionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Like a log; a second like by the same user yields `Inserted::Duplicate`
    pub fn like(&self, user_id: &Uuid, log_id: &Uuid) -> Result<Inserted<()>> {
        let conn = self.pool.get()?;
        let result = conn.execute(
            "INSERT INTO workout_log_likes (user_id, log_id, created_at) VALUES (?, ?, ?)",
            (user_id.to_string(), log_id.to_string(), Utc::now().to_rfc3339()),
        );

        match result {
            Ok(_) => Ok(Inserted::Created(())),
            Err(e) if is_unique_violation(&e) => Ok(Inserted::Duplicate),
            Err(e) => Err(e).context("Failed to like workout log"),
        }
    }

    /// Remove a like
    pub fn unlike(&self, user_id: &Uuid, log_id: &Uuid) -> Result<usize> {
        let conn = self.pool.get()?;
        let rows = conn
            .execute(
                "DELETE FROM workout_log_likes WHERE user_id = ? AND log_id = ?",
                (user_id.to_string(), log_id.to_string()),
            )
            .context("Failed to unlike workout log")?;
        Ok(rows)
    }

    pub fn add_comment(&self, user_id: &Uuid, log_id: &Uuid, text: &str) -> Result<WorkoutLogComment> {
        let conn = self.pool.get()?;
        let comment = WorkoutLogComment {
            id: Uuid::new_v4(),
            log_id: *log_id,
            user_id: *user_id,
            username: String::new(),
            text: text.to_string(),
            created_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO workout_log_comments (id, user_id, log_id, text, created_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                comment.id.to_string(),
                user_id.to_string(),
                log_id.to_string(),
                &comment.text,
                comment.created_at.to_rfc3339(),
            ),
        )
        .context("Failed to add comment")?;

        Ok(comment)
    }

    /// Comments on a log, oldest first
    pub fn comments(&self, log_id: &Uuid) -> Result<Vec<WorkoutLogComment>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.log_id, c.user_id, u.username, c.text, c.created_at
             FROM workout_log_comments c
             JOIN users u ON u.id = c.user_id
             WHERE c.log_id = ?
             ORDER BY c.created_at, c.rowid",
        )?;
        let comments = stmt
            .query_map([log_id.to_string()], |row| {
                Ok(WorkoutLogComment {
                    id: uuid_column(row, 0)?,
                    log_id: uuid_column(row, 1)?,
                    user_id: uuid_column(row, 2)?,
                    username: row.get(3)?,
                    text: row.get(4)?,
                    created_at: timestamp_column(row, 5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::user_repository::tests::create_user;
    use crate::db::repositories::workout_log_repository::NewWorkoutLog;
    use crate::db::repositories::{UserRepository, WorkoutLogRepository};
    use crate::db::Database;

    fn setup() -> (ReactionRepository, Uuid, Uuid) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        let user = create_user(&UserRepository::new(db.pool.clone()), "fan");
        let log = WorkoutLogRepository::new(db.pool.clone())
            .create(
                &user.id,
                &NewWorkoutLog {
                    exercise: "Deadlift",
                    sets: 5,
                    reps: 5,
                    weight: Some(100.0),
                    calories: 80,
                    duration: 15,
                },
            )
            .unwrap();
        (ReactionRepository::new(db.pool.clone()), user.id, log.id)
    }

    #[test]
    fn test_like_once_per_user() {
        let (repo, user_id, log_id) = setup();
        assert!(matches!(repo.like(&user_id, &log_id).unwrap(), Inserted::Created(())));
        assert!(matches!(repo.like(&user_id, &log_id).unwrap(), Inserted::Duplicate));

        assert_eq!(repo.unlike(&user_id, &log_id).unwrap(), 1);
        assert_eq!(repo.unlike(&user_id, &log_id).unwrap(), 0);
    }

    #[test]
    fn test_comments_keep_insertion_order() {
        let (repo, user_id, log_id) = setup();
        repo.add_comment(&user_id, &log_id, "nice").unwrap();
        repo.add_comment(&user_id, &log_id, "strong").unwrap();

        let comments = repo.comments(&log_id).unwrap();
        let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["nice", "strong"]);
        assert_eq!(comments[0].username, "fan");
    }
}
