use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use fitforge_types::{Activity, FeedScope, LeaderboardEntry};

use crate::db::{optional_uuid_column, timestamp_column, uuid_column, DbPool};

/// Number of entries served by the activity feed
pub const FEED_LIMIT: u32 = 50;

/// Action text recorded when a set is logged
pub fn log_action(exercise: &str, sets: u32, reps: u32) -> String {
    format!("logged {}x{} {}", sets, reps, exercise)
}

/// Action text recorded when a routine is marked complete
pub fn completion_action(routine_id: &Uuid) -> String {
    format!("completed routine {}", routine_id)
}

/// Append an activity using an existing connection or transaction
pub(crate) fn insert_activity(
    conn: &Connection,
    user_id: &Uuid,
    action: &str,
    routine_id: Option<&Uuid>,
) -> Result<Activity> {
    let activity = Activity {
        id: Uuid::new_v4(),
        user_id: *user_id,
        username: String::new(),
        action: action.to_string(),
        time: Utc::now(),
        routine_id: routine_id.copied(),
    };

    conn.execute(
        "INSERT INTO activities (id, user_id, action, time, routine_id) VALUES (?, ?, ?, ?, ?)",
        (
            activity.id.to_string(),
            user_id.to_string(),
            &activity.action,
            activity.time.to_rfc3339(),
            routine_id.map(|id| id.to_string()),
        ),
    )
    .context("Failed to record activity")?;

    tracing::debug!("Recorded activity for {}: {}", user_id, action);
    Ok(activity)
}

pub struct ActivityRepository {
    pool: DbPool,
}

impl ActivityRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Append an activity record
    pub fn record(&self, user_id: &Uuid, action: &str, routine_id: Option<&Uuid>) -> Result<Activity> {
        let conn = self.pool.get()?;
        insert_activity(&conn, user_id, action, routine_id)
    }

    /// Most recent activities, newest first, capped at `FEED_LIMIT`.
    /// `FeedScope::Following` restricts the feed to users `viewer_id` follows.
    pub fn feed(&self, viewer_id: &Uuid, scope: FeedScope) -> Result<Vec<Activity>> {
        let conn = self.pool.get()?;
        let filter = match scope {
            FeedScope::All => "",
            FeedScope::Following => {
                "WHERE a.user_id IN (SELECT following_id FROM follows WHERE follower_id = ?1)"
            }
        };
        let query = format!(
            "SELECT a.id, a.user_id, u.username, a.action, a.time, a.routine_id
             FROM activities a
             JOIN users u ON a.user_id = u.id
             {}
             ORDER BY a.time DESC, a.rowid DESC
             LIMIT {}",
            filter, FEED_LIMIT
        );

        let mut stmt = conn.prepare(&query)?;
        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<Activity> {
            Ok(Activity {
                id: uuid_column(row, 0)?,
                user_id: uuid_column(row, 1)?,
                username: row.get(2)?,
                action: row.get(3)?,
                time: timestamp_column(row, 4)?,
                routine_id: optional_uuid_column(row, 5)?,
            })
        };

        let activities = match scope {
            FeedScope::All => stmt.query_map([], map_row)?.collect::<Result<Vec<_>, _>>()?,
            FeedScope::Following => stmt
                .query_map([viewer_id.to_string()], map_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(activities)
    }

    /// Every user with their workout-log count, highest first.
    /// Ties keep registration order.
    pub fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT u.id, u.username, COUNT(l.id) AS workouts
             FROM users u
             LEFT JOIN workout_logs l ON l.user_id = u.id
             GROUP BY u.id
             ORDER BY workouts DESC, u.join_date, u.rowid",
        )?;

        let entries = stmt
            .query_map([], |row| {
                Ok(LeaderboardEntry {
                    id: uuid_column(row, 0)?,
                    username: row.get(1)?,
                    workouts: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::user_repository::tests::create_user;
    use crate::db::repositories::{FollowRepository, UserRepository, WorkoutLogRepository};
    use crate::db::repositories::workout_log_repository::NewWorkoutLog;
    use crate::db::Database;

    fn setup() -> (Database, ActivityRepository, UserRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        let activity = ActivityRepository::new(db.pool.clone());
        let users = UserRepository::new(db.pool.clone());
        (db, activity, users)
    }

    fn log_workouts(db: &Database, user_id: &Uuid, count: usize) {
        let logs = WorkoutLogRepository::new(db.pool.clone());
        for _ in 0..count {
            logs.create(
                user_id,
                &NewWorkoutLog {
                    exercise: "Squat",
                    sets: 3,
                    reps: 10,
                    weight: None,
                    calories: 50,
                    duration: 10,
                },
            )
            .unwrap();
        }
    }

    #[test]
    fn test_action_text() {
        assert_eq!(log_action("Squat", 3, 10), "logged 3x10 Squat");
        let id = Uuid::nil();
        assert_eq!(
            completion_action(&id),
            "completed routine 00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_feed_is_newest_first_and_capped() {
        let (_db, repo, users) = setup();
        let alice = create_user(&users, "alice");

        for i in 0..(FEED_LIMIT + 5) {
            repo.record(&alice.id, &format!("action {}", i), None).unwrap();
        }

        let feed = repo.feed(&alice.id, FeedScope::All).unwrap();
        assert_eq!(feed.len(), FEED_LIMIT as usize);
        assert_eq!(feed[0].action, format!("action {}", FEED_LIMIT + 4));
        assert_eq!(feed[0].username, "alice");
    }

    #[test]
    fn test_following_scope_filters_feed() {
        let (db, repo, users) = setup();
        let alice = create_user(&users, "alice");
        let bob = create_user(&users, "bob");
        let carol = create_user(&users, "carol");

        FollowRepository::new(db.pool.clone())
            .follow(&alice.id, &bob.id)
            .unwrap();
        repo.record(&bob.id, "bob did a thing", None).unwrap();
        repo.record(&carol.id, "carol did a thing", None).unwrap();

        let scoped = repo.feed(&alice.id, FeedScope::Following).unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].user_id, bob.id);

        let global = repo.feed(&alice.id, FeedScope::All).unwrap();
        assert_eq!(global.len(), 2);
    }

    #[test]
    fn test_leaderboard_orders_by_log_count() {
        let (db, repo, users) = setup();
        let a = create_user(&users, "a");
        let b = create_user(&users, "b");
        let c = create_user(&users, "c");

        log_workouts(&db, &b.id, 1);
        log_workouts(&db, &a.id, 3);

        let board = repo.leaderboard().unwrap();
        let summary: Vec<(Uuid, u32)> = board.iter().map(|e| (e.id, e.workouts)).collect();
        assert_eq!(summary, vec![(a.id, 3), (b.id, 1), (c.id, 0)]);
        assert_eq!(board[0].username, "a");
    }
}
