use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use fitforge_types::WorkoutLog;

use super::activity_repository::{insert_activity, log_action};
use crate::db::{date_column, timestamp_column, uuid_column, DbPool};

const LOG_COLUMNS: &str = "l.id, l.user_id, l.exercise, l.sets, l.reps, l.weight, l.calories,
     l.duration, l.date, l.created_at,
     (SELECT COUNT(*) FROM workout_log_likes WHERE log_id = l.id),
     (SELECT COUNT(*) FROM workout_log_comments WHERE log_id = l.id)";

fn log_from_row(row: &Row<'_>) -> rusqlite::Result<WorkoutLog> {
    Ok(WorkoutLog {
        id: uuid_column(row, 0)?,
        user_id: uuid_column(row, 1)?,
        exercise: row.get(2)?,
        sets: row.get(3)?,
        reps: row.get(4)?,
        weight: row.get(5)?,
        calories: row.get(6)?,
        duration: row.get(7)?,
        date: date_column(row, 8)?,
        created_at: timestamp_column(row, 9)?,
        like_count: row.get(10)?,
        comment_count: row.get(11)?,
    })
}

pub struct NewWorkoutLog<'a> {
    pub exercise: &'a str,
    pub sets: u32,
    pub reps: u32,
    pub weight: Option<f64>,
    pub calories: u32,
    pub duration: u32,
}

pub struct WorkoutLogRepository {
    pool: DbPool,
}

impl WorkoutLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Store a log stamped with today's date and record the matching activity atomically
    pub fn create(&self, user_id: &Uuid, new_log: &NewWorkoutLog<'_>) -> Result<WorkoutLog> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let now = Utc::now();

        let log = WorkoutLog {
            id: Uuid::new_v4(),
            user_id: *user_id,
            exercise: new_log.exercise.to_string(),
            sets: new_log.sets,
            reps: new_log.reps,
            weight: new_log.weight,
            calories: new_log.calories,
            duration: new_log.duration,
            date: now.date_naive(),
            created_at: now,
            like_count: 0,
            comment_count: 0,
        };

        tx.execute(
            "INSERT INTO workout_logs (id, user_id, exercise, sets, reps, weight, calories, duration, date, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                log.id.to_string(),
                user_id.to_string(),
                &log.exercise,
                log.sets,
                log.reps,
                log.weight,
                log.calories,
                log.duration,
                log.date.to_string(),
                now.to_rfc3339(),
            ),
        )
        .context("Failed to create workout log")?;

        insert_activity(&tx, user_id, &log_action(&log.exercise, log.sets, log.reps), None)?;

        tx.commit().context("Failed to commit workout log")?;
        Ok(log)
    }

    /// Get a log by id
    pub fn get_by_id(&self, log_id: &Uuid) -> Result<Option<WorkoutLog>> {
        let conn = self.pool.get()?;
        let log = conn
            .query_row(
                &format!("SELECT {} FROM workout_logs l WHERE l.id = ?", LOG_COLUMNS),
                [log_id.to_string()],
                log_from_row,
            )
            .optional()?;
        Ok(log)
    }

    /// A user's logs, newest first
    pub fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<WorkoutLog>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM workout_logs l WHERE l.user_id = ?
             ORDER BY l.created_at DESC, l.rowid DESC",
            LOG_COLUMNS
        ))?;
        let logs = stmt
            .query_map([user_id.to_string()], log_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::user_repository::tests::create_user;
    use crate::db::repositories::UserRepository;
    use crate::db::Database;

    fn setup() -> (Database, WorkoutLogRepository, Uuid) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        let user = create_user(&UserRepository::new(db.pool.clone()), "lifter");
        (db.clone(), WorkoutLogRepository::new(db.pool.clone()), user.id)
    }

    fn bench() -> NewWorkoutLog<'static> {
        NewWorkoutLog {
            exercise: "Bench Press",
            sets: 4,
            reps: 8,
            weight: Some(60.0),
            calories: 120,
            duration: 20,
        }
    }

    #[test]
    fn test_create_log_records_activity() {
        let (db, repo, user_id) = setup();
        let log = repo.create(&user_id, &bench()).unwrap();
        assert_eq!(log.date, Utc::now().date_naive());

        let conn = db.connection().unwrap();
        let action: String = conn
            .query_row(
                "SELECT action FROM activities WHERE user_id = ?",
                [user_id.to_string()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(action, "logged 4x8 Bench Press");
    }

    #[test]
    fn test_list_logs_newest_first() {
        let (_db, repo, user_id) = setup();
        let first = repo.create(&user_id, &bench()).unwrap();
        let second = repo.create(&user_id, &bench()).unwrap();

        let logs = repo.list_for_user(&user_id).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].id, second.id);
        assert_eq!(logs[1].id, first.id);
        assert_eq!(logs[0].like_count, 0);
    }

    #[test]
    fn test_log_for_unknown_user_writes_nothing() {
        let (db, repo, _user_id) = setup();
        assert!(repo.create(&Uuid::new_v4(), &bench()).is_err());

        let conn = db.connection().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM activities", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
