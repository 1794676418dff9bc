use anyhow::{Context, Result};
use chrono::Utc;
use uuid::Uuid;

use fitforge_types::WorkoutCompletion;

use super::activity_repository::{completion_action, insert_activity};
use crate::db::{date_column, is_unique_violation, uuid_column, DbPool, Inserted};

pub struct CompletionRepository {
    pool: DbPool,
}

impl CompletionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Mark a routine complete for today.
    ///
    /// The (user, routine, date) uniqueness constraint decides duplicates; a
    /// duplicate rolls back without writing an activity.
    pub fn complete(&self, user_id: &Uuid, routine_id: &Uuid) -> Result<Inserted<WorkoutCompletion>> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let completion = WorkoutCompletion {
            id: Uuid::new_v4(),
            user_id: *user_id,
            routine_id: *routine_id,
            date: Utc::now().date_naive(),
        };

        let result = tx.execute(
            "INSERT INTO workout_completions (id, user_id, routine_id, date) VALUES (?, ?, ?, ?)",
            (
                completion.id.to_string(),
                user_id.to_string(),
                routine_id.to_string(),
                completion.date.to_string(),
            ),
        );

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Ok(Inserted::Duplicate),
            Err(e) => return Err(e).context("Failed to record workout completion"),
        }

        insert_activity(&tx, user_id, &completion_action(routine_id), Some(routine_id))?;
        tx.commit().context("Failed to commit workout completion")?;

        Ok(Inserted::Created(completion))
    }

    /// A user's completions, newest first
    pub fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<WorkoutCompletion>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, routine_id, date FROM workout_completions
             WHERE user_id = ? ORDER BY date DESC, rowid DESC",
        )?;
        let completions = stmt
            .query_map([user_id.to_string()], |row| {
                Ok(WorkoutCompletion {
                    id: uuid_column(row, 0)?,
                    user_id: uuid_column(row, 1)?,
                    routine_id: uuid_column(row, 2)?,
                    date: date_column(row, 3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(completions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::user_repository::tests::create_user;
    use crate::db::repositories::UserRepository;
    use crate::db::Database;

    #[test]
    fn test_second_completion_same_day_is_duplicate() {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        let user = create_user(&UserRepository::new(db.pool.clone()), "runner");
        let repo = CompletionRepository::new(db.pool.clone());
        let routine_id = Uuid::new_v4();

        assert!(matches!(
            repo.complete(&user.id, &routine_id).unwrap(),
            Inserted::Created(_)
        ));
        assert!(matches!(
            repo.complete(&user.id, &routine_id).unwrap(),
            Inserted::Duplicate
        ));

        assert_eq!(repo.list_for_user(&user.id).unwrap().len(), 1);

        let conn = db.connection().unwrap();
        let activities: i64 = conn
            .query_row("SELECT COUNT(*) FROM activities", [], |row| row.get(0))
            .unwrap();
        assert_eq!(activities, 1, "duplicate must not record an activity");
    }

    #[test]
    fn test_different_routines_complete_independently() {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        let user = create_user(&UserRepository::new(db.pool.clone()), "swimmer");
        let repo = CompletionRepository::new(db.pool.clone());

        repo.complete(&user.id, &Uuid::new_v4()).unwrap();
        repo.complete(&user.id, &Uuid::new_v4()).unwrap();
        assert_eq!(repo.list_for_user(&user.id).unwrap().len(), 2);
    }
}
