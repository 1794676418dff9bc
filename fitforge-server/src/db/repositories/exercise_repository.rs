use anyhow::{Context, Result};
use uuid::Uuid;

use fitforge_types::Exercise;

use crate::db::{is_unique_violation, uuid_column, DbPool, Inserted};

/// Persisted exercise catalog
pub struct ExerciseRepository {
    pool: DbPool,
}

impl ExerciseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// List catalog entries, optionally filtered by muscle group and equipment (case-insensitive)
    pub fn list(&self, muscle_group: Option<&str>, equipment: Option<&str>) -> Result<Vec<Exercise>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, muscle_group, difficulty, equipment, video_url
             FROM exercises
             WHERE (?1 IS NULL OR lower(muscle_group) = lower(?1))
               AND (?2 IS NULL OR lower(equipment) = lower(?2))
             ORDER BY muscle_group, name",
        )?;

        let exercises = stmt
            .query_map((muscle_group, equipment), |row| {
                Ok(Exercise {
                    id: uuid_column(row, 0)?,
                    name: row.get(1)?,
                    muscle_group: row.get(2)?,
                    difficulty: row.get(3)?,
                    equipment: row.get(4)?,
                    video_url: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    /// Add a catalog entry; names are unique
    pub fn create(&self, exercise: &Exercise) -> Result<Inserted<()>> {
        let conn = self.pool.get()?;
        let result = conn.execute(
            "INSERT INTO exercises (id, name, muscle_group, difficulty, equipment, video_url)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                exercise.id.to_string(),
                &exercise.name,
                &exercise.muscle_group,
                &exercise.difficulty,
                &exercise.equipment,
                &exercise.video_url,
            ),
        );

        match result {
            Ok(_) => Ok(Inserted::Created(())),
            Err(e) if is_unique_violation(&e) => Ok(Inserted::Duplicate),
            Err(e) => Err(e).context("Failed to create exercise"),
        }
    }
}
