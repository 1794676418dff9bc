use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use fitforge_types::{WorkoutExercise, WorkoutPlan, WorkoutRoutine};

use crate::db::{timestamp_column, uuid_column, DbPool};
use crate::planner::PlanDraft;

pub struct PlanRepository {
    pool: DbPool,
}

impl PlanRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Persist a plan with all of its routines and exercises in one transaction.
    /// Readers never observe a plan without its full set of routines.
    pub fn create_plan(&self, user_id: &Uuid, draft: &PlanDraft) -> Result<WorkoutPlan> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let now = Utc::now();

        let mut plan = WorkoutPlan {
            id: Uuid::new_v4(),
            user_id: *user_id,
            name: draft.name.clone(),
            goal: draft.goal.clone(),
            level: draft.level.clone(),
            created_at: now,
            updated_at: now,
            routines: Vec::with_capacity(draft.routines.len()),
        };

        tx.execute(
            "INSERT INTO workout_plans (id, user_id, name, goal, level, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                plan.id.to_string(),
                user_id.to_string(),
                &plan.name,
                &plan.goal,
                &plan.level,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )
        .context("Failed to create workout plan")?;

        for routine_draft in &draft.routines {
            let mut routine = WorkoutRoutine {
                id: Uuid::new_v4(),
                day: routine_draft.day.clone(),
                order: routine_draft.order,
                exercises: Vec::with_capacity(routine_draft.exercises.len()),
            };

            tx.execute(
                "INSERT INTO workout_routines (id, plan_id, day, sort_order) VALUES (?, ?, ?, ?)",
                (
                    routine.id.to_string(),
                    plan.id.to_string(),
                    &routine.day,
                    routine.order,
                ),
            )
            .context("Failed to create workout routine")?;

            for exercise_draft in &routine_draft.exercises {
                let exercise = WorkoutExercise {
                    id: Uuid::new_v4(),
                    name: exercise_draft.name.clone(),
                    sets: exercise_draft.sets,
                    reps: exercise_draft.reps.clone(),
                    weight: exercise_draft.weight,
                    notes: exercise_draft.notes.clone(),
                    order: exercise_draft.order,
                };

                tx.execute(
                    "INSERT INTO workout_exercises (id, routine_id, name, sets, reps, weight, notes, sort_order)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                    (
                        exercise.id.to_string(),
                        routine.id.to_string(),
                        &exercise.name,
                        exercise.sets,
                        &exercise.reps,
                        exercise.weight,
                        &exercise.notes,
                        exercise.order,
                    ),
                )
                .context("Failed to create workout exercise")?;

                routine.exercises.push(exercise);
            }

            plan.routines.push(routine);
        }

        tx.commit().context("Failed to commit workout plan")?;
        Ok(plan)
    }

    /// The most recently created plan of a user
    pub fn get_current(&self, user_id: &Uuid) -> Result<Option<WorkoutPlan>> {
        let conn = self.pool.get()?;
        let plan_id = conn
            .query_row(
                "SELECT id FROM workout_plans WHERE user_id = ?
                 ORDER BY created_at DESC, rowid DESC LIMIT 1",
                [user_id.to_string()],
                |row| uuid_column(row, 0),
            )
            .optional()?;

        match plan_id {
            Some(id) => load_plan(&conn, &id, user_id),
            None => Ok(None),
        }
    }

    /// A plan owned by `user_id`; plans of other users are reported as absent
    pub fn get_by_id(&self, user_id: &Uuid, plan_id: &Uuid) -> Result<Option<WorkoutPlan>> {
        let conn = self.pool.get()?;
        load_plan(&conn, plan_id, user_id)
    }

    /// All plans of a user, newest first
    pub fn list_for_user(&self, user_id: &Uuid) -> Result<Vec<WorkoutPlan>> {
        let conn = self.pool.get()?;
        let ids = {
            let mut stmt = conn.prepare(
                "SELECT id FROM workout_plans WHERE user_id = ?
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let ids = stmt
                .query_map([user_id.to_string()], |row| uuid_column(row, 0))?
                .collect::<Result<Vec<_>, _>>()?;
            ids
        };

        let mut plans = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(plan) = load_plan(&conn, &id, user_id)? {
                plans.push(plan);
            }
        }
        Ok(plans)
    }
}

fn load_plan(conn: &Connection, plan_id: &Uuid, user_id: &Uuid) -> Result<Option<WorkoutPlan>> {
    let plan = conn
        .query_row(
            "SELECT id, user_id, name, goal, level, created_at, updated_at
             FROM workout_plans WHERE id = ? AND user_id = ?",
            (plan_id.to_string(), user_id.to_string()),
            |row| {
                Ok(WorkoutPlan {
                    id: uuid_column(row, 0)?,
                    user_id: uuid_column(row, 1)?,
                    name: row.get(2)?,
                    goal: row.get(3)?,
                    level: row.get(4)?,
                    created_at: timestamp_column(row, 5)?,
                    updated_at: timestamp_column(row, 6)?,
                    routines: Vec::new(),
                })
            },
        )
        .optional()?;

    let Some(mut plan) = plan else {
        return Ok(None);
    };

    let mut routine_stmt = conn.prepare(
        "SELECT id, day, sort_order FROM workout_routines
         WHERE plan_id = ? ORDER BY sort_order, rowid",
    )?;
    let mut routines = routine_stmt
        .query_map([plan.id.to_string()], |row| {
            Ok(WorkoutRoutine {
                id: uuid_column(row, 0)?,
                day: row.get(1)?,
                order: row.get(2)?,
                exercises: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut exercise_stmt = conn.prepare(
        "SELECT id, name, sets, reps, weight, notes, sort_order FROM workout_exercises
         WHERE routine_id = ? ORDER BY sort_order, rowid",
    )?;
    for routine in &mut routines {
        routine.exercises = exercise_stmt
            .query_map([routine.id.to_string()], |row| {
                Ok(WorkoutExercise {
                    id: uuid_column(row, 0)?,
                    name: row.get(1)?,
                    sets: row.get(2)?,
                    reps: row.get(3)?,
                    weight: row.get(4)?,
                    notes: row.get(5)?,
                    order: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
    }

    plan.routines = routines;
    Ok(Some(plan))
}
