use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use fitforge_types::{ExperienceLevel, FitnessGoal, WorkoutPlan};

use crate::catalog::{CatalogEntry, ExerciseCatalog};
use crate::db::repositories::PlanRepository;

const DEFAULT_DAYS: i64 = 3;
const DEFAULT_ROTATION: [&str; 3] = ["chest", "back", "legs"];

/// Parameters of a plan assembly
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub goal: String,
    pub level: String,
    pub days: i64,
    pub muscle_groups: Option<Vec<String>>,
}

/// A plan ready to be persisted
#[derive(Debug, Clone)]
pub struct PlanDraft {
    pub name: String,
    pub goal: String,
    pub level: String,
    pub routines: Vec<RoutineDraft>,
}

#[derive(Debug, Clone)]
pub struct RoutineDraft {
    pub day: String,
    pub order: u32,
    pub muscle_group: String,
    pub exercises: Vec<ExerciseDraft>,
}

#[derive(Debug, Clone)]
pub struct ExerciseDraft {
    pub name: String,
    pub sets: u32,
    pub reps: String,
    pub weight: Option<f64>,
    pub notes: String,
    pub order: u32,
}

/// Day labels for a weekly schedule; unsupported counts use the 3-day layout
pub fn day_labels(days: i64) -> &'static [&'static str] {
    match days {
        2 => &["Monday", "Thursday"],
        3 => &["Monday", "Wednesday", "Friday"],
        4 => &["Monday", "Tuesday", "Thursday", "Friday"],
        5 => &["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"],
        _ => day_labels(DEFAULT_DAYS),
    }
}

/// Muscle groups cycled across the plan's days for a goal
pub fn goal_rotation(goal: &str) -> Vec<String> {
    let groups: &[&str] = match FitnessGoal::parse(goal) {
        Some(FitnessGoal::BuildMuscle) => &["chest", "back", "legs", "shoulders", "arms"],
        Some(FitnessGoal::GeneralFitness) => &["chest", "back", "legs", "shoulders"],
        Some(FitnessGoal::LoseFat) | Some(FitnessGoal::IncreaseStrength) | None => {
            &DEFAULT_ROTATION
        }
    };
    groups.iter().map(|g| g.to_string()).collect()
}

/// "lose_fat" -> "Lose Fat Plan"
pub fn plan_name(goal: &str) -> String {
    let words: Vec<String> = goal
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        "Workout Plan".to_string()
    } else {
        format!("{} Plan", words.join(" "))
    }
}

impl PlanRequest {
    fn is_beginner(&self) -> bool {
        ExperienceLevel::parse(&self.level) == Some(ExperienceLevel::Beginner)
    }

    /// Exercises per routine
    pub fn exercise_limit(&self) -> usize {
        if self.is_beginner() {
            4
        } else {
            6
        }
    }

    pub fn sets(&self) -> u32 {
        if self.is_beginner() {
            3
        } else {
            4
        }
    }

    pub fn reps(&self) -> &'static str {
        if FitnessGoal::parse(&self.goal) == Some(FitnessGoal::BuildMuscle) {
            "8-12"
        } else {
            "12-15"
        }
    }

    /// Explicit muscle groups win over the goal's rotation
    pub fn rotation(&self) -> Vec<String> {
        let explicit: Vec<String> = self
            .muscle_groups
            .iter()
            .flatten()
            .map(|g| g.trim().to_lowercase())
            .filter(|g| !g.is_empty())
            .collect();

        if explicit.is_empty() {
            goal_rotation(&self.goal)
        } else {
            explicit
        }
    }

    /// (day label, muscle group) for every routine, in order
    pub fn schedule(&self) -> Vec<(&'static str, String)> {
        let rotation = self.rotation();
        day_labels(self.days)
            .iter()
            .enumerate()
            .map(|(i, day)| (*day, rotation[i % rotation.len()].clone()))
            .collect()
    }
}

/// Build a plan from catalog candidates fetched per scheduled day.
///
/// `candidates[i]` holds the catalog entries for routine `i`; a missing or
/// empty slot produces a routine without exercises.
pub fn build_draft<R: Rng + ?Sized>(
    request: &PlanRequest,
    candidates: Vec<Vec<CatalogEntry>>,
    rng: &mut R,
) -> PlanDraft {
    let limit = request.exercise_limit();
    let mut candidates = candidates.into_iter();

    let routines = request
        .schedule()
        .into_iter()
        .enumerate()
        .map(|(i, (day, muscle_group))| {
            let mut pool = candidates.next().unwrap_or_default();
            pool.shuffle(rng);
            pool.truncate(limit);

            let exercises = pool
                .into_iter()
                .enumerate()
                .map(|(position, entry)| ExerciseDraft {
                    notes: format!(
                        "Targets {}",
                        entry.target.as_deref().unwrap_or(muscle_group.as_str())
                    ),
                    name: entry.name,
                    sets: request.sets(),
                    reps: request.reps().to_string(),
                    weight: None,
                    order: position as u32,
                })
                .collect();

            RoutineDraft {
                day: day.to_string(),
                order: i as u32,
                muscle_group,
                exercises,
            }
        })
        .collect();

    PlanDraft {
        name: plan_name(&request.goal),
        goal: request.goal.clone(),
        level: request.level.clone(),
        routines,
    }
}

/// Assemble and persist a plan for `user_id`.
///
/// Catalog lookups cannot fail; only persistence errors abort, and those leave
/// no partial plan behind.
pub async fn assemble_plan(
    catalog: &dyn ExerciseCatalog,
    plans: &PlanRepository,
    user_id: &Uuid,
    request: &PlanRequest,
) -> Result<WorkoutPlan> {
    let schedule = request.schedule();
    let mut candidates = Vec::with_capacity(schedule.len());
    for (day, muscle_group) in &schedule {
        let entries = catalog.fetch_by_muscle_group(muscle_group).await;
        if entries.is_empty() {
            tracing::debug!("No catalog entries for {} ({}), routine left empty", muscle_group, day);
        }
        candidates.push(entries);
    }

    let draft = {
        let mut rng = rand::thread_rng();
        build_draft(request, candidates, &mut rng)
    };

    let plan = plans.create_plan(user_id, &draft)?;
    tracing::info!(
        "Created plan '{}' for user {} with {} routines",
        plan.name,
        user_id,
        plan.routines.len()
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fallback_for;
    use crate::db::repositories::user_repository::tests::create_user;
    use crate::db::repositories::UserRepository;
    use crate::db::Database;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Catalog that is never reachable
    struct OfflineCatalog;

    #[async_trait]
    impl ExerciseCatalog for OfflineCatalog {
        async fn fetch_by_muscle_group(&self, group: &str) -> Vec<CatalogEntry> {
            fallback_for(group)
        }

        async fn fetch_all(&self) -> Vec<CatalogEntry> {
            Vec::new()
        }
    }

    /// Catalog with plenty of candidates for every group
    struct DeepCatalog;

    #[async_trait]
    impl ExerciseCatalog for DeepCatalog {
        async fn fetch_by_muscle_group(&self, group: &str) -> Vec<CatalogEntry> {
            (0..10)
                .map(|i| CatalogEntry {
                    name: format!("{} move {}", group, i),
                    target: None,
                    equipment: Some("cable".to_string()),
                })
                .collect()
        }

        async fn fetch_all(&self) -> Vec<CatalogEntry> {
            Vec::new()
        }
    }

    fn request(goal: &str, level: &str, days: i64) -> PlanRequest {
        PlanRequest {
            goal: goal.to_string(),
            level: level.to_string(),
            days,
            muscle_groups: None,
        }
    }

    fn candidates_for(request: &PlanRequest, per_day: usize) -> Vec<Vec<CatalogEntry>> {
        request
            .schedule()
            .iter()
            .map(|(_, group)| {
                (0..per_day)
                    .map(|i| CatalogEntry {
                        name: format!("{}-{}", group, i),
                        target: Some(group.clone()),
                        equipment: None,
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_day_table() {
        assert_eq!(day_labels(2), &["Monday", "Thursday"]);
        assert_eq!(day_labels(3), &["Monday", "Wednesday", "Friday"]);
        assert_eq!(day_labels(4).len(), 4);
        assert_eq!(day_labels(5).len(), 5);
        assert_eq!(day_labels(0), day_labels(3));
        assert_eq!(day_labels(7), day_labels(3));
        assert_eq!(day_labels(-1), day_labels(3));
    }

    #[test]
    fn test_goal_rotation_defaults() {
        assert_eq!(goal_rotation("build_muscle").len(), 5);
        assert_eq!(goal_rotation("lose_fat"), vec!["chest", "back", "legs"]);
        assert_eq!(goal_rotation("yoga"), vec!["chest", "back", "legs"]);
    }

    #[test]
    fn test_plan_name_title_case() {
        assert_eq!(plan_name("lose_fat"), "Lose Fat Plan");
        assert_eq!(plan_name("build_muscle"), "Build Muscle Plan");
        assert_eq!(plan_name(""), "Workout Plan");
    }

    #[test]
    fn test_explicit_muscle_groups_rotate() {
        let mut req = request("build_muscle", "advanced", 5);
        req.muscle_groups = Some(vec!["Arms".to_string(), "core".to_string()]);

        let groups: Vec<String> = req.schedule().into_iter().map(|(_, g)| g).collect();
        assert_eq!(groups, vec!["arms", "core", "arms", "core", "arms"]);
    }

    #[test]
    fn test_empty_candidates_leave_routine_empty() {
        let req = request("lose_fat", "beginner", 3);
        let mut rng = StdRng::seed_from_u64(7);
        let draft = build_draft(&req, vec![Vec::new(), fallback_for("back")], &mut rng);

        assert_eq!(draft.routines.len(), 3);
        assert!(draft.routines[0].exercises.is_empty());
        assert_eq!(draft.routines[1].exercises.len(), 3);
        assert!(draft.routines[2].exercises.is_empty());
    }

    #[test]
    fn test_notes_fall_back_to_muscle_group() {
        let req = request("lose_fat", "beginner", 2);
        let entry = CatalogEntry {
            name: "Mystery".to_string(),
            target: None,
            equipment: None,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let draft = build_draft(&req, vec![vec![entry]], &mut rng);
        assert_eq!(draft.routines[0].exercises[0].notes, "Targets chest");
    }

    proptest! {
        #[test]
        fn prop_routine_shape_follows_tables(
            days in -3i64..9,
            goal in prop::sample::select(vec!["build_muscle", "lose_fat", "increase_strength", "general_fitness", "dance"]),
            level in prop::sample::select(vec!["beginner", "intermediate", "advanced"]),
            per_day in 0usize..12,
            seed in any::<u64>(),
        ) {
            let req = request(goal, level, days);
            let mut rng = StdRng::seed_from_u64(seed);
            let draft = build_draft(&req, candidates_for(&req, per_day), &mut rng);

            let expected_days = day_labels(days);
            prop_assert_eq!(draft.routines.len(), expected_days.len());

            let limit = if level == "beginner" { 4 } else { 6 };
            let sets = if level == "beginner" { 3 } else { 4 };
            let reps = if goal == "build_muscle" { "8-12" } else { "12-15" };

            for (i, routine) in draft.routines.iter().enumerate() {
                prop_assert_eq!(routine.day.as_str(), expected_days[i]);
                prop_assert_eq!(routine.order, i as u32);
                prop_assert_eq!(routine.exercises.len(), per_day.min(limit));

                for (position, exercise) in routine.exercises.iter().enumerate() {
                    prop_assert_eq!(exercise.order, position as u32);
                    prop_assert_eq!(exercise.sets, sets);
                    prop_assert_eq!(exercise.reps.as_str(), reps);
                    prop_assert!(exercise.weight.is_none());
                    prop_assert!(exercise.name.starts_with(&routine.muscle_group));
                }
            }
        }
    }

    fn setup() -> (PlanRepository, Uuid) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        let user = create_user(&UserRepository::new(db.pool.clone()), "lifter");
        (PlanRepository::new(db.pool.clone()), user.id)
    }

    #[tokio::test]
    async fn test_assemble_with_catalog_unavailable() {
        let (plans, user_id) = setup();
        let req = request("lose_fat", "beginner", 3);

        let plan = assemble_plan(&OfflineCatalog, &plans, &user_id, &req).await.unwrap();

        assert_eq!(plan.name, "Lose Fat Plan");
        let days: Vec<&str> = plan.routines.iter().map(|r| r.day.as_str()).collect();
        assert_eq!(days, vec!["Monday", "Wednesday", "Friday"]);
        for routine in &plan.routines {
            assert_eq!(routine.exercises.len(), 3);
            assert!(routine.exercises.iter().all(|e| e.sets == 3 && e.reps == "12-15"));
        }

        let current = plans.get_current(&user_id).unwrap().unwrap();
        assert_eq!(current.id, plan.id);
        assert_eq!(current.routines.len(), 3);
    }

    #[tokio::test]
    async fn test_assemble_caps_exercises_for_advanced() {
        let (plans, user_id) = setup();
        let req = request("build_muscle", "advanced", 5);

        let plan = assemble_plan(&DeepCatalog, &plans, &user_id, &req).await.unwrap();

        assert_eq!(plan.routines.len(), 5);
        for routine in &plan.routines {
            assert_eq!(routine.exercises.len(), 6);
            assert!(routine.exercises.iter().all(|e| e.sets == 4 && e.reps == "8-12"));
        }
    }

    #[tokio::test]
    async fn test_unknown_muscle_group_yields_empty_routine() {
        let (plans, user_id) = setup();
        let mut req = request("lose_fat", "beginner", 2);
        req.muscle_groups = Some(vec!["neck".to_string()]);

        let plan = assemble_plan(&OfflineCatalog, &plans, &user_id, &req).await.unwrap();
        assert_eq!(plan.routines.len(), 2);
        assert!(plan.routines.iter().all(|r| r.exercises.is_empty()));
    }
}
