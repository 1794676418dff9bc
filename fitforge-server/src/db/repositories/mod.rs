pub mod activity_repository;
pub mod completion_repository;
pub mod exercise_repository;
pub mod follow_repository;
pub mod plan_repository;
pub mod reaction_repository;
pub mod user_repository;
pub mod workout_log_repository;

pub use activity_repository::{completion_action, log_action, ActivityRepository, FEED_LIMIT};
pub use completion_repository::CompletionRepository;
pub use exercise_repository::ExerciseRepository;
pub use follow_repository::FollowRepository;
pub use plan_repository::PlanRepository;
pub use reaction_repository::ReactionRepository;
pub use user_repository::{NewUser, PremiumGrant, UserRepository};
pub use workout_log_repository::{NewWorkoutLog, WorkoutLogRepository};
