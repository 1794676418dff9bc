use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{ExperienceLevel, FitnessGoal};

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

mod optional_datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_some(&date.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        s.map(|s| s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Public view of an account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub fitness_goal: FitnessGoal,
    pub experience_level: ExperienceLevel,
    pub is_premium: bool,
    #[serde(default, with = "optional_datetime_format")]
    pub premium_since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stripe_customer_id: Option<String>,
    #[serde(default)]
    pub stripe_subscription_id: Option<String>,
    #[serde(with = "datetime_format")]
    pub join_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub goal: String,
    pub level: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_format")]
    pub updated_at: DateTime<Utc>,
    /// Ordered ascending by `order`
    pub routines: Vec<WorkoutRoutine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutRoutine {
    pub id: Uuid,
    pub day: String,
    pub order: u32,
    /// Ordered ascending by `order`
    pub exercises: Vec<WorkoutExercise>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: Uuid,
    pub name: String,
    pub sets: u32,
    pub reps: String,
    pub weight: Option<f64>,
    pub notes: String,
    pub order: u32,
}

/// Catalog entry, independent of any user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub muscle_group: String,
    pub difficulty: String,
    pub equipment: String,
    #[serde(default)]
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
    #[serde(default)]
    pub weight: Option<f64>,
    pub calories: u32,
    pub duration: u32,
    pub date: NaiveDate,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub comment_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutCompletion {
    pub id: Uuid,
    pub user_id: Uuid,
    pub routine_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub username: String,
    pub action: String,
    #[serde(with = "datetime_format")]
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub routine_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub username: String,
    pub workouts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutLogComment {
    pub id: Uuid,
    pub log_id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub username: String,
    pub text: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowSummary {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub workout_logs: u32,
    pub completions: u32,
    pub total_calories: u64,
    pub total_minutes: u64,
    pub followers: u32,
    pub following: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStatus {
    pub is_premium: bool,
    #[serde(default, with = "optional_datetime_format")]
    pub premium_since: Option<DateTime<Utc>>,
}

// Request/Response types for API
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    #[serde(default)]
    pub fitness_goal: Option<FitnessGoal>,
    #[serde(default)]
    pub experience_level: Option<ExperienceLevel>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub session_token: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub fitness_goal: Option<FitnessGoal>,
    pub experience_level: Option<ExperienceLevel>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreatePlanRequest {
    pub goal: Option<String>,
    pub level: Option<String>,
    pub days: Option<i64>,
    pub muscle_groups: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateExerciseRequest {
    pub name: String,
    pub muscle_group: String,
    pub difficulty: String,
    pub equipment: String,
    #[serde(default)]
    pub video_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateWorkoutLogRequest {
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
    #[serde(default)]
    pub calories: Option<u32>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub weight: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteRoutineRequest {
    pub routine_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutSessionResponse {
    pub url: String,
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}
