use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    BuildMuscle,
    LoseFat,
    IncreaseStrength,
    #[default]
    GeneralFitness,
}

impl FitnessGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessGoal::BuildMuscle => "build_muscle",
            FitnessGoal::LoseFat => "lose_fat",
            FitnessGoal::IncreaseStrength => "increase_strength",
            FitnessGoal::GeneralFitness => "general_fitness",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "build_muscle" => Some(FitnessGoal::BuildMuscle),
            "lose_fat" => Some(FitnessGoal::LoseFat),
            "increase_strength" => Some(FitnessGoal::IncreaseStrength),
            "general_fitness" => Some(FitnessGoal::GeneralFitness),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Some(ExperienceLevel::Beginner),
            "intermediate" => Some(ExperienceLevel::Intermediate),
            "advanced" => Some(ExperienceLevel::Advanced),
            _ => None,
        }
    }
}

/// Scope of the activity feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedScope {
    #[default]
    All,
    Following,
}

impl FeedScope {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(FeedScope::All),
            "following" => Some(FeedScope::Following),
            _ => None,
        }
    }
}
