use serde::{Deserialize, Serialize};

use crate::database::models::{Achievement, ActivityLog, JournalEntry};
use crate::gamification::Streak;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Breathing,
    Meditation,
    Journaling,
    Physical,
    Mindfulness,
    Grounding,
    Gratitude,
    Creative,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Breathing => "breathing",
            ActivityType::Meditation => "meditation",
            ActivityType::Journaling => "journaling",
            ActivityType::Physical => "physical",
            ActivityType::Mindfulness => "mindfulness",
            ActivityType::Grounding => "grounding",
            ActivityType::Gratitude => "gratitude",
            ActivityType::Creative => "creative",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "breathing" => Some(ActivityType::Breathing),
            "meditation" => Some(ActivityType::Meditation),
            "journaling" => Some(ActivityType::Journaling),
            "physical" => Some(ActivityType::Physical),
            "mindfulness" => Some(ActivityType::Mindfulness),
            "grounding" => Some(ActivityType::Grounding),
            "gratitude" => Some(ActivityType::Gratitude),
            "creative" => Some(ActivityType::Creative),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteActivity {
    pub duration_minutes: i64,
    pub mood_before: i64,
    pub mood_after: i64,
    #[serde(default)]
    pub notes: String,
    pub was_helpful: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletedActivity {
    pub log: ActivityLog,
    pub streak: Streak,
    pub new_achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JournalInput {
    #[serde(default)]
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub prompt_used: String,
    #[serde(default = "default_private")]
    pub is_private: bool,
    pub mood_score: Option<i64>,
}

fn default_private() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedJournalEntry {
    pub entry: JournalEntry,
    pub new_achievements: Vec<Achievement>,
    pub crisis_detected: bool,
}
