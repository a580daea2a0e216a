use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::crisis::CrisisSeverity;
use crate::database::models::{Achievement, MoodEntry};
use crate::gamification::Streak;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodLevel {
    VeryBad,
    Bad,
    Neutral,
    Good,
    VeryGood,
}

impl MoodLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodLevel::VeryBad => "very_bad",
            MoodLevel::Bad => "bad",
            MoodLevel::Neutral => "neutral",
            MoodLevel::Good => "good",
            MoodLevel::VeryGood => "very_good",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "very_bad" => Some(MoodLevel::VeryBad),
            "bad" => Some(MoodLevel::Bad),
            "neutral" => Some(MoodLevel::Neutral),
            "good" => Some(MoodLevel::Good),
            "very_good" => Some(MoodLevel::VeryGood),
            _ => None,
        }
    }

    /// Level implied by a 1-10 score, used when the client sends only a score.
    pub fn from_score(score: i64) -> Self {
        match score {
            i64::MIN..=2 => MoodLevel::VeryBad,
            3..=4 => MoodLevel::Bad,
            5..=6 => MoodLevel::Neutral,
            7..=8 => MoodLevel::Good,
            _ => MoodLevel::VeryGood,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Stable => "stable",
            TrendDirection::Declining => "declining",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoodEntryInput {
    pub mood_level: Option<String>,
    pub mood_score: i64,
    #[serde(default)]
    pub emotions: Vec<String>,
    pub energy_level: i64,
    pub sleep_quality: Option<i64>,
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub triggers: String,
    #[serde(default)]
    pub notes: String,
    pub entry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoodQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordedMood {
    pub entry: MoodEntry,
    pub streak: Streak,
    pub new_achievements: Vec<Achievement>,
    pub crisis_detected: bool,
    pub crisis_severity: Option<CrisisSeverity>,
}

/// Aggregate view of a run of mood entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodAnalysis {
    pub entry_count: usize,
    pub average_mood_score: f64,
    pub mood_variance: f64,
    pub trend_direction: TrendDirection,
    pub dominant_emotions: Vec<String>,
    pub common_triggers: Vec<String>,
    pub positive_activities: Vec<String>,
    pub concern_level: i64,
    pub recommendations: String,
}
