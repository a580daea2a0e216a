use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub total: i64,
    pub active_last_7_days: i64,
    pub new_last_7_days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrisisStats {
    pub active: i64,
    pub last_7_days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngagementStats {
    pub chat_sessions: i64,
    pub mood_entries: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModerationStats {
    pub pending_reports: i64,
    pub flagged_posts: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentStats {
    pub upcoming_confirmed: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffDashboard {
    pub users: UserStats,
    pub crisis: CrisisStats,
    pub engagement_today: EngagementStats,
    pub moderation: ModerationStats,
    pub appointments: AppointmentStats,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailyAverage {
    pub date: NaiveDate,
    pub average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    UserGrowth,
    CrisisSummary,
    MoodTrends,
    Engagement,
}

impl Widget {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user_growth" | "user-growth" => Some(Widget::UserGrowth),
            "crisis_summary" | "crisis-summary" => Some(Widget::CrisisSummary),
            "mood_trends" | "mood-trends" => Some(Widget::MoodTrends),
            "engagement" => Some(Widget::Engagement),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum WidgetData {
    UserGrowth {
        days: Vec<DailyCount>,
    },
    CrisisSummary {
        today: i64,
        this_week: i64,
        active: i64,
    },
    MoodTrends {
        days: Vec<DailyAverage>,
    },
    Engagement {
        chat_sessions: i64,
        mood_entries: i64,
        forum_posts: i64,
        active_users: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Verify,
    Suspend,
    Activate,
}

impl UserAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserAction::Verify => "verify",
            UserAction::Suspend => "suspend",
            UserAction::Activate => "activate",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "verify" => Some(UserAction::Verify),
            "suspend" => Some(UserAction::Suspend),
            "activate" => Some(UserAction::Activate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserActionInput {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotRequest {
    pub date: Option<NaiveDate>,
}
