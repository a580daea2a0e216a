use serde::{Deserialize, Serialize};

use crate::database::models::{
    Appointment, ChatSession, CrisisResource, MoodEntry, Recommendation, Resource, UserStreak, WellnessActivity,
};
use crate::forum::PostView;

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub active_users: i64,
    pub chat_sessions: i64,
    pub verified_therapists: i64,
    pub featured_resources: Vec<Resource>,
    pub recent_posts: Vec<PostView>,
    pub popular_activities: Vec<WellnessActivity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AboutPage {
    pub verified_therapists: i64,
    pub completed_sessions: i64,
    pub average_therapist_rating: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Offering {
    pub name: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct CrisisSupportPage {
    pub country: String,
    pub resources: Vec<CrisisResource>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserDashboard {
    pub recent_mood_entries: Vec<MoodEntry>,
    pub average_mood: f64,
    pub recent_chat_sessions: Vec<ChatSession>,
    pub upcoming_appointments: Vec<Appointment>,
    pub streak: UserStreak,
    pub recommendations: Vec<Recommendation>,
    pub unread_notifications: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concern {
    Anxiety,
    Depression,
    Stress,
    Relationships,
    Crisis,
    Other,
}

impl Concern {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "anxiety" => Some(Concern::Anxiety),
            "depression" => Some(Concern::Depression),
            "stress" => Some(Concern::Stress),
            "relationships" => Some(Concern::Relationships),
            "crisis" => Some(Concern::Crisis),
            "other" => Some(Concern::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuickCheckin {
    pub fname: String,
    #[serde(default)]
    pub lname: String,
    pub email: String,
    pub concern: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Acknowledgement {
    pub message: String,
    pub next: &'static str,
}
