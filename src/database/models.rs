use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone_number: String,
    pub country: String,
    pub region: String,
    pub preferred_language: String,
    pub timezone: String,
    pub is_anonymous: bool,
    pub data_sharing_consent: bool,
    pub is_verified: bool,
    pub is_active: bool,
    pub account_suspended: bool,
    pub suspension_reason: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub last_active: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub user_id: String,
    pub bio: String,
    pub university: String,
    pub field_of_study: String,
    pub academic_year: String,
    pub has_previous_therapy: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmergencyContact {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub relationship: String,
    pub phone_number: String,
    pub email: String,
    pub is_primary: bool,
    pub can_be_contacted_during_crisis: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TherapistProfile {
    pub id: String,
    pub user_id: String,
    pub license_number: String,
    pub specializations: Json<Vec<String>>,
    pub years_of_experience: i64,
    pub education: String,
    pub certifications: String,
    pub is_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub practice_name: String,
    pub consultation_fee: Option<f64>,
    pub accepts_insurance: bool,
    pub languages_spoken: Json<Vec<String>>,
    pub available_for_sessions: bool,
    pub max_clients: i64,
    pub average_rating: f64,
    pub total_sessions: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AvailabilitySlot {
    pub id: String,
    pub therapist_id: String,
    pub day_of_week: i64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatSession {
    pub id: String,
    pub user_id: String,
    pub session_title: String,
    pub status: String,
    pub ai_model_version: String,
    pub therapy_framework: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub total_messages: i64,
    pub crisis_detected: bool,
    pub crisis_severity: Option<i64>,
    pub crisis_handled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: String,
    pub session_id: String,
    pub sender: String,
    pub message_text: String,
    pub keywords_extracted: Json<Vec<String>>,
    pub contains_crisis_keywords: bool,
    pub requires_intervention: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub seq: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: String,
    pub user_id: String,
    pub mood_level: String,
    pub mood_score: i64,
    pub emotions: Json<Vec<String>>,
    pub energy_level: i64,
    pub sleep_quality: Option<i64>,
    pub sleep_hours: Option<f64>,
    pub activities: Json<Vec<String>>,
    pub triggers: String,
    pub notes: String,
    pub entry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodPattern {
    pub id: String,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub period_type: String,
    pub average_mood_score: f64,
    pub mood_variance: f64,
    pub trend_direction: String,
    pub dominant_emotions: Json<Vec<String>>,
    pub common_triggers: Json<Vec<String>>,
    pub positive_activities: Json<Vec<String>>,
    pub recommendations: String,
    pub concern_level: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CrisisAlert {
    pub id: String,
    pub user_id: String,
    pub chat_session_id: Option<String>,
    pub mood_entry_id: Option<String>,
    pub severity: String,
    pub status: String,
    pub crisis_type: String,
    pub triggering_content: String,
    pub ai_confidence_score: f64,
    pub keywords_matched: Json<Vec<String>>,
    pub intervention_taken: String,
    pub responder_id: Option<String>,
    pub emergency_services_contacted: bool,
    pub emergency_contact_notified: bool,
    pub detected_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CrisisResource {
    pub id: i64,
    pub country: String,
    pub region: String,
    pub resource_type: String,
    pub name: String,
    pub phone_number: String,
    pub website: String,
    pub available_24_7: bool,
    pub languages_supported: Json<Vec<String>>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ForumCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub is_active: bool,
    pub display_order: i64,
    pub post_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ForumPost {
    pub id: String,
    pub category_id: i64,
    #[serde(skip_serializing)]
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub is_anonymous: bool,
    pub view_count: i64,
    pub like_count: i64,
    pub reply_count: i64,
    pub is_published: bool,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub is_flagged: bool,
    pub moderation_status: String,
    pub toxicity_score: Option<f64>,
    pub ai_flagged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ForumReply {
    pub id: String,
    pub post_id: String,
    #[serde(skip_serializing)]
    pub author_id: String,
    pub parent_reply_id: Option<String>,
    pub content: String,
    pub is_anonymous: bool,
    pub like_count: i64,
    pub is_published: bool,
    pub is_flagged: bool,
    pub toxicity_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ForumReport {
    pub id: String,
    pub reporter_id: String,
    pub post_id: Option<String>,
    pub reply_id: Option<String>,
    pub reason: String,
    pub description: String,
    pub status: String,
    pub reviewed_by: Option<String>,
    pub action_taken: String,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: String,
    pub client_id: String,
    pub therapist_id: String,
    pub session_type: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub duration_minutes: i64,
    pub status: String,
    pub notes_for_therapist: String,
    pub fee: f64,
    pub payment_status: String,
    pub attended: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionNote {
    pub appointment_id: String,
    pub therapist_id: String,
    pub presenting_issue: String,
    pub observations: String,
    pub risk_assessment: String,
    pub progress_notes: String,
    pub follow_up_needed: bool,
    pub follow_up_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TherapistReview {
    pub id: String,
    pub appointment_id: String,
    pub client_id: String,
    pub therapist_id: String,
    pub rating: i64,
    pub professionalism: i64,
    pub effectiveness: i64,
    pub empathy: i64,
    pub would_recommend: bool,
    pub review_text: String,
    pub is_anonymous: bool,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub resource_type: String,
    pub description: String,
    pub content: String,
    pub url: String,
    pub author: String,
    pub duration_minutes: Option<i64>,
    pub tags: Json<Vec<String>>,
    pub mental_health_topics: Json<Vec<String>>,
    pub language: String,
    pub view_count: i64,
    pub like_count: i64,
    pub average_rating: f64,
    pub is_featured: bool,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResourceInteraction {
    pub user_id: String,
    pub resource_id: String,
    pub viewed: bool,
    pub completed: bool,
    pub liked: bool,
    pub saved: bool,
    pub rating: Option<i64>,
    pub progress_percentage: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recommendation {
    pub id: String,
    pub user_id: String,
    pub recommendation_type: String,
    pub title: String,
    pub description: String,
    pub reason: String,
    pub confidence_score: f64,
    pub based_on_data: Json<serde_json::Value>,
    pub viewed: bool,
    pub dismissed: bool,
    pub priority: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WellnessActivity {
    pub id: String,
    pub title: String,
    pub activity_type: String,
    pub description: String,
    pub instructions: String,
    pub duration_minutes: i64,
    pub difficulty: String,
    pub benefits: Json<Vec<String>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityLog {
    pub id: String,
    pub user_id: String,
    pub activity_id: String,
    pub completed: bool,
    pub duration_minutes: i64,
    pub mood_before: i64,
    pub mood_after: i64,
    pub notes: String,
    pub was_helpful: Option<bool>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JournalEntry {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub prompt_used: String,
    pub is_private: bool,
    pub mood_score: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub link_url: String,
    pub is_read: bool,
    pub priority: i64,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Achievement {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub requirement_type: String,
    pub requirement_count: i64,
    pub points: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EarnedAchievement {
    pub slug: String,
    pub name: String,
    pub icon: String,
    pub points: i64,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserStreak {
    pub user_id: String,
    pub current_mood_streak: i64,
    pub longest_mood_streak: i64,
    pub current_activity_streak: i64,
    pub longest_activity_streak: i64,
    pub last_mood_entry: Option<NaiveDate>,
    pub last_activity: Option<NaiveDate>,
    pub total_points: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlatformAnalytics {
    pub date: NaiveDate,
    pub total_users: i64,
    pub new_users: i64,
    pub active_users: i64,
    pub total_chat_sessions: i64,
    pub total_messages: i64,
    pub total_mood_entries: i64,
    pub total_forum_posts: i64,
    pub crisis_alerts: i64,
    pub crisis_interventions: i64,
    pub total_appointments: i64,
    pub completed_appointments: i64,
    pub users_by_country: Json<serde_json::Value>,
    pub average_mood_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    pub id: i64,
    pub user_id: Option<String>,
    pub action: String,
    pub model_name: String,
    pub object_id: String,
    pub changes: Json<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}
