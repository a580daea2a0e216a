use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::types::*;
use crate::appointments::AppointmentService;
use crate::chat::ChatService;
use crate::config::AppConfig;
use crate::crisis::service::DEFAULT_COUNTRY;
use crate::crisis::CrisisService;
use crate::error::AppError;
use crate::forum::ForumService;
use crate::gamification::GamificationService;
use crate::mood::{round1, MoodQuery, MoodTracker};
use crate::notifications::NotificationService;
use crate::recommendations::RecommendationEngine;
use crate::resources::ResourceLibrary;
use crate::validation::{is_valid_email, max_length, require_choice, require_text};
use crate::wellness::WellnessService;

pub const OFFERINGS: &[Offering] = &[
    Offering {
        name: "AI Therapy Chatbot",
        description: "Around-the-clock conversational support grounded in therapeutic frameworks.",
        features: &["CBT & DBT frameworks", "Crisis detection", "Personalized responses"],
    },
    Offering {
        name: "Mood Tracking",
        description: "Track your emotional well-being and discover patterns.",
        features: &["Daily mood logging", "Pattern analysis", "Trigger identification"],
    },
    Offering {
        name: "Professional Counseling",
        description: "Connect with verified therapists for personalized sessions.",
        features: &["Video, audio and chat sessions", "Verified professionals", "Flexible scheduling"],
    },
    Offering {
        name: "Community Forum",
        description: "A moderated space for peer support and shared experiences.",
        features: &["Moderated discussions", "Anonymous posting", "Topic categories"],
    },
    Offering {
        name: "Wellness Activities",
        description: "Guided activities for mental and emotional wellness.",
        features: &["Meditation guides", "Breathing exercises", "Journaling prompts"],
    },
    Offering {
        name: "Resource Library",
        description: "Curated mental health content and educational materials.",
        features: &["Articles & videos", "Worksheets", "Self-help tools"],
    },
];

const HOME_FEATURED: i64 = 3;
const HOME_POSTS: i64 = 5;
const DASHBOARD_MOODS: i64 = 7;
const DASHBOARD_SESSIONS: i64 = 5;
const DASHBOARD_APPOINTMENTS: i64 = 5;

pub struct SiteService {
    pool: SqlitePool,
    config: Arc<AppConfig>,
}

impl SiteService {
    pub fn new(pool: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { pool, config }
    }

    async fn count(&self, sql: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(sql).fetch_one(&self.pool).await?;
        Ok(count)
    }

    pub async fn home(&self) -> Result<HomePage, AppError> {
        Ok(HomePage {
            active_users: self.count("SELECT COUNT(*) FROM users WHERE is_active = 1").await?,
            chat_sessions: self.count("SELECT COUNT(*) FROM chat_sessions").await?,
            verified_therapists: self
                .count("SELECT COUNT(*) FROM therapist_profiles WHERE is_verified = 1")
                .await?,
            featured_resources: ResourceLibrary::new(self.pool.clone()).featured(HOME_FEATURED).await?,
            recent_posts: ForumService::new(self.pool.clone(), self.config.clone())
                .recent_posts(HOME_POSTS)
                .await?,
            popular_activities: WellnessService::new(self.pool.clone(), self.config.clone())
                .popular_activities()
                .await?,
        })
    }

    pub async fn about(&self) -> Result<AboutPage, AppError> {
        let average: Option<f64> = sqlx::query_scalar("SELECT AVG(average_rating) FROM therapist_profiles")
            .fetch_one(&self.pool)
            .await?;
        Ok(AboutPage {
            verified_therapists: self
                .count("SELECT COUNT(*) FROM therapist_profiles WHERE is_verified = 1")
                .await?,
            completed_sessions: self
                .count("SELECT COUNT(*) FROM counseling_appointments WHERE status = 'completed'")
                .await?,
            average_therapist_rating: round1(average.unwrap_or(0.0)),
        })
    }

    pub fn services(&self) -> &'static [Offering] {
        OFFERINGS
    }

    pub async fn crisis_support(&self, country: Option<&str>) -> Result<CrisisSupportPage, AppError> {
        let country = country
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COUNTRY)
            .to_string();
        let resources = CrisisService::new(self.pool.clone(), self.config.clone())
            .resources_for_country(Some(&country))
            .await?;
        Ok(CrisisSupportPage { country, resources })
    }

    pub async fn dashboard(&self, user_id: &str) -> Result<UserDashboard, AppError> {
        let recent_mood_entries = MoodTracker::new(self.pool.clone(), self.config.clone())
            .list_entries(
                user_id,
                MoodQuery {
                    from: None,
                    to: None,
                    limit: Some(DASHBOARD_MOODS),
                },
            )
            .await?;
        let average_mood = if recent_mood_entries.is_empty() {
            0.0
        } else {
            let total: i64 = recent_mood_entries.iter().map(|e| e.mood_score).sum();
            round1(total as f64 / recent_mood_entries.len() as f64)
        };

        Ok(UserDashboard {
            recent_mood_entries,
            average_mood,
            recent_chat_sessions: ChatService::new(self.pool.clone(), self.config.clone())
                .recent_sessions(user_id, DASHBOARD_SESSIONS)
                .await?,
            upcoming_appointments: AppointmentService::new(self.pool.clone())
                .upcoming(user_id, DASHBOARD_APPOINTMENTS)
                .await?,
            streak: GamificationService::new(self.pool.clone(), self.config.clone())
                .streak(user_id)
                .await?,
            recommendations: RecommendationEngine::new(self.pool.clone(), self.config.clone())
                .list(user_id)
                .await?,
            unread_notifications: NotificationService::new(self.pool.clone()).unread_count(user_id).await?,
        })
    }

    pub fn contact(&self, form: ContactForm) -> Result<Acknowledgement, AppError> {
        let name = require_text("Name", &form.name, 100)?;
        if !is_valid_email(form.email.trim()) {
            return Err(AppError::validation("Enter a valid email address"));
        }
        max_length("Subject", &form.subject, 200)?;
        require_text("Message", &form.message, 5000)?;

        info!("Contact message received (subject: {:?})", form.subject.trim());
        Ok(Acknowledgement {
            message: format!("Thank you {}! We will get back to you soon.", name),
            next: "/contact",
        })
    }

    pub fn quick_checkin(&self, form: QuickCheckin) -> Result<Acknowledgement, AppError> {
        let first_name = require_text("First name", &form.fname, 100)?;
        max_length("Last name", &form.lname, 100)?;
        if !is_valid_email(form.email.trim()) {
            return Err(AppError::validation("Enter a valid email address"));
        }
        let concern = require_choice("concern", form.concern.trim(), Concern::from_str)?;
        max_length("Message", &form.message, 2000)?;

        let next = if concern == Concern::Crisis {
            warn!("Quick check-in flagged a crisis concern");
            "/crisis-support"
        } else {
            "/"
        };
        Ok(Acknowledgement {
            message: format!(
                "Thank you {}! We've received your information. Check your email for next steps.",
                first_name
            ),
            next,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteService {
        let pool = SqlitePool::connect_lazy("sqlite::memory:").unwrap();
        SiteService::new(pool, Arc::new(AppConfig::default()))
    }

    #[tokio::test]
    async fn crisis_checkin_points_to_crisis_support() {
        let ack = site()
            .quick_checkin(QuickCheckin {
                fname: "Sam".into(),
                lname: String::new(),
                email: "sam@example.com".into(),
                concern: "crisis".into(),
                message: String::new(),
            })
            .unwrap();
        assert_eq!(ack.next, "/crisis-support");
    }

    #[tokio::test]
    async fn other_concerns_return_home() {
        let ack = site()
            .quick_checkin(QuickCheckin {
                fname: "Sam".into(),
                lname: "Lee".into(),
                email: "sam@example.com".into(),
                concern: "stress".into(),
                message: "busy week".into(),
            })
            .unwrap();
        assert_eq!(ack.next, "/");
    }

    #[tokio::test]
    async fn contact_requires_a_valid_email() {
        let result = site().contact(ContactForm {
            name: "Sam".into(),
            email: "not-an-email".into(),
            subject: String::new(),
            message: "hello".into(),
        });
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn six_offerings() {
        assert_eq!(OFFERINGS.len(), 6);
    }
}
