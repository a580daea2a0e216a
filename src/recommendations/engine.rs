use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::info;

use super::templates::MoodBand;
use crate::config::AppConfig;
use crate::database::models::Recommendation;
use crate::database::{new_id, now};
use crate::error::AppError;
use crate::mood::{round1, MoodTracker};
use crate::notifications::{NotificationService, NotificationType};

const MOOD_WINDOW: i64 = 7;
const EXPIRY_DAYS: i64 = 7;
const LIST_LIMIT: i64 = 5;

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedRecommendations {
    pub mood_average: f64,
    pub band: MoodBand,
    pub recommendations: Vec<Recommendation>,
}

pub struct RecommendationEngine {
    pool: SqlitePool,
    config: Arc<AppConfig>,
}

impl RecommendationEngine {
    pub fn new(pool: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { pool, config }
    }

    pub async fn generate(&self, user_id: &str) -> Result<GeneratedRecommendations, AppError> {
        let (average, entries) = MoodTracker::new(self.pool.clone(), self.config.clone())
            .recent_average(user_id, MOOD_WINDOW)
            .await?
            .ok_or_else(|| AppError::validation("Log a mood entry before asking for recommendations"))?;
        let band = MoodBand::from_average(average);
        let drawn = band.draw(&mut rand::thread_rng());

        let created_at = now();
        let expires_at = created_at + Duration::days(EXPIRY_DAYS);
        let based_on = json!({
            "mood_average": round1(average),
            "entries_considered": entries,
            "band": band.as_str(),
        });

        let mut ids = Vec::with_capacity(drawn.len());
        for (template, priority) in drawn {
            let id = new_id();
            sqlx::query(
                r#"
                INSERT INTO ai_recommendations
                (id, user_id, recommendation_type, title, description, reason, confidence_score,
                 based_on_data, priority, expires_at, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(user_id)
            .bind(template.kind.as_str())
            .bind(template.title)
            .bind(template.description)
            .bind(band.reason())
            .bind(band.confidence())
            .bind(serde_json::to_string(&based_on)?)
            .bind(priority)
            .bind(expires_at)
            .bind(created_at)
            .execute(&self.pool)
            .await?;
            ids.push(id);
        }

        let mut recommendations = Vec::with_capacity(ids.len());
        for id in &ids {
            recommendations.push(self.get(user_id, id).await?);
        }

        NotificationService::new(self.pool.clone())
            .notify(
                user_id,
                NotificationType::Recommendation,
                "New recommendations",
                "We picked a few suggestions based on your recent mood.",
                Some("/recommendations"),
            )
            .await?;

        info!(
            "Generated {} recommendations for user {} ({} band)",
            recommendations.len(),
            user_id,
            band.as_str()
        );
        Ok(GeneratedRecommendations {
            mood_average: round1(average),
            band,
            recommendations,
        })
    }

    async fn get(&self, user_id: &str, recommendation_id: &str) -> Result<Recommendation, AppError> {
        sqlx::query_as::<_, Recommendation>("SELECT * FROM ai_recommendations WHERE id = ? AND user_id = ?")
            .bind(recommendation_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Recommendation"))
    }

    /// Open recommendations: not viewed, not dismissed, not expired.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Recommendation>, AppError> {
        let rows = sqlx::query_as::<_, Recommendation>(
            r#"
            SELECT * FROM ai_recommendations
            WHERE user_id = ? AND viewed = 0 AND dismissed = 0
              AND (expires_at IS NULL OR expires_at > ?)
            ORDER BY priority DESC, created_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(now())
        .bind(LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn mark_viewed(&self, user_id: &str, recommendation_id: &str) -> Result<Recommendation, AppError> {
        self.get(user_id, recommendation_id).await?;
        sqlx::query("UPDATE ai_recommendations SET viewed = 1 WHERE id = ?")
            .bind(recommendation_id)
            .execute(&self.pool)
            .await?;
        self.get(user_id, recommendation_id).await
    }

    pub async fn dismiss(&self, user_id: &str, recommendation_id: &str) -> Result<Recommendation, AppError> {
        self.get(user_id, recommendation_id).await?;
        sqlx::query("UPDATE ai_recommendations SET dismissed = 1 WHERE id = ?")
            .bind(recommendation_id)
            .execute(&self.pool)
            .await?;
        self.get(user_id, recommendation_id).await
    }
}
