use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use super::types::*;
use crate::config::AppConfig;
use crate::crisis::{CrisisService, CrisisSource};
use crate::database::models::{ActivityLog, JournalEntry, WellnessActivity};
use crate::database::{new_id, now};
use crate::error::AppError;
use crate::gamification::GamificationService;
use crate::validation::{max_length, require_optional_range, require_range, require_text};

const POPULAR_LIMIT: i64 = 4;

/// Guided wellness activities and the private journal.
pub struct WellnessService {
    pool: SqlitePool,
    config: Arc<AppConfig>,
}

impl WellnessService {
    pub fn new(pool: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { pool, config }
    }

    pub async fn list_activities(&self, activity_type: Option<&str>) -> Result<Vec<WellnessActivity>, AppError> {
        let activity_type = match activity_type.filter(|t| !t.is_empty()) {
            Some(t) => Some(
                ActivityType::from_str(t)
                    .ok_or_else(|| AppError::validation(format!("Unknown activity type: {}", t)))?
                    .as_str(),
            ),
            None => None,
        };

        let activities = sqlx::query_as::<_, WellnessActivity>(
            r#"
            SELECT * FROM wellness_activities
            WHERE is_active = 1 AND (? IS NULL OR activity_type = ?)
            ORDER BY title ASC
            "#,
        )
        .bind(activity_type)
        .bind(activity_type)
        .fetch_all(&self.pool)
        .await?;
        Ok(activities)
    }

    /// Most completed active activities.
    pub async fn popular_activities(&self) -> Result<Vec<WellnessActivity>, AppError> {
        let activities = sqlx::query_as::<_, WellnessActivity>(
            r#"
            SELECT a.* FROM wellness_activities a
            LEFT JOIN user_activity_logs l ON l.activity_id = a.id AND l.completed = 1
            WHERE a.is_active = 1
            GROUP BY a.id
            ORDER BY COUNT(l.id) DESC, a.title ASC
            LIMIT ?
            "#,
        )
        .bind(POPULAR_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(activities)
    }

    pub async fn get_activity(&self, activity_id: &str) -> Result<WellnessActivity, AppError> {
        sqlx::query_as::<_, WellnessActivity>("SELECT * FROM wellness_activities WHERE id = ? AND is_active = 1")
            .bind(activity_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Activity"))
    }

    pub async fn complete_activity(
        &self,
        user_id: &str,
        activity_id: &str,
        input: CompleteActivity,
    ) -> Result<CompletedActivity, AppError> {
        let activity = self.get_activity(activity_id).await?;
        require_range("Duration", input.duration_minutes, 1, 600)?;
        require_range("Mood before", input.mood_before, 1, 10)?;
        require_range("Mood after", input.mood_after, 1, 10)?;
        max_length("Notes", &input.notes, 2000)?;

        let id = new_id();
        let completed_at = now();
        sqlx::query(
            r#"
            INSERT INTO user_activity_logs
            (id, user_id, activity_id, completed, duration_minutes, mood_before, mood_after, notes, was_helpful, completed_at)
            VALUES (?, ?, ?, 1, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&activity.id)
        .bind(input.duration_minutes)
        .bind(input.mood_before)
        .bind(input.mood_after)
        .bind(input.notes.trim())
        .bind(input.was_helpful)
        .bind(completed_at)
        .execute(&self.pool)
        .await?;

        let gamification = GamificationService::new(self.pool.clone(), self.config.clone());
        let streak = gamification
            .record_activity_day(user_id, completed_at.date_naive())
            .await?;
        gamification
            .award_points(user_id, self.config.gamification.points_per_activity_completion)
            .await?;
        let new_achievements = gamification.evaluate(user_id).await?;

        info!("User {} completed activity {}", user_id, activity.id);
        let log = sqlx::query_as::<_, ActivityLog>("SELECT * FROM user_activity_logs WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.pool)
            .await?;
        Ok(CompletedActivity {
            log,
            streak,
            new_achievements,
        })
    }

    pub async fn activity_history(&self, user_id: &str, limit: i64) -> Result<Vec<ActivityLog>, AppError> {
        let logs = sqlx::query_as::<_, ActivityLog>(
            "SELECT * FROM user_activity_logs WHERE user_id = ? ORDER BY completed_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    pub async fn create_journal_entry(&self, user_id: &str, input: JournalInput) -> Result<SavedJournalEntry, AppError> {
        let content = require_text("Content", &input.content, 20_000)?;
        let title = input.title.trim();
        max_length("Title", title, 300)?;
        max_length("Prompt", &input.prompt_used, 500)?;
        require_optional_range("Mood score", input.mood_score, 1, 10)?;

        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO journal_entries (id, user_id, title, content, prompt_used, is_private, mood_score, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(title)
        .bind(&content)
        .bind(input.prompt_used.trim())
        .bind(input.is_private)
        .bind(input.mood_score)
        .bind(now())
        .execute(&self.pool)
        .await?;

        let crisis = CrisisService::new(self.pool.clone(), self.config.clone())
            .scan_and_raise(user_id, CrisisSource::Journal, &content)
            .await?;
        let new_achievements = GamificationService::new(self.pool.clone(), self.config.clone())
            .evaluate(user_id)
            .await?;

        let entry = sqlx::query_as::<_, JournalEntry>("SELECT * FROM journal_entries WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.pool)
            .await?;
        Ok(SavedJournalEntry {
            entry,
            new_achievements,
            crisis_detected: crisis.is_some(),
        })
    }

    pub async fn list_journal_entries(&self, user_id: &str) -> Result<Vec<JournalEntry>, AppError> {
        let entries = sqlx::query_as::<_, JournalEntry>(
            "SELECT * FROM journal_entries WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    pub async fn delete_journal_entry(&self, user_id: &str, entry_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM journal_entries WHERE id = ? AND user_id = ?")
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Journal entry"));
        }
        Ok(())
    }
}
