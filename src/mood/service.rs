use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::info;

use super::analysis::analyze_entries;
use super::types::*;
use crate::config::AppConfig;
use crate::crisis::{CrisisService, CrisisSource};
use crate::database::models::{MoodEntry, MoodPattern};
use crate::database::{new_id, now};
use crate::error::AppError;
use crate::gamification::GamificationService;
use crate::validation::{max_length, require_optional_range, require_range};

const DEFAULT_LIST_LIMIT: i64 = 30;
const MAX_LIST_LIMIT: i64 = 365;

pub struct MoodTracker {
    pool: SqlitePool,
    config: Arc<AppConfig>,
}

impl MoodTracker {
    pub fn new(pool: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { pool, config }
    }

    /// Record the user's entry for a day.
    pub async fn record_entry(&self, user_id: &str, input: MoodEntryInput) -> Result<RecordedMood, AppError> {
        require_range("Mood score", input.mood_score, 1, 10)?;
        require_range("Energy level", input.energy_level, 1, 10)?;
        require_optional_range("Sleep quality", input.sleep_quality, 1, 10)?;
        if let Some(hours) = input.sleep_hours {
            if !(0.0..=24.0).contains(&hours) {
                return Err(AppError::validation("Sleep hours must be between 0 and 24"));
            }
        }
        max_length("Triggers", &input.triggers, 2000)?;
        max_length("Notes", &input.notes, 5000)?;

        let mood_level = match input.mood_level.as_deref().filter(|l| !l.is_empty()) {
            Some(level) => MoodLevel::from_str(level)
                .ok_or_else(|| AppError::validation(format!("Invalid mood level: {}", level)))?,
            None => MoodLevel::from_score(input.mood_score),
        };

        let today = Utc::now().date_naive();
        let entry_date = input.entry_date.unwrap_or(today);
        if entry_date > today {
            return Err(AppError::validation("Entry date cannot be in the future"));
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM mood_entries WHERE user_id = ? AND entry_date = ?)")
                .bind(user_id)
                .bind(entry_date)
                .fetch_one(&self.pool)
                .await?;
        if exists {
            return Err(AppError::Conflict(format!("A mood entry already exists for {}", entry_date)));
        }

        let clean = |items: Vec<String>| -> Vec<String> {
            items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO mood_entries
            (id, user_id, mood_level, mood_score, emotions, energy_level, sleep_quality, sleep_hours,
             activities, triggers, notes, entry_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(mood_level.as_str())
        .bind(input.mood_score)
        .bind(serde_json::to_string(&clean(input.emotions))?)
        .bind(input.energy_level)
        .bind(input.sleep_quality)
        .bind(input.sleep_hours)
        .bind(serde_json::to_string(&clean(input.activities))?)
        .bind(input.triggers.trim())
        .bind(input.notes.trim())
        .bind(entry_date)
        .bind(now())
        .execute(&self.pool)
        .await?;

        let crisis_text = format!("{}\n{}", input.triggers, input.notes);
        let crisis = CrisisService::new(self.pool.clone(), self.config.clone())
            .scan_and_raise(user_id, CrisisSource::MoodEntry { entry_id: &id }, &crisis_text)
            .await?;

        let gamification = GamificationService::new(self.pool.clone(), self.config.clone());
        gamification
            .award_points(user_id, self.config.gamification.points_per_mood_entry)
            .await?;
        let streak = gamification.record_mood_day(user_id, entry_date).await?;
        let new_achievements = gamification.evaluate(user_id).await?;

        info!("Recorded mood entry {} for {}", id, entry_date);
        Ok(RecordedMood {
            entry: self.get_entry(user_id, &id).await?,
            streak,
            new_achievements,
            crisis_detected: crisis.is_some(),
            crisis_severity: crisis.map(|(found, _)| found.severity),
        })
    }

    pub async fn get_entry(&self, user_id: &str, entry_id: &str) -> Result<MoodEntry, AppError> {
        sqlx::query_as::<_, MoodEntry>("SELECT * FROM mood_entries WHERE id = ? AND user_id = ?")
            .bind(entry_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Mood entry"))
    }

    /// Entries newest first, optionally bounded by date.
    pub async fn list_entries(&self, user_id: &str, query: MoodQuery) -> Result<Vec<MoodEntry>, AppError> {
        let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        let entries = sqlx::query_as::<_, MoodEntry>(
            r#"
            SELECT * FROM mood_entries
            WHERE user_id = ?
              AND (? IS NULL OR entry_date >= ?)
              AND (? IS NULL OR entry_date <= ?)
            ORDER BY entry_date DESC, created_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(query.from)
        .bind(query.from)
        .bind(query.to)
        .bind(query.to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Analyse the last `days` days and store the result as a mood pattern.
    pub async fn analyze(&self, user_id: &str, days: i64) -> Result<MoodPattern, AppError> {
        require_range("Days", days, 1, 365)?;
        let end_date = Utc::now().date_naive();
        let start_date = end_date - Duration::days(days - 1);

        let entries = sqlx::query_as::<_, MoodEntry>(
            r#"
            SELECT * FROM mood_entries
            WHERE user_id = ? AND entry_date >= ? AND entry_date <= ?
            ORDER BY entry_date ASC
            "#,
        )
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        let analysis =
            analyze_entries(&entries).ok_or_else(|| AppError::NotFound("No mood entries in this period".to_string()))?;

        let period_type = match days {
            1..=7 => "weekly",
            8..=31 => "monthly",
            _ => "custom",
        };

        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO mood_patterns
            (id, user_id, start_date, end_date, period_type, average_mood_score, mood_variance, trend_direction,
             dominant_emotions, common_triggers, positive_activities, recommendations, concern_level, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .bind(period_type)
        .bind(analysis.average_mood_score)
        .bind(analysis.mood_variance)
        .bind(analysis.trend_direction.as_str())
        .bind(serde_json::to_string(&analysis.dominant_emotions)?)
        .bind(serde_json::to_string(&analysis.common_triggers)?)
        .bind(serde_json::to_string(&analysis.positive_activities)?)
        .bind(&analysis.recommendations)
        .bind(analysis.concern_level)
        .bind(now())
        .execute(&self.pool)
        .await?;

        let pattern = sqlx::query_as::<_, MoodPattern>("SELECT * FROM mood_patterns WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.pool)
            .await?;
        Ok(pattern)
    }

    /// Average score of the most recent `count` entries.
    /// Average score over the `count` most recent entries, with the number
    /// of entries it was taken over.
    pub async fn recent_average(&self, user_id: &str, count: i64) -> Result<Option<(f64, i64)>, AppError> {
        let (average, entries): (Option<f64>, i64) = sqlx::query_as(
            r#"
            SELECT AVG(mood_score), COUNT(*) FROM (
                SELECT mood_score FROM mood_entries WHERE user_id = ? ORDER BY entry_date DESC LIMIT ?
            )
            "#,
        )
        .bind(user_id)
        .bind(count)
        .fetch_one(&self.pool)
        .await?;
        Ok(average.map(|average| (average, entries)))
    }
}
