use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::streak::Streak;
use crate::config::AppConfig;
use crate::database::models::{Achievement, EarnedAchievement, UserStreak};
use crate::database::now;
use crate::error::AppError;
use crate::notifications::{NotificationService, NotificationType};

/// Metric an achievement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    MoodEntries,
    MoodStreak,
    ActivitiesCompleted,
    JournalEntries,
    ForumPosts,
}

impl Requirement {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "mood_entry" => Some(Requirement::MoodEntries),
            "mood_streak" => Some(Requirement::MoodStreak),
            "activities_completed" => Some(Requirement::ActivitiesCompleted),
            "journal_entries" => Some(Requirement::JournalEntries),
            "forum_posts" => Some(Requirement::ForumPosts),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GamificationSummary {
    pub streak: UserStreak,
    pub earned: Vec<EarnedAchievement>,
    pub available: Vec<Achievement>,
}

/// Points, streaks and achievements.
pub struct GamificationService {
    pool: SqlitePool,
    config: Arc<AppConfig>,
}

impl GamificationService {
    pub fn new(pool: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { pool, config }
    }

    pub async fn award_points(&self, user_id: &str, points: i64) -> Result<(), AppError> {
        if !self.config.gamification.enabled || points <= 0 {
            return Ok(());
        }
        self.ensure_streak_row(user_id).await?;
        sqlx::query("UPDATE user_streaks SET total_points = total_points + ?, updated_at = ? WHERE user_id = ?")
            .bind(points)
            .bind(now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        debug!("Awarded {} points to {}", points, user_id);
        Ok(())
    }

    pub async fn streak(&self, user_id: &str) -> Result<UserStreak, AppError> {
        self.ensure_streak_row(user_id).await?;
        let streak = sqlx::query_as::<_, UserStreak>("SELECT * FROM user_streaks WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(streak)
    }

    /// Advance the mood streak for an entry dated `day`. Sends a streak
    /// notification the day the configured threshold is reached.
    pub async fn record_mood_day(&self, user_id: &str, day: NaiveDate) -> Result<Streak, AppError> {
        let row = self.streak(user_id).await?;
        let before = Streak::new(row.current_mood_streak, row.longest_mood_streak, row.last_mood_entry);
        let after = before.advance(day);
        if after == before {
            return Ok(after);
        }

        sqlx::query(
            r#"
            UPDATE user_streaks
            SET current_mood_streak = ?, longest_mood_streak = ?, last_mood_entry = ?, updated_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(after.current)
        .bind(after.longest)
        .bind(after.last)
        .bind(now())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let threshold = self.config.gamification.mood_streak_threshold;
        if self.config.gamification.enabled && after.current == threshold {
            NotificationService::new(self.pool.clone())
                .notify(
                    user_id,
                    NotificationType::Achievement,
                    &format!("{}-day mood streak!", threshold),
                    "You have checked in every day. Keep it going!",
                    Some("/achievements"),
                )
                .await?;
        }
        Ok(after)
    }

    pub async fn record_activity_day(&self, user_id: &str, day: NaiveDate) -> Result<Streak, AppError> {
        let row = self.streak(user_id).await?;
        let before = Streak::new(row.current_activity_streak, row.longest_activity_streak, row.last_activity);
        let after = before.advance(day);
        if after == before {
            return Ok(after);
        }

        sqlx::query(
            r#"
            UPDATE user_streaks
            SET current_activity_streak = ?, longest_activity_streak = ?, last_activity = ?, updated_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(after.current)
        .bind(after.longest)
        .bind(after.last)
        .bind(now())
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(after)
    }

    async fn metric(&self, user_id: &str, requirement: Requirement) -> Result<i64, AppError> {
        let sql = match requirement {
            Requirement::MoodEntries => "SELECT COUNT(*) FROM mood_entries WHERE user_id = ?",
            Requirement::MoodStreak => {
                "SELECT MAX(current_mood_streak, longest_mood_streak) FROM user_streaks WHERE user_id = ?"
            }
            Requirement::ActivitiesCompleted => {
                "SELECT COUNT(*) FROM user_activity_logs WHERE user_id = ? AND completed = 1"
            }
            Requirement::JournalEntries => "SELECT COUNT(*) FROM journal_entries WHERE user_id = ?",
            Requirement::ForumPosts => "SELECT COUNT(*) FROM forum_posts WHERE author_id = ?",
        };
        let value: Option<i64> = sqlx::query_scalar(sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value.unwrap_or(0))
    }

    /// Award every active achievement the user now qualifies for.
    pub async fn evaluate(&self, user_id: &str) -> Result<Vec<Achievement>, AppError> {
        if !self.config.gamification.enabled {
            return Ok(Vec::new());
        }

        let pending = sqlx::query_as::<_, Achievement>(
            r#"
            SELECT a.* FROM achievements a
            WHERE a.is_active = 1
              AND NOT EXISTS (
                  SELECT 1 FROM user_achievements ua WHERE ua.achievement_id = a.id AND ua.user_id = ?
              )
            ORDER BY a.requirement_count ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let notifications = NotificationService::new(self.pool.clone());
        let mut earned = Vec::new();
        for achievement in pending {
            let Some(requirement) = Requirement::from_str(&achievement.requirement_type) else {
                continue;
            };
            if self.metric(user_id, requirement).await? < achievement.requirement_count {
                continue;
            }

            let inserted = sqlx::query(
                "INSERT OR IGNORE INTO user_achievements (user_id, achievement_id, earned_at) VALUES (?, ?, ?)",
            )
            .bind(user_id)
            .bind(achievement.id)
            .bind(now())
            .execute(&self.pool)
            .await?;
            if inserted.rows_affected() == 0 {
                continue;
            }

            self.award_points(user_id, achievement.points).await?;
            notifications
                .notify(
                    user_id,
                    NotificationType::Achievement,
                    &format!("Achievement unlocked: {}", achievement.name),
                    &achievement.description,
                    Some("/achievements"),
                )
                .await?;
            info!("User {} earned achievement {}", user_id, achievement.slug);
            earned.push(achievement);
        }
        Ok(earned)
    }

    pub async fn earned(&self, user_id: &str) -> Result<Vec<EarnedAchievement>, AppError> {
        let rows = sqlx::query_as::<_, EarnedAchievement>(
            r#"
            SELECT a.slug, a.name, a.icon, a.points, ua.earned_at
            FROM user_achievements ua JOIN achievements a ON a.id = ua.achievement_id
            WHERE ua.user_id = ?
            ORDER BY ua.earned_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn summary(&self, user_id: &str) -> Result<GamificationSummary, AppError> {
        let streak = self.streak(user_id).await?;
        let earned = self.earned(user_id).await?;
        let available = sqlx::query_as::<_, Achievement>(
            r#"
            SELECT a.* FROM achievements a
            WHERE a.is_active = 1
              AND NOT EXISTS (
                  SELECT 1 FROM user_achievements ua WHERE ua.achievement_id = a.id AND ua.user_id = ?
              )
            ORDER BY a.points ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(GamificationSummary {
            streak,
            earned,
            available,
        })
    }

    async fn ensure_streak_row(&self, user_id: &str) -> Result<(), AppError> {
        sqlx::query("INSERT OR IGNORE INTO user_streaks (user_id, updated_at) VALUES (?, ?)")
            .bind(user_id)
            .bind(now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
