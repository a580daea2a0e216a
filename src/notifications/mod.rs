//! In-app notifications raised by the other modules.

use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

use crate::database::models::Notification;
use crate::database::{new_id, now};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Appointment,
    MoodCheck,
    Recommendation,
    Message,
    Forum,
    Crisis,
    Achievement,
    System,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Appointment => "appointment",
            NotificationType::MoodCheck => "mood_check",
            NotificationType::Recommendation => "recommendation",
            NotificationType::Message => "message",
            NotificationType::Forum => "forum",
            NotificationType::Crisis => "crisis",
            NotificationType::Achievement => "achievement",
            NotificationType::System => "system",
        }
    }

    fn priority(&self) -> i64 {
        match self {
            NotificationType::Crisis => 10,
            NotificationType::Appointment => 5,
            _ => 0,
        }
    }
}

#[derive(Clone)]
pub struct NotificationService {
    pool: SqlitePool,
}

impl NotificationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn notify(
        &self,
        user_id: &str,
        kind: NotificationType,
        title: &str,
        message: &str,
        link_url: Option<&str>,
    ) -> Result<String, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::notify_with(&mut conn, user_id, kind, title, message, link_url).await
    }

    /// Insert a notification on a connection the caller controls, so it
    /// commits or rolls back with the caller's transaction.
    pub async fn notify_with(
        conn: &mut SqliteConnection,
        user_id: &str,
        kind: NotificationType,
        title: &str,
        message: &str,
        link_url: Option<&str>,
    ) -> Result<String, AppError> {
        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, notification_type, title, message, link_url, priority, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(kind.as_str())
        .bind(title)
        .bind(message)
        .bind(link_url.unwrap_or(""))
        .bind(kind.priority())
        .bind(now())
        .execute(&mut *conn)
        .await?;
        Ok(id)
    }

    pub async fn list(&self, user_id: &str, unread_only: bool) -> Result<Vec<Notification>, AppError> {
        let rows = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = ? AND (? = 0 OR is_read = 0)
            ORDER BY created_at DESC
            LIMIT 100
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn unread_count(&self, user_id: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn mark_read(&self, user_id: &str, notification_id: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1, read_at = COALESCE(read_at, ?) WHERE id = ? AND user_id = ?",
        )
        .bind(now())
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Notification"));
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1, read_at = ? WHERE user_id = ? AND is_read = 0",
        )
        .bind(now())
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
