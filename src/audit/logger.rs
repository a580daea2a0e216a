use chrono::Duration;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::database::models::AuditLogEntry;
use crate::database::now;
use crate::error::AppError;

#[derive(Clone)]
pub struct AuditLogger {
    pool: SqlitePool,
}

impl AuditLogger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one entry. `actor` is `None` for system-initiated actions.
    pub async fn record(
        &self,
        actor: Option<&str>,
        action: &str,
        model_name: &str,
        object_id: &str,
        changes: Value,
    ) -> Result<i64, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO audit_logs (user_id, action, model_name, object_id, changes, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(actor)
        .bind(action)
        .bind(model_name)
        .bind(object_id)
        .bind(serde_json::to_string(&changes)?)
        .bind(now())
        .execute(&self.pool)
        .await?;

        debug!("Audit: {} {} {}", action, model_name, object_id);
        Ok(result.last_insert_rowid())
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<AuditLogEntry>, AppError> {
        let rows = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_logs ORDER BY timestamp DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn for_object(&self, model_name: &str, object_id: &str) -> Result<Vec<AuditLogEntry>, AppError> {
        let rows = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_logs WHERE model_name = ? AND object_id = ? ORDER BY timestamp DESC, id DESC",
        )
        .bind(model_name)
        .bind(object_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Delete entries older than the retention window.
    pub async fn purge_older_than(&self, retention_days: i64) -> Result<u64, AppError> {
        let cutoff = now() - Duration::days(retention_days);
        let result = sqlx::query("DELETE FROM audit_logs WHERE timestamp < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!(
                "Purged {} audit entries older than {} days",
                result.rows_affected(),
                retention_days
            );
        }
        Ok(result.rows_affected())
    }
}
