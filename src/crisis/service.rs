use std::sync::Arc;

use serde_json::json;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use super::detector::CrisisDetector;
use super::types::*;
use crate::audit::AuditLogger;
use crate::config::AppConfig;
use crate::database::models::{CrisisAlert, CrisisResource};
use crate::database::{new_id, now};
use crate::error::AppError;
use crate::notifications::{NotificationService, NotificationType};

pub const DEFAULT_COUNTRY: &str = "USA";
const FALLBACK_RESOURCE_LIMIT: i64 = 10;

/// Creates and manages crisis alerts.
pub struct CrisisService {
    pool: SqlitePool,
    config: Arc<AppConfig>,
    detector: CrisisDetector,
}

impl CrisisService {
    pub fn new(pool: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self {
            pool,
            config,
            detector: CrisisDetector::new(),
        }
    }

    pub fn detector(&self) -> &CrisisDetector {
        &self.detector
    }

    /// Scan `text` and raise an alert when it matches. Returns the match and
    /// the new alert id.
    pub async fn scan_and_raise(
        &self,
        user_id: &str,
        source: CrisisSource<'_>,
        text: &str,
    ) -> Result<Option<(CrisisMatch, String)>, AppError> {
        match self.detector.scan(text) {
            Some(found) => {
                let alert_id = self.raise(user_id, source, text, &found).await?;
                Ok(Some((found, alert_id)))
            }
            None => Ok(None),
        }
    }

    pub async fn raise(
        &self,
        user_id: &str,
        source: CrisisSource<'_>,
        text: &str,
        found: &CrisisMatch,
    ) -> Result<String, AppError> {
        let mut tx = self.pool.begin().await?;
        let id = self.raise_with(&mut tx, user_id, source, text, found).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Record the alert and the user's notification on `conn`, inside the
    /// caller's transaction.
    pub async fn raise_with(
        &self,
        conn: &mut SqliteConnection,
        user_id: &str,
        source: CrisisSource<'_>,
        text: &str,
        found: &CrisisMatch,
    ) -> Result<String, AppError> {
        let (chat_session_id, mood_entry_id) = match source {
            CrisisSource::Chat { session_id } => (Some(session_id), None),
            CrisisSource::MoodEntry { entry_id } => (None, Some(entry_id)),
            CrisisSource::Journal | CrisisSource::Forum => (None, None),
        };

        // delivery to the contact is out of band; only the flag is kept here
        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO crisis_alerts
            (id, user_id, chat_session_id, mood_entry_id, severity, status, crisis_type,
             triggering_content, ai_confidence_score, keywords_matched, emergency_contact_notified, detected_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                    ? AND EXISTS (SELECT 1 FROM emergency_contacts
                                  WHERE user_id = ? AND can_be_contacted_during_crisis = 1),
                    ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(chat_session_id)
        .bind(mood_entry_id)
        .bind(found.severity.as_str())
        .bind(AlertStatus::Detected.as_str())
        .bind(found.crisis_type.as_str())
        .bind(text)
        .bind(found.confidence)
        .bind(serde_json::to_string(&found.keywords)?)
        .bind(self.config.crisis.notify_emergency_contacts)
        .bind(user_id)
        .bind(now())
        .execute(&mut *conn)
        .await?;

        warn!(
            "Crisis alert {} raised from {} (severity {}, type {})",
            id,
            source.label(),
            found.severity.as_str(),
            found.crisis_type.as_str()
        );

        NotificationService::notify_with(
            conn,
            user_id,
            NotificationType::Crisis,
            "You are not alone",
            "Support is available right now. Open the crisis support page for hotlines in your country.",
            Some("/crisis-support"),
        )
        .await?;

        Ok(id)
    }

    pub async fn get_alert(&self, alert_id: &str) -> Result<CrisisAlert, AppError> {
        sqlx::query_as::<_, CrisisAlert>("SELECT * FROM crisis_alerts WHERE id = ?")
            .bind(alert_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Crisis alert"))
    }

    /// Alerts for the staff queue, most severe and newest first.
    pub async fn list_alerts(&self, status: Option<AlertStatus>) -> Result<Vec<CrisisAlert>, AppError> {
        let order = r#"
            ORDER BY CASE severity WHEN 'critical' THEN 4 WHEN 'high' THEN 3 WHEN 'medium' THEN 2 ELSE 1 END DESC,
                     detected_at DESC
        "#;
        let sql = match status {
            Some(_) => format!("SELECT * FROM crisis_alerts WHERE status = ? {}", order),
            None => format!("SELECT * FROM crisis_alerts {}", order),
        };

        let mut query = sqlx::query_as::<_, CrisisAlert>(&sql);
        if let Some(status) = status {
            query = query.bind(status.as_str());
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    pub async fn alerts_for_user(&self, user_id: &str) -> Result<Vec<CrisisAlert>, AppError> {
        let alerts = sqlx::query_as::<_, CrisisAlert>(
            "SELECT * FROM crisis_alerts WHERE user_id = ? ORDER BY detected_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }

    /// Apply a responder action. Resolved alerts are closed to further changes.
    pub async fn apply_action(
        &self,
        alert_id: &str,
        responder_id: &str,
        action: AlertAction,
        update: AlertUpdate,
    ) -> Result<CrisisAlert, AppError> {
        let alert = self.get_alert(alert_id).await?;
        if alert.status == AlertStatus::Resolved.as_str() {
            return Err(AppError::validation("Alert is already resolved"));
        }

        let target = action.target_status();
        let at = now();
        let acknowledged_at = alert.acknowledged_at.unwrap_or(at);
        let resolved_at = (action == AlertAction::Resolve).then_some(at);
        let intervention = update
            .intervention_taken
            .map(|s| s.trim().to_string())
            .unwrap_or(alert.intervention_taken.clone());
        let services_contacted = update
            .emergency_services_contacted
            .unwrap_or(alert.emergency_services_contacted);

        sqlx::query(
            r#"
            UPDATE crisis_alerts SET
                status = ?, responder_id = ?, acknowledged_at = ?, resolved_at = COALESCE(?, resolved_at),
                intervention_taken = ?, emergency_services_contacted = ?
            WHERE id = ?
            "#,
        )
        .bind(target.as_str())
        .bind(responder_id)
        .bind(acknowledged_at)
        .bind(resolved_at)
        .bind(&intervention)
        .bind(services_contacted)
        .bind(alert_id)
        .execute(&self.pool)
        .await?;

        if let Some(session_id) = &alert.chat_session_id {
            if action == AlertAction::Resolve {
                sqlx::query("UPDATE chat_sessions SET crisis_handled = 1 WHERE id = ?")
                    .bind(session_id)
                    .execute(&self.pool)
                    .await?;
            }
        }

        AuditLogger::new(self.pool.clone())
            .record(
                Some(responder_id),
                &format!("crisis_alert.{}", target.as_str()),
                "CrisisAlert",
                alert_id,
                json!({ "from": alert.status, "to": target.as_str() }),
            )
            .await?;

        info!("Crisis alert {} moved {} -> {}", alert_id, alert.status, target.as_str());
        self.get_alert(alert_id).await
    }

    /// Active hotlines for a country, 24/7 lines first. Falls back to every
    /// active resource when the country has none.
    pub async fn resources_for_country(&self, country: Option<&str>) -> Result<Vec<CrisisResource>, AppError> {
        let country = country
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COUNTRY);

        let local = sqlx::query_as::<_, CrisisResource>(
            r#"
            SELECT * FROM crisis_resources
            WHERE is_active = 1 AND country = ? COLLATE NOCASE
            ORDER BY available_24_7 DESC, name ASC
            "#,
        )
        .bind(country)
        .fetch_all(&self.pool)
        .await?;
        if !local.is_empty() {
            return Ok(local);
        }

        let fallback = sqlx::query_as::<_, CrisisResource>(
            "SELECT * FROM crisis_resources WHERE is_active = 1 ORDER BY available_24_7 DESC, name ASC LIMIT ?",
        )
        .bind(FALLBACK_RESOURCE_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(fallback)
    }
}
