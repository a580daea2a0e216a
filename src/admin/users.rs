use std::sync::Arc;

use serde_json::json;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::types::{UserAction, UserActionInput};
use crate::accounts::AccountService;
use crate::audit::AuditLogger;
use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::database::models::User;
use crate::database::now;
use crate::error::AppError;
use crate::validation::require_text;

/// Admin actions on user accounts.
pub struct UserAdmin {
    pool: SqlitePool,
    config: Arc<AppConfig>,
}

impl UserAdmin {
    pub fn new(pool: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { pool, config }
    }

    pub async fn apply(
        &self,
        admin_id: &str,
        user_id: &str,
        action: UserAction,
        input: UserActionInput,
    ) -> Result<User, AppError> {
        let accounts = AccountService::new(self.pool.clone(), self.config.clone());
        accounts.get_user(user_id).await?;

        let changes = match action {
            UserAction::Verify => {
                sqlx::query("UPDATE users SET is_verified = 1, updated_at = ? WHERE id = ?")
                    .bind(now())
                    .bind(user_id)
                    .execute(&self.pool)
                    .await?;
                json!({ "is_verified": true })
            }
            UserAction::Suspend => {
                if admin_id == user_id {
                    return Err(AppError::validation("You cannot suspend your own account"));
                }
                let reason = require_text("Suspension reason", &input.reason, 500)?;
                sqlx::query(
                    "UPDATE users SET account_suspended = 1, suspension_reason = ?, updated_at = ? WHERE id = ?",
                )
                .bind(&reason)
                .bind(now())
                .bind(user_id)
                .execute(&self.pool)
                .await?;

                let revoked = SessionStore::new(self.pool.clone(), self.config.auth.session_ttl_secs)
                    .revoke_all_for_user(user_id)
                    .await?;
                warn!("User {} suspended by {} ({} sessions revoked)", user_id, admin_id, revoked);
                json!({ "account_suspended": true, "reason": reason })
            }
            UserAction::Activate => {
                sqlx::query(
                    "UPDATE users SET account_suspended = 0, suspension_reason = '', is_active = 1, updated_at = ? WHERE id = ?",
                )
                .bind(now())
                .bind(user_id)
                .execute(&self.pool)
                .await?;
                json!({ "account_suspended": false, "is_active": true })
            }
        };

        AuditLogger::new(self.pool.clone())
            .record(
                Some(admin_id),
                &format!("user.{}", action.as_str()),
                "User",
                user_id,
                changes,
            )
            .await?;

        info!("Admin {} applied {} to user {}", admin_id, action.as_str(), user_id);
        accounts.get_user(user_id).await
    }
}
