use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::database::models::User;
use crate::database::now;
use crate::error::AppError;

/// Bearer-token sessions. Only the SHA-256 digest of a token is stored.
pub struct SessionStore {
    pool: SqlitePool,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(pool: SqlitePool, ttl_secs: i64) -> Self {
        Self {
            pool,
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Open a session for a user; the plain token is returned exactly once.
    pub async fn create(&self, user_id: &str) -> Result<(String, DateTime<Utc>), AppError> {
        let token = generate_token();
        let created_at = now();
        let expires_at = created_at + self.ttl;

        sqlx::query(
            "INSERT INTO auth_sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(hash_token(&token))
        .bind(user_id)
        .bind(created_at)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        debug!("Opened session for user {}", user_id);
        Ok((token, expires_at))
    }

    /// Resolve a token to its user, refreshing the user's activity timestamp.
    pub async fn resolve(&self, token: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            JOIN auth_sessions s ON s.user_id = u.id
            WHERE s.token_hash = ? AND s.expires_at > ?
            "#,
        )
        .bind(hash_token(token))
        .bind(now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired session".to_string()))?;

        if user.account_suspended || !user.is_active {
            warn!("Rejected session for suspended user {}", user.id);
            return Err(AppError::forbidden("Account suspended"));
        }

        sqlx::query("UPDATE users SET last_active = ? WHERE id = ?")
            .bind(now())
            .bind(&user.id)
            .execute(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn revoke(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM auth_sessions WHERE token_hash = ?")
            .bind(hash_token(token))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= ?")
            .bind(now())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() > 0 {
            info!("Purged {} expired sessions", result.rows_affected());
        }
        Ok(result.rows_affected())
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_random_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn token_hash_is_stable() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
    }
}
