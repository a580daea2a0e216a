//! Application configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `MHP__`-prefixed environment variables (`MHP__SERVER__PORT=8080`).

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub chat: ChatConfig,
    pub crisis: CrisisConfig,
    pub moderation: ModerationConfig,
    pub gamification: GamificationConfig,
    pub analytics: AnalyticsConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub session_ttl_secs: i64,
    pub min_password_length: usize,
    pub minimum_age: u32,
    pub parental_consent_age: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub max_messages_per_session: i64,
    pub ai_model_version: String,
    pub default_framework: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrisisConfig {
    pub alert_email: String,
    pub notify_emergency_contacts: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    pub enabled: bool,
    pub toxicity_threshold: f64,
    pub auto_flag_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GamificationConfig {
    pub enabled: bool,
    pub points_per_mood_entry: i64,
    pub points_per_chat_session: i64,
    pub points_per_activity_completion: i64,
    pub mood_streak_threshold: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub enabled: bool,
    pub snapshot_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub retention_days: i64,
    pub purge_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://mental_health.db".to_string(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            chat: ChatConfig::default(),
            crisis: CrisisConfig::default(),
            moderation: ModerationConfig::default(),
            gamification: GamificationConfig::default(),
            analytics: AnalyticsConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 86_400,
            min_password_length: 8,
            minimum_age: 13,
            parental_consent_age: 18,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_messages_per_session: 100,
            ai_model_version: "scripted-v1".to_string(),
            default_framework: "CBT".to_string(),
        }
    }
}

impl Default for CrisisConfig {
    fn default() -> Self {
        Self {
            alert_email: "crisis@mentalhealthplatform.com".to_string(),
            notify_emergency_contacts: true,
        }
    }
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            toxicity_threshold: 0.7,
            auto_flag_threshold: 0.85,
        }
    }
}

impl Default for GamificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            points_per_mood_entry: 10,
            points_per_chat_session: 20,
            points_per_activity_completion: 15,
            mood_streak_threshold: 7,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            snapshot_interval_secs: 3600,
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            // seven years
            retention_days: 2555,
            purge_interval_secs: 86_400,
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file and the environment.
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        let file = path.unwrap_or("config.toml");
        info!("Loading configuration (file: {}, optional)", file);

        let settings = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix("MHP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the loaded configuration
    pub fn validate(&self) -> Result<(), AppError> {
        if self.server.port == 0 {
            return Err(AppError::Config("server.port must be non-zero".to_string()));
        }

        if self.database_url.trim().is_empty() {
            return Err(AppError::Config("database_url is empty".to_string()));
        }

        let moderation = &self.moderation;
        for (name, value) in [
            ("toxicity_threshold", moderation.toxicity_threshold),
            ("auto_flag_threshold", moderation.auto_flag_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AppError::Config(format!(
                    "moderation.{} ({}) must be within [0, 1]",
                    name, value
                )));
            }
        }
        if moderation.toxicity_threshold > moderation.auto_flag_threshold {
            return Err(AppError::Config(format!(
                "moderation.toxicity_threshold ({}) > moderation.auto_flag_threshold ({})",
                moderation.toxicity_threshold, moderation.auto_flag_threshold
            )));
        }

        let points = &self.gamification;
        if points.points_per_mood_entry < 0
            || points.points_per_chat_session < 0
            || points.points_per_activity_completion < 0
        {
            return Err(AppError::Config(
                "gamification points cannot be negative".to_string(),
            ));
        }

        if self.auth.min_password_length < 6 {
            return Err(AppError::Config(format!(
                "auth.min_password_length ({}) must be at least 6",
                self.auth.min_password_length
            )));
        }

        if self.auth.minimum_age > self.auth.parental_consent_age {
            return Err(AppError::Config(format!(
                "auth.minimum_age ({}) > auth.parental_consent_age ({})",
                self.auth.minimum_age, self.auth.parental_consent_age
            )));
        }

        if self.auth.session_ttl_secs <= 0 || self.chat.max_messages_per_session < 2 {
            return Err(AppError::Config(
                "auth.session_ttl_secs and chat.max_messages_per_session must be positive"
                    .to_string(),
            ));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gamification.points_per_mood_entry, 10);
        assert_eq!(config.chat.max_messages_per_session, 100);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn rejects_inverted_moderation_thresholds() {
        let mut config = AppConfig::default();
        config.moderation.toxicity_threshold = 0.9;
        config.moderation.auto_flag_threshold = 0.5;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        let mut config = AppConfig::default();
        config.moderation.auto_flag_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_negative_points() {
        let mut config = AppConfig::default();
        config.gamification.points_per_chat_session = -5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_minimum_age_above_consent_age() {
        let mut config = AppConfig::default();
        config.auth.minimum_age = 21;
        assert!(config.validate().is_err());
    }
}
