use std::sync::Arc;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::responder::{BotReply, ResponseGenerator};
use super::types::*;
use crate::config::AppConfig;
use crate::crisis::{CrisisService, CrisisSource};
use crate::database::models::{ChatMessage, ChatSession};
use crate::database::{new_id, now};
use crate::error::AppError;
use crate::gamification::GamificationService;
use crate::validation::{max_length, require_range, require_text};

const MAX_MESSAGE_CHARS: usize = 2000;

/// Chat sessions with the scripted support bot.
pub struct ChatService {
    pool: SqlitePool,
    config: Arc<AppConfig>,
    responder: ResponseGenerator,
}

impl ChatService {
    pub fn new(pool: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self {
            pool,
            config,
            responder: ResponseGenerator::new(),
        }
    }

    pub async fn start_session(&self, user_id: &str, request: StartSession) -> Result<ChatSession, AppError> {
        let title = request.title.unwrap_or_default();
        let title = title.trim();
        max_length("Session title", title, 200)?;

        let framework = match request.framework.as_deref().filter(|f| !f.is_empty()) {
            Some(f) => TherapyFramework::from_str(f)
                .ok_or_else(|| AppError::validation(format!("Unknown therapy framework: {}", f)))?
                .as_str()
                .to_string(),
            None => self.config.chat.default_framework.clone(),
        };

        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO chat_sessions (id, user_id, session_title, status, ai_model_version, therapy_framework, started_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(title)
        .bind(SessionStatus::Active.as_str())
        .bind(&self.config.chat.ai_model_version)
        .bind(&framework)
        .bind(now())
        .execute(&self.pool)
        .await?;

        info!("Started chat session {}", id);
        self.fetch_session(&id).await
    }

    pub async fn list_sessions(&self, user_id: &str) -> Result<Vec<ChatSession>, AppError> {
        let sessions = sqlx::query_as::<_, ChatSession>(
            "SELECT * FROM chat_sessions WHERE user_id = ? ORDER BY started_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    pub async fn recent_sessions(&self, user_id: &str, limit: i64) -> Result<Vec<ChatSession>, AppError> {
        let sessions = sqlx::query_as::<_, ChatSession>(
            "SELECT * FROM chat_sessions WHERE user_id = ? ORDER BY started_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    async fn fetch_session(&self, session_id: &str) -> Result<ChatSession, AppError> {
        sqlx::query_as::<_, ChatSession>("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Chat session"))
    }

    /// The session if `user_id` owns it. Other users get NotFound so session
    /// ids are not probeable.
    async fn owned_session(&self, user_id: &str, session_id: &str) -> Result<ChatSession, AppError> {
        let session = self.fetch_session(session_id).await?;
        if session.user_id != user_id {
            return Err(AppError::not_found("Chat session"));
        }
        Ok(session)
    }

    /// Session with its messages in the order they were sent. Staff may read
    /// any session.
    pub async fn get_session(
        &self,
        user_id: &str,
        is_staff: bool,
        session_id: &str,
    ) -> Result<SessionTranscript, AppError> {
        let session = if is_staff {
            self.fetch_session(session_id).await?
        } else {
            self.owned_session(user_id, session_id).await?
        };

        let messages = sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM chat_messages WHERE session_id = ? ORDER BY seq ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(SessionTranscript { session, messages })
    }

    /// Store the user's message, answer it and run crisis detection.
    pub async fn send_message(&self, user_id: &str, session_id: &str, text: &str) -> Result<ChatExchange, AppError> {
        let text = require_text("Message", text, MAX_MESSAGE_CHARS)?;
        let session = self.owned_session(user_id, session_id).await?;
        if session.status == SessionStatus::Ended.as_str() {
            return Err(AppError::validation("This chat session has ended"));
        }
        let limit = self.config.chat.max_messages_per_session;
        if session.total_messages + 2 > limit {
            return Err(Self::limit_reached(limit));
        }

        let crisis_service = CrisisService::new(self.pool.clone(), self.config.clone());
        let crisis = crisis_service.detector().scan(&text);

        let mut reply = match &crisis {
            Some(_) => {
                let country: Option<String> = sqlx::query_scalar("SELECT country FROM users WHERE id = ?")
                    .bind(user_id)
                    .fetch_optional(&self.pool)
                    .await?;
                let hotlines = crisis_service.resources_for_country(country.as_deref()).await?;
                let hotline = hotlines
                    .iter()
                    .find(|r| !r.phone_number.is_empty())
                    .map(|r| (r.name.as_str(), r.phone_number.as_str()));
                self.responder.crisis_reply(hotline)
            }
            None => self.responder.respond(&text),
        };

        let mut keywords = std::mem::take(&mut reply.keywords);
        if let Some(found) = &crisis {
            keywords.extend(found.keywords.iter().cloned());
        }

        let mut tx = self.pool.begin().await?;

        // claim both message slots before writing anything else
        let reserved: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE chat_sessions SET total_messages = total_messages + 2
            WHERE id = ? AND status != ? AND total_messages + 2 <= ?
            RETURNING total_messages
            "#,
        )
        .bind(session_id)
        .bind(SessionStatus::Ended.as_str())
        .bind(limit)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(total) = reserved else {
            let status: String = sqlx::query_scalar("SELECT status FROM chat_sessions WHERE id = ?")
                .bind(session_id)
                .fetch_one(&mut *tx)
                .await?;
            return Err(if status == SessionStatus::Ended.as_str() {
                AppError::validation("This chat session has ended")
            } else {
                Self::limit_reached(limit)
            });
        };
        let seq = total - 2;

        let user_message_id =
            Self::insert_message(&mut tx, session_id, Sender::User, &text, &keywords, crisis.is_some(), seq).await?;

        let mut crisis_alert_id = None;
        if let Some(found) = &crisis {
            let alert_id = crisis_service
                .raise_with(&mut tx, user_id, CrisisSource::Chat { session_id }, &text, found)
                .await?;
            sqlx::query(
                r#"
                UPDATE chat_sessions
                SET crisis_detected = 1, status = ?, crisis_severity = MAX(COALESCE(crisis_severity, 0), ?)
                WHERE id = ?
                "#,
            )
            .bind(SessionStatus::CrisisDetected.as_str())
            .bind(found.severity.numeric())
            .bind(session_id)
            .execute(&mut *tx)
            .await?;
            crisis_alert_id = Some(alert_id);
        }

        let bot_message_id = Self::insert_bot_reply(&mut tx, session_id, &reply, seq + 1).await?;
        tx.commit().await?;

        debug!("Session {} answered with {}", session_id, reply.template_key);
        Ok(ChatExchange {
            user_message: self.fetch_message(&user_message_id).await?,
            bot_message: self.fetch_message(&bot_message_id).await?,
            crisis_detected: crisis.is_some(),
            crisis_severity: crisis.map(|found| found.severity),
            crisis_alert_id,
        })
    }

    fn limit_reached(limit: i64) -> AppError {
        AppError::validation(format!(
            "This session has reached its limit of {} messages. Please start a new session.",
            limit
        ))
    }

    async fn insert_message(
        conn: &mut SqliteConnection,
        session_id: &str,
        sender: Sender,
        text: &str,
        keywords: &[String],
        crisis: bool,
        seq: i64,
    ) -> Result<String, AppError> {
        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO chat_messages
            (id, session_id, sender, message_text, keywords_extracted, contains_crisis_keywords,
             requires_intervention, created_at, seq)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(session_id)
        .bind(sender.as_str())
        .bind(text)
        .bind(serde_json::to_string(keywords)?)
        .bind(crisis)
        .bind(crisis)
        .bind(now())
        .bind(seq)
        .execute(&mut *conn)
        .await?;
        Ok(id)
    }

    async fn insert_bot_reply(
        conn: &mut SqliteConnection,
        session_id: &str,
        reply: &BotReply,
        seq: i64,
    ) -> Result<String, AppError> {
        let message_id = Self::insert_message(conn, session_id, Sender::Bot, &reply.text, &[], false, seq).await?;

        sqlx::query(
            "INSERT INTO bot_responses (id, message_id, response_template, confidence_score, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(new_id())
        .bind(&message_id)
        .bind(&reply.template_key)
        .bind(reply.confidence)
        .bind(now())
        .execute(&mut *conn)
        .await?;
        Ok(message_id)
    }

    async fn fetch_message(&self, message_id: &str) -> Result<ChatMessage, AppError> {
        let message = sqlx::query_as::<_, ChatMessage>("SELECT * FROM chat_messages WHERE id = ?")
            .bind(message_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(message)
    }

    /// End a session and award the completion points.
    pub async fn end_session(&self, user_id: &str, session_id: &str) -> Result<ChatSession, AppError> {
        let session = self.owned_session(user_id, session_id).await?;
        if session.status == SessionStatus::Ended.as_str() {
            return Err(AppError::validation("This chat session has already ended"));
        }

        let ended = sqlx::query("UPDATE chat_sessions SET status = ?, ended_at = ? WHERE id = ? AND status != ?")
            .bind(SessionStatus::Ended.as_str())
            .bind(now())
            .bind(session_id)
            .bind(SessionStatus::Ended.as_str())
            .execute(&self.pool)
            .await?;
        if ended.rows_affected() == 0 {
            return Err(AppError::validation("This chat session has already ended"));
        }

        GamificationService::new(self.pool.clone(), self.config.clone())
            .award_points(user_id, self.config.gamification.points_per_chat_session)
            .await?;

        info!("Ended chat session {} after {} messages", session_id, session.total_messages);
        self.fetch_session(session_id).await
    }

    /// Rate a bot reply in one of the caller's sessions.
    pub async fn rate_response(&self, user_id: &str, message_id: &str, rating: RateResponse) -> Result<(), AppError> {
        require_range("Rating", rating.rating, 1, 5)?;

        let result = sqlx::query(
            r#"
            UPDATE bot_responses SET user_rating = ?, was_helpful = ?
            WHERE message_id = ?
              AND message_id IN (
                  SELECT m.id FROM chat_messages m JOIN chat_sessions s ON s.id = m.session_id
                  WHERE m.sender = 'bot' AND s.user_id = ?
              )
            "#,
        )
        .bind(rating.rating)
        .bind(rating.was_helpful)
        .bind(message_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Bot message"));
        }
        Ok(())
    }
}
