use serde::{Deserialize, Serialize};

use crate::crisis::CrisisSeverity;
use crate::database::models::{ChatMessage, ChatSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Ended,
    Escalated,
    CrisisDetected,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Ended => "ended",
            SessionStatus::Escalated => "escalated",
            SessionStatus::CrisisDetected => "crisis_detected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SessionStatus::Active),
            "ended" => Some(SessionStatus::Ended),
            "escalated" => Some(SessionStatus::Escalated),
            "crisis_detected" => Some(SessionStatus::CrisisDetected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
    System,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
            Sender::System => "system",
        }
    }
}

/// Therapeutic approach the bot's phrasing follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TherapyFramework {
    Cbt,
    Dbt,
    Act,
    Mindfulness,
}

impl TherapyFramework {
    pub fn as_str(&self) -> &'static str {
        match self {
            TherapyFramework::Cbt => "CBT",
            TherapyFramework::Dbt => "DBT",
            TherapyFramework::Act => "ACT",
            TherapyFramework::Mindfulness => "Mindfulness",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cbt" => Some(TherapyFramework::Cbt),
            "dbt" => Some(TherapyFramework::Dbt),
            "act" => Some(TherapyFramework::Act),
            "mindfulness" => Some(TherapyFramework::Mindfulness),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartSession {
    pub title: Option<String>,
    pub framework: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessage {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionTranscript {
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
}

/// Body of `POST /chat/{id}/send`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatExchange {
    pub user_message: ChatMessage,
    pub bot_message: ChatMessage,
    pub crisis_detected: bool,
    pub crisis_severity: Option<CrisisSeverity>,
    pub crisis_alert_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateResponse {
    pub rating: i64,
    pub was_helpful: Option<bool>,
}
