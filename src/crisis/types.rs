use serde::{Deserialize, Serialize};

/// Risk level of a detected crisis, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CrisisSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrisisSeverity::Low => "low",
            CrisisSeverity::Medium => "medium",
            CrisisSeverity::High => "high",
            CrisisSeverity::Critical => "critical",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(CrisisSeverity::Low),
            "medium" => Some(CrisisSeverity::Medium),
            "high" => Some(CrisisSeverity::High),
            "critical" => Some(CrisisSeverity::Critical),
            _ => None,
        }
    }

    /// Score on the 1-10 scale stored on chat sessions.
    pub fn numeric(&self) -> i64 {
        match self {
            CrisisSeverity::Low => 3,
            CrisisSeverity::Medium => 5,
            CrisisSeverity::High => 8,
            CrisisSeverity::Critical => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisType {
    SuicidalIdeation,
    SelfHarm,
    SevereDepression,
}

impl CrisisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrisisType::SuicidalIdeation => "suicidal_ideation",
            CrisisType::SelfHarm => "self_harm",
            CrisisType::SevereDepression => "severe_depression",
        }
    }

    pub fn severity(&self) -> CrisisSeverity {
        match self {
            CrisisType::SuicidalIdeation => CrisisSeverity::Critical,
            CrisisType::SelfHarm => CrisisSeverity::High,
            CrisisType::SevereDepression => CrisisSeverity::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Detected,
    Acknowledged,
    Contacted,
    Escalated,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Detected => "detected",
            AlertStatus::Acknowledged => "acknowledged",
            AlertStatus::Contacted => "contacted",
            AlertStatus::Escalated => "escalated",
            AlertStatus::Resolved => "resolved",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "detected" => Some(AlertStatus::Detected),
            "acknowledged" => Some(AlertStatus::Acknowledged),
            "contacted" => Some(AlertStatus::Contacted),
            "escalated" => Some(AlertStatus::Escalated),
            "resolved" => Some(AlertStatus::Resolved),
            _ => None,
        }
    }

    /// Alerts still needing a responder.
    pub fn is_active(&self) -> bool {
        matches!(self, AlertStatus::Detected | AlertStatus::Acknowledged)
    }
}

/// Staff action on an alert, as named in `/admin/crisis-alerts/{id}/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    Acknowledge,
    MarkContacted,
    Escalate,
    Resolve,
}

impl AlertAction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "acknowledge" => Some(AlertAction::Acknowledge),
            "contacted" | "mark-contacted" => Some(AlertAction::MarkContacted),
            "escalate" => Some(AlertAction::Escalate),
            "resolve" => Some(AlertAction::Resolve),
            _ => None,
        }
    }

    pub fn target_status(&self) -> AlertStatus {
        match self {
            AlertAction::Acknowledge => AlertStatus::Acknowledged,
            AlertAction::MarkContacted => AlertStatus::Contacted,
            AlertAction::Escalate => AlertStatus::Escalated,
            AlertAction::Resolve => AlertStatus::Resolved,
        }
    }
}

/// Result of scanning a piece of user text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrisisMatch {
    pub keywords: Vec<String>,
    pub crisis_type: CrisisType,
    pub severity: CrisisSeverity,
    pub confidence: f64,
}

/// Where the scanned text came from; links the alert to its record.
#[derive(Debug, Clone, Copy)]
pub enum CrisisSource<'a> {
    Chat { session_id: &'a str },
    MoodEntry { entry_id: &'a str },
    Journal,
    Forum,
}

impl CrisisSource<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            CrisisSource::Chat { .. } => "chat",
            CrisisSource::MoodEntry { .. } => "mood_entry",
            CrisisSource::Journal => "journal",
            CrisisSource::Forum => "forum",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertUpdate {
    #[serde(default)]
    pub intervention_taken: Option<String>,
    #[serde(default)]
    pub emergency_services_contacted: Option<bool>,
}
