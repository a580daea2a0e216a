use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Video,
    Audio,
    Chat,
    InPerson,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Video => "video",
            SessionType::Audio => "audio",
            SessionType::Chat => "chat",
            SessionType::InPerson => "in_person",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "video" => Some(SessionType::Video),
            "audio" => Some(SessionType::Audio),
            "chat" => Some(SessionType::Chat),
            "in_person" => Some(SessionType::InPerson),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::InProgress => "in_progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(AppointmentStatus::Scheduled),
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "in_progress" => Some(AppointmentStatus::InProgress),
            "completed" => Some(AppointmentStatus::Completed),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            "no_show" => Some(AppointmentStatus::NoShow),
            _ => None,
        }
    }

    /// Statuses that hold the therapist's time.
    pub fn blocks_calendar(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Scheduled | AppointmentStatus::Confirmed | AppointmentStatus::InProgress
        )
    }
}

/// Who is acting on an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Client,
    Therapist,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentAction {
    Confirm,
    Start,
    Complete,
    Cancel,
    NoShow,
}

impl AppointmentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentAction::Confirm => "confirm",
            AppointmentAction::Start => "start",
            AppointmentAction::Complete => "complete",
            AppointmentAction::Cancel => "cancel",
            AppointmentAction::NoShow => "no-show",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "confirm" => Some(AppointmentAction::Confirm),
            "start" => Some(AppointmentAction::Start),
            "complete" => Some(AppointmentAction::Complete),
            "cancel" => Some(AppointmentAction::Cancel),
            "no-show" | "no_show" => Some(AppointmentAction::NoShow),
            _ => None,
        }
    }

    pub fn allowed_for(&self, party: Party) -> bool {
        match self {
            AppointmentAction::Confirm | AppointmentAction::Complete | AppointmentAction::NoShow => {
                matches!(party, Party::Therapist | Party::Admin)
            }
            AppointmentAction::Start => party == Party::Therapist,
            AppointmentAction::Cancel => matches!(party, Party::Client | Party::Therapist),
        }
    }

    /// The status this action moves to, if it is valid from `from`.
    pub fn transition(&self, from: AppointmentStatus) -> Option<AppointmentStatus> {
        use AppointmentStatus::*;
        match (self, from) {
            (AppointmentAction::Confirm, Scheduled) => Some(Confirmed),
            (AppointmentAction::Start, Confirmed) => Some(InProgress),
            (AppointmentAction::Complete, Confirmed | InProgress) => Some(Completed),
            (AppointmentAction::Cancel, Scheduled | Confirmed) => Some(Cancelled),
            (AppointmentAction::NoShow, Scheduled | Confirmed) => Some(NoShow),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointment {
    pub therapist_id: String,
    pub session_type: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub notes_for_therapist: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentQuery {
    #[serde(default)]
    pub upcoming: bool,
    /// List the caller's sessions as therapist instead of as client.
    #[serde(default)]
    pub as_therapist: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionNoteInput {
    pub presenting_issue: String,
    pub observations: String,
    pub risk_assessment: String,
    pub progress_notes: String,
    #[serde(default)]
    pub follow_up_needed: bool,
    pub follow_up_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub rating: i64,
    pub professionalism: i64,
    pub effectiveness: i64,
    pub empathy: i64,
    pub would_recommend: bool,
    #[serde(default)]
    pub review_text: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_follow_the_lifecycle() {
        use AppointmentStatus::*;
        assert_eq!(AppointmentAction::Confirm.transition(Scheduled), Some(Confirmed));
        assert_eq!(AppointmentAction::Start.transition(Confirmed), Some(InProgress));
        assert_eq!(AppointmentAction::Complete.transition(InProgress), Some(Completed));
        assert_eq!(AppointmentAction::Complete.transition(Confirmed), Some(Completed));
        assert_eq!(AppointmentAction::Cancel.transition(Confirmed), Some(Cancelled));
        assert_eq!(AppointmentAction::NoShow.transition(Scheduled), Some(NoShow));

        assert_eq!(AppointmentAction::Start.transition(Scheduled), None);
        assert_eq!(AppointmentAction::Cancel.transition(Completed), None);
        assert_eq!(AppointmentAction::Complete.transition(Cancelled), None);
    }

    #[test]
    fn only_the_right_party_may_act() {
        assert!(AppointmentAction::Cancel.allowed_for(Party::Client));
        assert!(!AppointmentAction::Confirm.allowed_for(Party::Client));
        assert!(AppointmentAction::Confirm.allowed_for(Party::Admin));
        assert!(!AppointmentAction::Start.allowed_for(Party::Admin));
        assert!(!AppointmentAction::Cancel.allowed_for(Party::Admin));
    }
}
