use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::{User, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Student,
    Child,
    Adult,
    Therapist,
    Moderator,
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Student => "student",
            UserType::Child => "child",
            UserType::Adult => "adult",
            UserType::Therapist => "therapist",
            UserType::Moderator => "moderator",
            UserType::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "student" => Some(UserType::Student),
            "child" => Some(UserType::Child),
            "adult" => Some(UserType::Adult),
            "therapist" => Some(UserType::Therapist),
            "moderator" => Some(UserType::Moderator),
            "admin" => Some(UserType::Admin),
            _ => None,
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, UserType::Moderator | UserType::Admin)
    }

    /// Staff roles are granted by an admin, never chosen at sign-up.
    pub fn self_registrable(&self) -> bool {
        !self.is_staff()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    NonBinary,
    PreferNotToSay,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::NonBinary => "non_binary",
            Gender::PreferNotToSay => "prefer_not_to_say",
            Gender::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "non_binary" => Some(Gender::NonBinary),
            "prefer_not_to_say" => Some(Gender::PreferNotToSay),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub user_type: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub country: String,
    #[serde(default)]
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub user: User,
    pub requires_parental_consent: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Username or email address
    #[serde(alias = "username", alias = "email")]
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub region: Option<String>,
    pub preferred_language: Option<String>,
    pub timezone: Option<String>,
    pub is_anonymous: Option<bool>,
    pub data_sharing_consent: Option<bool>,
    pub bio: Option<String>,
    pub university: Option<String>,
    pub field_of_study: Option<String>,
    pub academic_year: Option<String>,
    pub has_previous_therapy: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user: User,
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmergencyContactInput {
    pub name: String,
    pub relationship: String,
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default = "default_true")]
    pub can_be_contacted_during_crisis: bool,
}

fn default_true() -> bool {
    true
}

/// Whole years between `dob` and `today`.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> u32 {
    if dob > today {
        return 0;
    }
    let mut years = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_type_round_trip_and_roles() {
        for t in [
            UserType::Student,
            UserType::Child,
            UserType::Adult,
            UserType::Therapist,
            UserType::Moderator,
            UserType::Admin,
        ] {
            assert_eq!(UserType::from_str(t.as_str()), Some(t));
        }
        assert!(UserType::Moderator.is_staff());
        assert!(!UserType::Therapist.is_staff());
        assert!(!UserType::Admin.self_registrable());
        assert_eq!(UserType::from_str("superuser"), None);
    }

    #[test]
    fn age_counts_whole_years() {
        let dob = NaiveDate::from_ymd_opt(2010, 6, 15).unwrap();
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2023, 6, 14).unwrap()), 12);
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()), 13);
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2009, 1, 1).unwrap()), 0);
    }
}
