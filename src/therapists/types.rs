use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::models::{AvailabilitySlot, TherapistProfile, TherapistReview};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialization {
    ClinicalPsychology,
    Counseling,
    Psychiatry,
    Cbt,
    ChildPsychology,
    Trauma,
    Addiction,
    FamilyTherapy,
}

impl Specialization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialization::ClinicalPsychology => "clinical_psychology",
            Specialization::Counseling => "counseling",
            Specialization::Psychiatry => "psychiatry",
            Specialization::Cbt => "cbt",
            Specialization::ChildPsychology => "child_psychology",
            Specialization::Trauma => "trauma",
            Specialization::Addiction => "addiction",
            Specialization::FamilyTherapy => "family_therapy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "clinical_psychology" => Some(Specialization::ClinicalPsychology),
            "counseling" => Some(Specialization::Counseling),
            "psychiatry" => Some(Specialization::Psychiatry),
            "cbt" => Some(Specialization::Cbt),
            "child_psychology" => Some(Specialization::ChildPsychology),
            "trauma" => Some(Specialization::Trauma),
            "addiction" => Some(Specialization::Addiction),
            "family_therapy" => Some(Specialization::FamilyTherapy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TherapistProfileInput {
    pub license_number: String,
    pub specializations: Vec<String>,
    pub years_of_experience: i64,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub certifications: String,
    #[serde(default)]
    pub practice_name: String,
    pub consultation_fee: Option<f64>,
    #[serde(default)]
    pub accepts_insurance: bool,
    #[serde(default)]
    pub languages_spoken: Vec<String>,
    pub max_clients: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TherapistSearch {
    pub specialization: Option<String>,
    pub language: Option<String>,
    #[serde(alias = "experience")]
    pub min_experience: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityInput {
    pub day_of_week: i64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityToggle {
    pub available: bool,
}

/// A directory row: the profile plus the therapist's display name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TherapistListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub profile: TherapistProfile,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TherapistDetail {
    pub therapist: TherapistListing,
    pub availability: Vec<AvailabilitySlot>,
    pub reviews: Vec<TherapistReview>,
}
