use serde_json::json;
use sqlx::SqlitePool;
use tracing::info;

use super::types::*;
use crate::audit::AuditLogger;
use crate::database::models::{AvailabilitySlot, TherapistProfile, TherapistReview};
use crate::database::{new_id, now};
use crate::error::AppError;
use crate::validation::{max_length, require_range, require_text};

const LISTING_SELECT: &str = r#"
    SELECT t.*,
           TRIM(CASE WHEN u.first_name = '' AND u.last_name = '' THEN u.username
                     ELSE u.first_name || ' ' || u.last_name END) AS display_name
    FROM therapist_profiles t JOIN users u ON u.id = t.user_id
"#;

/// Therapist profiles, the public directory and weekly availability.
pub struct TherapistDirectory {
    pool: SqlitePool,
}

impl TherapistDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the caller's professional profile. It stays out of the
    /// directory until an admin verifies it.
    pub async fn create_profile(
        &self,
        user_id: &str,
        input: TherapistProfileInput,
    ) -> Result<TherapistProfile, AppError> {
        let license = require_text("License number", &input.license_number, 100)?;
        require_range("Years of experience", input.years_of_experience, 0, 80)?;
        max_length("Practice name", &input.practice_name, 200)?;
        if input.specializations.is_empty() {
            return Err(AppError::validation("Select at least one specialization"));
        }
        let specializations = input
            .specializations
            .iter()
            .map(|s| {
                Specialization::from_str(s)
                    .map(|s| s.as_str().to_string())
                    .ok_or_else(|| AppError::validation(format!("Unknown specialization: {}", s)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(fee) = input.consultation_fee {
            if fee < 0.0 {
                return Err(AppError::validation("Consultation fee cannot be negative"));
            }
        }
        let max_clients = input.max_clients.unwrap_or(20);
        require_range("Max clients", max_clients, 1, 500)?;
        let languages: Vec<String> = input
            .languages_spoken
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        let existing: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM therapist_profiles WHERE user_id = ?)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        if existing {
            return Err(AppError::Conflict("You already have a therapist profile".to_string()));
        }
        let license_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM therapist_profiles WHERE license_number = ?)")
                .bind(&license)
                .fetch_one(&self.pool)
                .await?;
        if license_taken {
            return Err(AppError::Conflict("This license number is already registered".to_string()));
        }

        let id = new_id();
        let created_at = now();
        sqlx::query(
            r#"
            INSERT INTO therapist_profiles
            (id, user_id, license_number, specializations, years_of_experience, education, certifications,
             practice_name, consultation_fee, accepts_insurance, languages_spoken, max_clients, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&license)
        .bind(serde_json::to_string(&specializations)?)
        .bind(input.years_of_experience)
        .bind(input.education.trim())
        .bind(input.certifications.trim())
        .bind(input.practice_name.trim())
        .bind(input.consultation_fee)
        .bind(input.accepts_insurance)
        .bind(serde_json::to_string(&languages)?)
        .bind(max_clients)
        .bind(created_at)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        info!("Therapist profile {} created, awaiting verification", id);
        self.get_profile(&id).await
    }

    pub async fn get_profile(&self, therapist_id: &str) -> Result<TherapistProfile, AppError> {
        sqlx::query_as::<_, TherapistProfile>("SELECT * FROM therapist_profiles WHERE id = ?")
            .bind(therapist_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Therapist"))
    }

    pub async fn profile_for_user(&self, user_id: &str) -> Result<TherapistProfile, AppError> {
        sqlx::query_as::<_, TherapistProfile>("SELECT * FROM therapist_profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Therapist profile"))
    }

    /// Verified, available therapists, best rated and most experienced first.
    pub async fn search(&self, filters: TherapistSearch) -> Result<Vec<TherapistListing>, AppError> {
        let specialization = filters.specialization.as_deref().filter(|s| !s.is_empty());
        let language = filters.language.as_deref().filter(|l| !l.is_empty());
        let min_experience = filters.min_experience.unwrap_or(0);

        let sql = format!(
            r#"{}
            WHERE t.is_verified = 1 AND t.available_for_sessions = 1
              AND (? IS NULL OR EXISTS (SELECT 1 FROM json_each(t.specializations) WHERE value = ?))
              AND (? IS NULL OR EXISTS (SELECT 1 FROM json_each(t.languages_spoken) WHERE value = ? COLLATE NOCASE))
              AND t.years_of_experience >= ?
            ORDER BY t.average_rating DESC, t.years_of_experience DESC"#,
            LISTING_SELECT
        );
        let listings = sqlx::query_as::<_, TherapistListing>(&sql)
            .bind(specialization)
            .bind(specialization)
            .bind(language)
            .bind(language)
            .bind(min_experience)
            .fetch_all(&self.pool)
            .await?;
        Ok(listings)
    }

    /// Public detail page. Unverified profiles are not shown.
    pub async fn detail(&self, therapist_id: &str) -> Result<TherapistDetail, AppError> {
        let therapist = sqlx::query_as::<_, TherapistListing>(&format!(
            "{} WHERE t.id = ? AND t.is_verified = 1",
            LISTING_SELECT
        ))
        .bind(therapist_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Therapist"))?;

        let availability = self.availability(therapist_id).await?;
        let reviews = sqlx::query_as::<_, TherapistReview>(
            r#"
            SELECT * FROM therapist_reviews
            WHERE therapist_id = ? AND is_published = 1
            ORDER BY created_at DESC
            "#,
        )
        .bind(therapist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(TherapistDetail {
            therapist,
            availability,
            reviews,
        })
    }

    pub async fn availability(&self, therapist_id: &str) -> Result<Vec<AvailabilitySlot>, AppError> {
        let slots = sqlx::query_as::<_, AvailabilitySlot>(
            "SELECT * FROM therapist_availability WHERE therapist_id = ? ORDER BY day_of_week ASC, start_time ASC",
        )
        .bind(therapist_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }

    pub async fn add_availability(&self, user_id: &str, input: AvailabilityInput) -> Result<AvailabilitySlot, AppError> {
        let profile = self.profile_for_user(user_id).await?;
        require_range("Day of week", input.day_of_week, 0, 6)?;
        if input.start_time >= input.end_time {
            return Err(AppError::validation("Start time must be before end time"));
        }

        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM therapist_availability WHERE therapist_id = ? AND day_of_week = ? AND start_time = ?)",
        )
        .bind(&profile.id)
        .bind(input.day_of_week)
        .bind(input.start_time)
        .fetch_one(&self.pool)
        .await?;
        if duplicate {
            return Err(AppError::Conflict("A slot already starts at that time on this day".to_string()));
        }

        let id = new_id();
        sqlx::query(
            "INSERT INTO therapist_availability (id, therapist_id, day_of_week, start_time, end_time) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&profile.id)
        .bind(input.day_of_week)
        .bind(input.start_time)
        .bind(input.end_time)
        .execute(&self.pool)
        .await?;

        let slot = sqlx::query_as::<_, AvailabilitySlot>("SELECT * FROM therapist_availability WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.pool)
            .await?;
        Ok(slot)
    }

    pub async fn remove_availability(&self, user_id: &str, slot_id: &str) -> Result<(), AppError> {
        let profile = self.profile_for_user(user_id).await?;
        let result = sqlx::query("DELETE FROM therapist_availability WHERE id = ? AND therapist_id = ?")
            .bind(slot_id)
            .bind(&profile.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Availability slot"));
        }
        Ok(())
    }

    pub async fn verify(&self, admin_id: &str, therapist_id: &str) -> Result<TherapistProfile, AppError> {
        let profile = self.get_profile(therapist_id).await?;
        if profile.is_verified {
            return Ok(profile);
        }

        let verified_at = now();
        sqlx::query(
            "UPDATE therapist_profiles SET is_verified = 1, verified_at = ?, verified_by = ?, updated_at = ? WHERE id = ?",
        )
        .bind(verified_at)
        .bind(admin_id)
        .bind(verified_at)
        .bind(therapist_id)
        .execute(&self.pool)
        .await?;

        AuditLogger::new(self.pool.clone())
            .record(
                Some(admin_id),
                "therapist.verify",
                "TherapistProfile",
                therapist_id,
                json!({ "license_number": profile.license_number }),
            )
            .await?;

        info!("Therapist {} verified by {}", therapist_id, admin_id);
        self.get_profile(therapist_id).await
    }

    pub async fn set_available(
        &self,
        admin_id: &str,
        therapist_id: &str,
        available: bool,
    ) -> Result<TherapistProfile, AppError> {
        self.get_profile(therapist_id).await?;
        sqlx::query("UPDATE therapist_profiles SET available_for_sessions = ?, updated_at = ? WHERE id = ?")
            .bind(available)
            .bind(now())
            .bind(therapist_id)
            .execute(&self.pool)
            .await?;

        AuditLogger::new(self.pool.clone())
            .record(
                Some(admin_id),
                "therapist.set_available",
                "TherapistProfile",
                therapist_id,
                json!({ "available_for_sessions": available }),
            )
            .await?;
        self.get_profile(therapist_id).await
    }

    /// Recompute the rating from published reviews.
    pub async fn refresh_rating(&self, therapist_id: &str) -> Result<f64, AppError> {
        let average: Option<f64> = sqlx::query_scalar(
            "SELECT AVG(rating) FROM therapist_reviews WHERE therapist_id = ? AND is_published = 1",
        )
        .bind(therapist_id)
        .fetch_one(&self.pool)
        .await?;
        let rating = average.map(|a| (a * 100.0).round() / 100.0).unwrap_or(0.0);

        sqlx::query("UPDATE therapist_profiles SET average_rating = ?, updated_at = ? WHERE id = ?")
            .bind(rating)
            .bind(now())
            .bind(therapist_id)
            .execute(&self.pool)
            .await?;
        Ok(rating)
    }
}
