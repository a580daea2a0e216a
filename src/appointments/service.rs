use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime};
use serde_json::json;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use super::types::*;
use crate::audit::AuditLogger;
use crate::database::models::{Appointment, SessionNote, TherapistProfile, TherapistReview};
use crate::database::{new_id, now};
use crate::error::AppError;
use crate::notifications::{NotificationService, NotificationType};
use crate::therapists::TherapistDirectory;
use crate::validation::{max_length, require_choice, require_range, require_text};

const DEFAULT_DURATION: i64 = 60;
const MIN_DURATION: i64 = 15;
const MAX_DURATION: i64 = 180;

/// End of a session that starts at `start`, or `None` when it would run
/// past midnight.
fn session_end(start: NaiveTime, duration_minutes: i64) -> Option<NaiveTime> {
    let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(duration_minutes));
    if wrapped != 0 || end == NaiveTime::MIN {
        None
    } else {
        Some(end)
    }
}

fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && b_start < a_end
}

/// Counseling appointments between clients and verified therapists.
pub struct AppointmentService {
    pool: SqlitePool,
}

impl AppointmentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn directory(&self) -> TherapistDirectory {
        TherapistDirectory::new(self.pool.clone())
    }

    pub async fn book(&self, client_id: &str, input: BookAppointment) -> Result<Appointment, AppError> {
        let session_type = require_choice("session type", &input.session_type, SessionType::from_str)?;
        let duration = input.duration_minutes.unwrap_or(DEFAULT_DURATION);
        require_range("Duration", duration, MIN_DURATION, MAX_DURATION)?;
        max_length("Notes for therapist", &input.notes_for_therapist, 2000)?;

        let therapist = self.directory().get_profile(&input.therapist_id).await?;
        if !therapist.is_verified || !therapist.available_for_sessions {
            return Err(AppError::validation("This therapist is not accepting appointments"));
        }
        if therapist.user_id == client_id {
            return Err(AppError::validation("You cannot book an appointment with yourself"));
        }

        let starts_at = NaiveDateTime::new(input.scheduled_date, input.scheduled_time);
        if starts_at < now().naive_utc() {
            return Err(AppError::validation("Appointments cannot be booked in the past"));
        }
        let start = input.scheduled_time;
        let end = session_end(start, duration)
            .ok_or_else(|| AppError::validation("Appointments must end on the day they start"))?;

        self.check_availability(&therapist, input.scheduled_date.weekday().num_days_from_monday(), start, end)
            .await?;

        // the insert comes first so the transaction holds the write lock
        // while the overlap check runs
        let mut tx = self.pool.begin().await?;
        let id = new_id();
        let created_at = now();
        sqlx::query(
            r#"
            INSERT INTO counseling_appointments
            (id, client_id, therapist_id, session_type, scheduled_date, scheduled_time, duration_minutes,
             status, notes_for_therapist, fee, payment_status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?)
            "#,
        )
        .bind(&id)
        .bind(client_id)
        .bind(&therapist.id)
        .bind(session_type.as_str())
        .bind(input.scheduled_date)
        .bind(start)
        .bind(duration)
        .bind(AppointmentStatus::Scheduled.as_str())
        .bind(input.notes_for_therapist.trim())
        .bind(therapist.consultation_fee.unwrap_or(0.0))
        .bind(created_at)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        Self::check_conflicts(&mut tx, &id, &therapist.id, &input, start, end).await?;

        NotificationService::notify_with(
            &mut tx,
            &therapist.user_id,
            NotificationType::Appointment,
            "New appointment request",
            &format!(
                "A {} session was requested for {} at {}.",
                session_type.as_str(),
                input.scheduled_date,
                start.format("%H:%M")
            ),
            Some("/appointments"),
        )
        .await?;
        tx.commit().await?;

        info!("Appointment {} booked with therapist {}", id, therapist.id);
        self.get(&id).await
    }

    async fn check_availability(
        &self,
        therapist: &TherapistProfile,
        weekday: u32,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<(), AppError> {
        let slots = self.directory().availability(&therapist.id).await?;
        if slots.is_empty() {
            return Ok(());
        }

        let fits = slots
            .iter()
            .filter(|slot| slot.is_available && slot.day_of_week == i64::from(weekday))
            .any(|slot| slot.start_time <= start && end <= slot.end_time);
        if fits {
            Ok(())
        } else {
            Err(AppError::validation("The therapist is not available at that time"))
        }
    }

    /// Overlap check against the therapist's other live appointments that
    /// day, run inside the booking transaction.
    async fn check_conflicts(
        conn: &mut SqliteConnection,
        appointment_id: &str,
        therapist_id: &str,
        input: &BookAppointment,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<(), AppError> {
        let booked = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM counseling_appointments
            WHERE therapist_id = ? AND scheduled_date = ? AND id != ?
              AND status IN ('scheduled', 'confirmed', 'in_progress')
            "#,
        )
        .bind(therapist_id)
        .bind(input.scheduled_date)
        .bind(appointment_id)
        .fetch_all(&mut *conn)
        .await?;

        let clash = booked.iter().any(|other| match session_end(other.scheduled_time, other.duration_minutes) {
            Some(other_end) => overlaps(start, end, other.scheduled_time, other_end),
            // runs to the end of the day
            None => other.scheduled_time < end,
        });
        if clash {
            return Err(AppError::Conflict("The therapist already has an appointment at that time".to_string()));
        }
        Ok(())
    }

    pub async fn get(&self, appointment_id: &str) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM counseling_appointments WHERE id = ?")
            .bind(appointment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("Appointment"))
    }

    /// An appointment as seen by one of its parties or an admin.
    pub async fn get_for(&self, user_id: &str, is_admin: bool, appointment_id: &str) -> Result<Appointment, AppError> {
        let appointment = self.get(appointment_id).await?;
        self.party(user_id, is_admin, &appointment).await?;
        Ok(appointment)
    }

    /// The caller's appointments, as client or as therapist.
    pub async fn list(&self, user_id: &str, query: &AppointmentQuery) -> Result<Vec<Appointment>, AppError> {
        let today = now().date_naive();
        if query.as_therapist {
            let profile = self.directory().profile_for_user(user_id).await?;
            let rows = sqlx::query_as::<_, Appointment>(
                r#"
                SELECT * FROM counseling_appointments
                WHERE therapist_id = ? AND (? = 0 OR (scheduled_date >= ? AND status IN ('scheduled', 'confirmed')))
                ORDER BY scheduled_date ASC, scheduled_time ASC
                "#,
            )
            .bind(&profile.id)
            .bind(query.upcoming)
            .bind(today)
            .fetch_all(&self.pool)
            .await?;
            return Ok(rows);
        }

        let rows = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM counseling_appointments
            WHERE client_id = ? AND (? = 0 OR (scheduled_date >= ? AND status IN ('scheduled', 'confirmed')))
            ORDER BY scheduled_date DESC, scheduled_time DESC
            "#,
        )
        .bind(user_id)
        .bind(query.upcoming)
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Soonest scheduled or confirmed appointments for a client.
    pub async fn upcoming(&self, client_id: &str, limit: i64) -> Result<Vec<Appointment>, AppError> {
        let rows = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM counseling_appointments
            WHERE client_id = ? AND scheduled_date >= ? AND status IN ('scheduled', 'confirmed')
            ORDER BY scheduled_date ASC, scheduled_time ASC
            LIMIT ?
            "#,
        )
        .bind(client_id)
        .bind(now().date_naive())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Resolve how the caller relates to the appointment. Outsiders get
    /// `NotFound` so appointment ids do not leak.
    async fn party(
        &self,
        user_id: &str,
        is_admin: bool,
        appointment: &Appointment,
    ) -> Result<(Party, TherapistProfile), AppError> {
        let therapist = self.directory().get_profile(&appointment.therapist_id).await?;
        let party = if therapist.user_id == user_id {
            Party::Therapist
        } else if appointment.client_id == user_id {
            Party::Client
        } else if is_admin {
            Party::Admin
        } else {
            return Err(AppError::not_found("Appointment"));
        };
        Ok((party, therapist))
    }

    pub async fn transition(
        &self,
        user_id: &str,
        is_admin: bool,
        appointment_id: &str,
        action: AppointmentAction,
    ) -> Result<Appointment, AppError> {
        let appointment = self.get(appointment_id).await?;
        let (party, therapist) = self.party(user_id, is_admin, &appointment).await?;
        if !action.allowed_for(party) {
            return Err(AppError::forbidden(format!(
                "You cannot {} this appointment",
                action.as_str()
            )));
        }

        let from = AppointmentStatus::from_str(&appointment.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown appointment status {}", appointment.status)))?;
        let to = action.transition(from).ok_or_else(|| {
            AppError::validation(format!(
                "Cannot {} an appointment that is {}",
                action.as_str(),
                from.as_str()
            ))
        })?;

        let attended = match to {
            AppointmentStatus::Completed => Some(true),
            AppointmentStatus::NoShow => Some(false),
            _ => appointment.attended,
        };
        sqlx::query("UPDATE counseling_appointments SET status = ?, attended = ?, updated_at = ? WHERE id = ?")
            .bind(to.as_str())
            .bind(attended)
            .bind(now())
            .bind(appointment_id)
            .execute(&self.pool)
            .await?;

        if to == AppointmentStatus::Completed {
            sqlx::query("UPDATE therapist_profiles SET total_sessions = total_sessions + 1, updated_at = ? WHERE id = ?")
                .bind(now())
                .bind(&therapist.id)
                .execute(&self.pool)
                .await?;
        }

        let counterpart = match party {
            Party::Client => therapist.user_id.as_str(),
            Party::Therapist | Party::Admin => appointment.client_id.as_str(),
        };
        NotificationService::new(self.pool.clone())
            .notify(
                counterpart,
                NotificationType::Appointment,
                "Appointment updated",
                &format!(
                    "Your appointment on {} at {} is now {}.",
                    appointment.scheduled_date,
                    appointment.scheduled_time.format("%H:%M"),
                    to.as_str().replace('_', " ")
                ),
                Some("/appointments"),
            )
            .await?;

        AuditLogger::new(self.pool.clone())
            .record(
                Some(user_id),
                &format!("appointment.{}", action.as_str()),
                "CounselingAppointment",
                appointment_id,
                json!({ "from": from.as_str(), "to": to.as_str() }),
            )
            .await?;

        info!("Appointment {} moved {} -> {}", appointment_id, from.as_str(), to.as_str());
        self.get(appointment_id).await
    }

    pub async fn add_note(
        &self,
        user_id: &str,
        appointment_id: &str,
        input: SessionNoteInput,
    ) -> Result<SessionNote, AppError> {
        let appointment = self.get(appointment_id).await?;
        let (party, therapist) = self.party(user_id, false, &appointment).await?;
        if party != Party::Therapist {
            return Err(AppError::forbidden("Only the appointment's therapist can write session notes"));
        }
        if !matches!(appointment.status.as_str(), "in_progress" | "completed") {
            return Err(AppError::validation("Notes can only be written once the session has started"));
        }

        let presenting_issue = require_text("Presenting issue", &input.presenting_issue, 5000)?;
        let observations = require_text("Observations", &input.observations, 10_000)?;
        let risk_assessment = require_text("Risk assessment", &input.risk_assessment, 5000)?;
        let progress_notes = require_text("Progress notes", &input.progress_notes, 10_000)?;
        if input.follow_up_needed && input.follow_up_date.is_none() {
            return Err(AppError::validation("A follow-up date is required when follow-up is needed"));
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM session_notes WHERE appointment_id = ?)")
            .bind(appointment_id)
            .fetch_one(&self.pool)
            .await?;
        if exists {
            return Err(AppError::Conflict("Notes for this session already exist".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO session_notes
            (appointment_id, therapist_id, presenting_issue, observations, risk_assessment, progress_notes,
             follow_up_needed, follow_up_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(appointment_id)
        .bind(&therapist.id)
        .bind(&presenting_issue)
        .bind(&observations)
        .bind(&risk_assessment)
        .bind(&progress_notes)
        .bind(input.follow_up_needed)
        .bind(input.follow_up_date)
        .bind(now())
        .execute(&self.pool)
        .await?;

        let note = sqlx::query_as::<_, SessionNote>("SELECT * FROM session_notes WHERE appointment_id = ?")
            .bind(appointment_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(note)
    }

    pub async fn review(
        &self,
        client_id: &str,
        appointment_id: &str,
        input: ReviewInput,
    ) -> Result<TherapistReview, AppError> {
        let appointment = self.get(appointment_id).await?;
        if appointment.client_id != client_id {
            return Err(AppError::not_found("Appointment"));
        }
        if appointment.status != AppointmentStatus::Completed.as_str() {
            return Err(AppError::validation("Only completed sessions can be reviewed"));
        }
        for (field, value) in [
            ("Rating", input.rating),
            ("Professionalism", input.professionalism),
            ("Effectiveness", input.effectiveness),
            ("Empathy", input.empathy),
        ] {
            require_range(field, value, 1, 5)?;
        }
        max_length("Review", &input.review_text, 5000)?;

        let reviewed: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM therapist_reviews WHERE appointment_id = ?)")
            .bind(appointment_id)
            .fetch_one(&self.pool)
            .await?;
        if reviewed {
            return Err(AppError::Conflict("You have already reviewed this session".to_string()));
        }

        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO therapist_reviews
            (id, appointment_id, client_id, therapist_id, rating, professionalism, effectiveness, empathy,
             would_recommend, review_text, is_anonymous, is_published, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(&id)
        .bind(appointment_id)
        .bind(client_id)
        .bind(&appointment.therapist_id)
        .bind(input.rating)
        .bind(input.professionalism)
        .bind(input.effectiveness)
        .bind(input.empathy)
        .bind(input.would_recommend)
        .bind(input.review_text.trim())
        .bind(input.is_anonymous)
        .bind(now())
        .execute(&self.pool)
        .await?;

        let rating = self.directory().refresh_rating(&appointment.therapist_id).await?;
        if input.rating <= 2 {
            warn!("Low rating ({}) for therapist {}", input.rating, appointment.therapist_id);
        }
        info!(
            "Review {} recorded, therapist {} now rated {:.2}",
            id, appointment.therapist_id, rating
        );

        let review = sqlx::query_as::<_, TherapistReview>("SELECT * FROM therapist_reviews WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.pool)
            .await?;
        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn sessions_may_not_cross_midnight() {
        assert_eq!(session_end(t(9, 0), 60), Some(t(10, 0)));
        assert_eq!(session_end(t(23, 0), 60), None);
        assert_eq!(session_end(t(23, 30), 90), None);
    }

    #[test]
    fn back_to_back_sessions_do_not_overlap() {
        assert!(!overlaps(t(9, 0), t(10, 0), t(10, 0), t(11, 0)));
        assert!(overlaps(t(9, 0), t(10, 0), t(9, 30), t(10, 30)));
        assert!(overlaps(t(9, 0), t(12, 0), t(10, 0), t(10, 30)));
    }
}
