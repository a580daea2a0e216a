use chrono::{Duration, NaiveTime, Utc};
use mental_health_platform::appointments::{
    AppointmentAction, AppointmentQuery, AppointmentService, BookAppointment, ReviewInput, SessionNoteInput,
};
use mental_health_platform::error::AppError;
use mental_health_platform::therapists::{TherapistDirectory, TherapistSearch};

mod common;
use common::*;

fn booking(therapist_id: &str, days_ahead: i64, hour: u32, minutes: i64) -> BookAppointment {
    BookAppointment {
        therapist_id: therapist_id.to_string(),
        session_type: "video".to_string(),
        scheduled_date: Utc::now().date_naive() + Duration::days(days_ahead),
        scheduled_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        duration_minutes: Some(minutes),
        notes_for_therapist: String::new(),
    }
}

fn review(rating: i64) -> ReviewInput {
    ReviewInput {
        rating,
        professionalism: 5,
        effectiveness: 4,
        empathy: 5,
        would_recommend: true,
        review_text: "Very supportive".to_string(),
        is_anonymous: false,
    }
}

#[tokio::test]
async fn test_unverified_profiles_stay_out_of_directory() {
    let db = setup_test_db().await;
    let admin = create_admin(db.pool(), "root").await;
    let directory = TherapistDirectory::new(db.pool().clone());

    let pending = create_user(db.pool(), "drpending", "therapist").await;
    directory
        .create_profile(&pending.id, profile_input("LIC-PENDING"))
        .await
        .unwrap();
    let (_, verified) = create_verified_therapist(db.pool(), "drkamau", &admin).await;

    let listings = directory.search(TherapistSearch::default()).await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].profile.id, verified.id);

    let duplicate = directory
        .create_profile(&pending.id, profile_input("LIC-OTHER"))
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_overlapping_booking_conflicts() {
    let db = setup_test_db().await;
    let admin = create_admin(db.pool(), "root").await;
    let client = create_user(db.pool(), "amina", "student").await;
    let other = create_user(db.pool(), "brian", "student").await;
    let (_, profile) = create_verified_therapist(db.pool(), "drkamau", &admin).await;
    let appointments = AppointmentService::new(db.pool().clone());

    let first = appointments
        .book(&client.id, booking(&profile.id, 2, 10, 60))
        .await
        .unwrap();
    assert_eq!(first.status, "scheduled");
    assert_eq!(first.fee, 40.0);

    let clash = appointments.book(&other.id, booking(&profile.id, 2, 10, 30)).await;
    assert!(matches!(clash, Err(AppError::Conflict(_))));

    // back to back is fine
    appointments
        .book(&other.id, booking(&profile.id, 2, 11, 60))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_booking_rules() {
    let db = setup_test_db().await;
    let admin = create_admin(db.pool(), "root").await;
    let client = create_user(db.pool(), "amina", "student").await;
    let (therapist, profile) = create_verified_therapist(db.pool(), "drkamau", &admin).await;
    let appointments = AppointmentService::new(db.pool().clone());

    let past = appointments.book(&client.id, booking(&profile.id, -1, 10, 60)).await;
    assert!(matches!(past, Err(AppError::Validation(_))));

    let too_long = appointments.book(&client.id, booking(&profile.id, 1, 10, 240)).await;
    assert!(matches!(too_long, Err(AppError::Validation(_))));

    let past_midnight = appointments.book(&client.id, booking(&profile.id, 1, 23, 90)).await;
    assert!(matches!(past_midnight, Err(AppError::Validation(_))));

    let own = appointments.book(&therapist.id, booking(&profile.id, 1, 10, 60)).await;
    assert!(own.is_err());
}

#[tokio::test]
async fn test_appointment_lifecycle() {
    let db = setup_test_db().await;
    let admin = create_admin(db.pool(), "root").await;
    let client = create_user(db.pool(), "amina", "student").await;
    let outsider = create_user(db.pool(), "brian", "student").await;
    let (therapist, profile) = create_verified_therapist(db.pool(), "drkamau", &admin).await;
    let appointments = AppointmentService::new(db.pool().clone());

    let booked = appointments
        .book(&client.id, booking(&profile.id, 3, 9, 50))
        .await
        .unwrap();

    let by_client = appointments
        .transition(&client.id, false, &booked.id, AppointmentAction::Confirm)
        .await;
    assert!(matches!(by_client, Err(AppError::Forbidden(_))));

    let by_outsider = appointments.get_for(&outsider.id, false, &booked.id).await;
    assert!(matches!(by_outsider, Err(AppError::NotFound(_))));

    let early_review = appointments.review(&client.id, &booked.id, review(5)).await;
    assert!(matches!(early_review, Err(AppError::Validation(_))));

    let confirmed = appointments
        .transition(&therapist.id, false, &booked.id, AppointmentAction::Confirm)
        .await
        .unwrap();
    assert_eq!(confirmed.status, "confirmed");

    let completed = appointments
        .transition(&therapist.id, false, &booked.id, AppointmentAction::Complete)
        .await
        .unwrap();
    assert_eq!(completed.status, "completed");
    assert_eq!(completed.attended, Some(true));

    let cancel_after = appointments
        .transition(&client.id, false, &booked.id, AppointmentAction::Cancel)
        .await;
    assert!(matches!(cancel_after, Err(AppError::Validation(_))));

    let note = SessionNoteInput {
        presenting_issue: "Exam anxiety".to_string(),
        observations: "Engaged".to_string(),
        risk_assessment: "Low".to_string(),
        progress_notes: "Practised breathing".to_string(),
        follow_up_needed: false,
        follow_up_date: None,
    };
    assert!(matches!(
        appointments.add_note(&client.id, &booked.id, note.clone()).await,
        Err(AppError::Forbidden(_))
    ));
    appointments.add_note(&therapist.id, &booked.id, note.clone()).await.unwrap();
    assert!(matches!(
        appointments.add_note(&therapist.id, &booked.id, note).await,
        Err(AppError::Conflict(_))
    ));

    appointments.review(&client.id, &booked.id, review(4)).await.unwrap();
    assert!(matches!(
        appointments.review(&client.id, &booked.id, review(5)).await,
        Err(AppError::Conflict(_))
    ));

    let refreshed = TherapistDirectory::new(db.pool().clone())
        .get_profile(&profile.id)
        .await
        .unwrap();
    assert_eq!(refreshed.total_sessions, 1);
    assert_eq!(refreshed.average_rating, 4.0);

    let as_therapist = appointments
        .list(
            &therapist.id,
            &AppointmentQuery {
                upcoming: false,
                as_therapist: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(as_therapist.len(), 1);
}

#[tokio::test]
async fn test_availability_slots_restrict_bookings() {
    use chrono::Datelike;
    use mental_health_platform::therapists::AvailabilityInput;

    let db = setup_test_db().await;
    let admin = create_admin(db.pool(), "root").await;
    let client = create_user(db.pool(), "amina", "student").await;
    let (therapist, profile) = create_verified_therapist(db.pool(), "drkamau", &admin).await;
    let directory = TherapistDirectory::new(db.pool().clone());
    let appointments = AppointmentService::new(db.pool().clone());

    let day = Utc::now().date_naive() + Duration::days(4);
    directory
        .add_availability(
            &therapist.id,
            AvailabilityInput {
                day_of_week: day.weekday().num_days_from_monday() as i64,
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            },
        )
        .await
        .unwrap();

    let outside = appointments.book(&client.id, booking(&profile.id, 4, 14, 60)).await;
    assert!(matches!(outside, Err(AppError::Validation(_))));

    appointments
        .book(&client.id, booking(&profile.id, 4, 10, 60))
        .await
        .unwrap();
}
