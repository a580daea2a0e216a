//! Check-then-write rules under parallel requests on a shared file database.

use chrono::{Duration, NaiveTime, Utc};
use mental_health_platform::appointments::{AppointmentService, BookAppointment};
use mental_health_platform::chat::{ChatService, StartSession};
use mental_health_platform::error::AppError;
use mental_health_platform::gamification::GamificationService;

mod common;
use common::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_bookings_take_one_slot() {
    let dir = tempfile::tempdir().unwrap();
    let db = setup_file_db(dir.path()).await;
    let admin = create_admin(db.pool(), "root").await;
    let (_, profile) = create_verified_therapist(db.pool(), "drkamau", &admin).await;

    let mut clients = Vec::new();
    for i in 0..6 {
        clients.push(create_user(db.pool(), &format!("client{}", i), "student").await);
    }

    let date = Utc::now().date_naive() + Duration::days(2);
    let mut handles = Vec::new();
    for client in clients {
        let pool = db.pool().clone();
        let therapist_id = profile.id.clone();
        handles.push(tokio::spawn(async move {
            AppointmentService::new(pool)
                .book(
                    &client.id,
                    BookAppointment {
                        therapist_id,
                        session_type: "video".to_string(),
                        scheduled_date: date,
                        scheduled_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                        duration_minutes: Some(60),
                        notes_for_therapist: String::new(),
                    },
                )
                .await
        }));
    }

    let mut booked = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => booked += 1,
            Err(AppError::Conflict(_)) => {}
            Err(other) => panic!("unexpected booking error: {:?}", other),
        }
    }
    assert_eq!(booked, 1);

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM counseling_appointments WHERE therapist_id = ?")
        .bind(&profile.id)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(stored, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_sends_respect_message_cap() {
    let dir = tempfile::tempdir().unwrap();
    let db = setup_file_db(dir.path()).await;
    let user = create_user(db.pool(), "amina", "student").await;
    let config = config_with_message_cap(4);

    let session = ChatService::new(db.pool().clone(), config.clone())
        .start_session(&user.id, StartSession::default())
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..6 {
        let chat = ChatService::new(db.pool().clone(), config.clone());
        let user_id = user.id.clone();
        let session_id = session.id.clone();
        handles.push(tokio::spawn(async move {
            chat.send_message(&user_id, &session_id, &format!("Exams are stressing me out ({})", i))
                .await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(AppError::Validation(_)) => {}
            Err(other) => panic!("unexpected send error: {:?}", other),
        }
    }
    assert_eq!(accepted, 2);

    let seqs: Vec<i64> = sqlx::query_scalar("SELECT seq FROM chat_messages WHERE session_id = ? ORDER BY seq")
        .bind(&session.id)
        .fetch_all(db.pool())
        .await
        .unwrap();
    assert_eq!(seqs, vec![0, 1, 2, 3]);

    let total: i64 = sqlx::query_scalar("SELECT total_messages FROM chat_sessions WHERE id = ?")
        .bind(&session.id)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(total, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_end_awards_points_once() {
    let dir = tempfile::tempdir().unwrap();
    let db = setup_file_db(dir.path()).await;
    let user = create_user(db.pool(), "amina", "student").await;
    let config = test_config();

    let session = ChatService::new(db.pool().clone(), config.clone())
        .start_session(&user.id, StartSession::default())
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let chat = ChatService::new(db.pool().clone(), config.clone());
        let user_id = user.id.clone();
        let session_id = session.id.clone();
        handles.push(tokio::spawn(async move { chat.end_session(&user_id, &session_id).await }));
    }

    let mut ended = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ended += 1,
            Err(AppError::Validation(_)) => {}
            Err(other) => panic!("unexpected end error: {:?}", other),
        }
    }
    assert_eq!(ended, 1);

    let streak = GamificationService::new(db.pool().clone(), config.clone())
        .streak(&user.id)
        .await
        .unwrap();
    assert_eq!(streak.total_points, config.gamification.points_per_chat_session);
}
