use chrono::{Duration, Utc};
use mental_health_platform::chat::{ChatService, RateResponse, StartSession};
use mental_health_platform::crisis::{AlertAction, AlertStatus, AlertUpdate, CrisisService};
use mental_health_platform::error::AppError;
use mental_health_platform::gamification::GamificationService;
use mental_health_platform::mood::{MoodEntryInput, MoodTracker};
use mental_health_platform::recommendations::{MoodBand, RecommendationEngine};
use mental_health_platform::wellness::{CompleteActivity, JournalInput, WellnessService};

mod common;
use common::*;

const BOX_BREATHING: &str = "6a4f2c1e-0b1d-4c1a-9a51-1f3e8d2b7c01";

fn mood(score: i64) -> MoodEntryInput {
    MoodEntryInput {
        mood_score: score,
        energy_level: 5,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_mood_score_out_of_range_is_rejected() {
    let db = setup_test_db().await;
    let user = create_user(db.pool(), "amina", "student").await;
    let tracker = MoodTracker::new(db.pool().clone(), test_config());

    let result = tracker.record_entry(&user.id, mood(11)).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_one_mood_entry_per_day() {
    let db = setup_test_db().await;
    let user = create_user(db.pool(), "amina", "student").await;
    let tracker = MoodTracker::new(db.pool().clone(), test_config());

    let recorded = tracker.record_entry(&user.id, mood(6)).await.unwrap();
    assert_eq!(recorded.entry.mood_level, "neutral");
    assert!(recorded.new_achievements.iter().any(|a| a.slug == "first-step"));

    let again = tracker.record_entry(&user.id, mood(7)).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_week_of_entries_builds_streak_and_achievement() {
    let db = setup_test_db().await;
    let user = create_user(db.pool(), "amina", "student").await;
    let tracker = MoodTracker::new(db.pool().clone(), test_config());
    let today = Utc::now().date_naive();

    let mut earned = Vec::new();
    for offset in (0..7).rev() {
        let mut input = mood(7);
        input.entry_date = Some(today - Duration::days(offset));
        let recorded = tracker.record_entry(&user.id, input).await.unwrap();
        earned.extend(recorded.new_achievements.into_iter().map(|a| a.slug));
    }
    assert!(earned.contains(&"week-warrior".to_string()));

    let streak = GamificationService::new(db.pool().clone(), test_config())
        .streak(&user.id)
        .await
        .unwrap();
    assert_eq!(streak.current_mood_streak, 7);
    assert_eq!(streak.longest_mood_streak, 7);
    // 10 points per entry plus First Step and Week Warrior
    assert_eq!(streak.total_points, 70 + 10 + 50);
}

#[tokio::test]
async fn test_mood_notes_raise_crisis_alert() {
    let db = setup_test_db().await;
    let user = create_user(db.pool(), "amina", "student").await;
    let tracker = MoodTracker::new(db.pool().clone(), test_config());

    let mut input = mood(2);
    input.notes = "I feel hopeless about everything".to_string();
    let recorded = tracker.record_entry(&user.id, input).await.unwrap();
    assert!(recorded.crisis_detected);

    let alerts = CrisisService::new(db.pool().clone(), test_config())
        .alerts_for_user(&user.id)
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].mood_entry_id.as_deref(), Some(recorded.entry.id.as_str()));
}

#[tokio::test]
async fn test_mood_analysis_over_window() {
    let db = setup_test_db().await;
    let user = create_user(db.pool(), "amina", "student").await;
    let tracker = MoodTracker::new(db.pool().clone(), test_config());
    let today = Utc::now().date_naive();

    for (offset, score) in [(4, 3), (3, 4), (2, 6), (1, 7), (0, 8)] {
        let mut input = mood(score);
        input.entry_date = Some(today - Duration::days(offset));
        input.emotions = vec!["calm".to_string()];
        tracker.record_entry(&user.id, input).await.unwrap();
    }

    let pattern = tracker.analyze(&user.id, 30).await.unwrap();
    assert_eq!(pattern.average_mood_score, 5.6);
    assert_eq!(pattern.trend_direction, "improving");
}

#[tokio::test]
async fn test_crisis_keyword_in_chat_creates_alert() {
    let db = setup_test_db().await;
    let user = create_user(db.pool(), "amina", "student").await;
    let admin = create_admin(db.pool(), "root").await;
    let chat = ChatService::new(db.pool().clone(), test_config());

    let session = chat.start_session(&user.id, StartSession::default()).await.unwrap();
    let exchange = chat
        .send_message(&user.id, &session.id, "Sometimes I want to end my life")
        .await
        .unwrap();
    assert!(exchange.crisis_detected);
    assert!(exchange.bot_message.message_text.contains("Befrienders Kenya"));

    let crisis = CrisisService::new(db.pool().clone(), test_config());
    let alert_id = exchange.crisis_alert_id.unwrap();
    let alert = crisis.get_alert(&alert_id).await.unwrap();
    assert_eq!(alert.severity, "critical");
    assert_eq!(alert.status, AlertStatus::Detected.as_str());
    assert_eq!(alert.chat_session_id.as_deref(), Some(session.id.as_str()));

    let resolved = crisis
        .apply_action(&alert_id, &admin.id, AlertAction::Resolve, AlertUpdate::default())
        .await
        .unwrap();
    assert_eq!(resolved.status, "resolved");
    assert!(resolved.resolved_at.is_some());

    let again = crisis
        .apply_action(&alert_id, &admin.id, AlertAction::Escalate, AlertUpdate::default())
        .await;
    assert!(matches!(again, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_chat_session_is_private_and_can_end() {
    let db = setup_test_db().await;
    let owner = create_user(db.pool(), "amina", "student").await;
    let other = create_user(db.pool(), "brian", "student").await;
    let chat = ChatService::new(db.pool().clone(), test_config());

    let session = chat.start_session(&owner.id, StartSession::default()).await.unwrap();
    let exchange = chat
        .send_message(&owner.id, &session.id, "Exams are stressing me out")
        .await
        .unwrap();
    assert!(!exchange.crisis_detected);

    assert!(matches!(
        chat.send_message(&other.id, &session.id, "hello").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        chat.rate_response(
            &other.id,
            &exchange.bot_message.id,
            RateResponse {
                rating: 5,
                was_helpful: Some(true)
            }
        )
        .await,
        Err(AppError::NotFound(_))
    ));
    chat.rate_response(
        &owner.id,
        &exchange.bot_message.id,
        RateResponse {
            rating: 4,
            was_helpful: Some(true),
        },
    )
    .await
    .unwrap();

    let ended = chat.end_session(&owner.id, &session.id).await.unwrap();
    assert_eq!(ended.status, "ended");
    assert!(matches!(
        chat.send_message(&owner.id, &session.id, "still there?").await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_session_message_cap() {
    let db = setup_test_db().await;
    let user = create_user(db.pool(), "amina", "student").await;
    let chat = ChatService::new(db.pool().clone(), config_with_message_cap(4));

    let session = chat.start_session(&user.id, StartSession::default()).await.unwrap();
    chat.send_message(&user.id, &session.id, "Hello there").await.unwrap();
    chat.send_message(&user.id, &session.id, "I slept badly").await.unwrap();

    let overflow = chat.send_message(&user.id, &session.id, "One more?").await;
    assert!(matches!(overflow, Err(AppError::Validation(_))));

    let transcript = chat.get_session(&user.id, false, &session.id).await.unwrap();
    assert_eq!(transcript.session.total_messages, 4);
    assert_eq!(transcript.messages.len(), 4);
}

#[tokio::test]
async fn test_activity_completion_and_journal() {
    let db = setup_test_db().await;
    let user = create_user(db.pool(), "amina", "student").await;
    let wellness = WellnessService::new(db.pool().clone(), test_config());

    let completed = wellness
        .complete_activity(
            &user.id,
            BOX_BREATHING,
            CompleteActivity {
                duration_minutes: 5,
                mood_before: 4,
                mood_after: 6,
                notes: String::new(),
                was_helpful: Some(true),
            },
        )
        .await
        .unwrap();
    assert_eq!(completed.streak.current, 1);
    assert_eq!(wellness.activity_history(&user.id, 10).await.unwrap().len(), 1);

    let bad = wellness
        .complete_activity(
            &user.id,
            BOX_BREATHING,
            CompleteActivity {
                duration_minutes: 5,
                mood_before: 0,
                mood_after: 6,
                notes: String::new(),
                was_helpful: None,
            },
        )
        .await;
    assert!(matches!(bad, Err(AppError::Validation(_))));

    let saved = wellness
        .create_journal_entry(
            &user.id,
            JournalInput {
                title: "Tuesday".to_string(),
                content: "Went for a walk with friends".to_string(),
                prompt_used: String::new(),
                is_private: true,
                mood_score: Some(7),
            },
        )
        .await
        .unwrap();
    assert!(!saved.crisis_detected);
    wellness.delete_journal_entry(&user.id, &saved.entry.id).await.unwrap();
    assert!(wellness.list_journal_entries(&user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_recommendations_follow_mood_band() {
    let db = setup_test_db().await;
    let user = create_user(db.pool(), "amina", "student").await;
    let engine = RecommendationEngine::new(db.pool().clone(), test_config());

    assert!(matches!(engine.generate(&user.id).await, Err(AppError::Validation(_))));

    MoodTracker::new(db.pool().clone(), test_config())
        .record_entry(&user.id, mood(3))
        .await
        .unwrap();

    let generated = engine.generate(&user.id).await.unwrap();
    assert_eq!(generated.band, MoodBand::Low);
    assert_eq!(generated.recommendations.len(), 2);

    let listed = engine.list(&user.id).await.unwrap();
    assert_eq!(listed[0].recommendation_type, "crisis_resource");
    assert_eq!(listed[0].priority, 10);
    assert_eq!(listed[0].based_on_data.0["entries_considered"], 1);

    engine.dismiss(&user.id, &listed[0].id).await.unwrap();
    assert_eq!(engine.list(&user.id).await.unwrap().len(), 1);

    let other = create_user(db.pool(), "brian", "student").await;
    assert!(matches!(
        engine.mark_viewed(&other.id, &listed[1].id).await,
        Err(AppError::NotFound(_))
    ));
}
