use chrono::Utc;
use mental_health_platform::accounts::{AccountService, LoginRequest};
use mental_health_platform::admin::{AnalyticsService, UserAction, UserActionInput, Widget, WidgetData};
use mental_health_platform::audit::AuditLogger;
use mental_health_platform::auth::SessionStore;
use mental_health_platform::chat::{ChatService, StartSession};
use mental_health_platform::database::Database;
use mental_health_platform::error::AppError;
use mental_health_platform::mood::{MoodEntryInput, MoodTracker};

mod common;
use common::*;

#[tokio::test]
async fn test_snapshot_counts_todays_activity() {
    let db = setup_test_db().await;
    let amina = create_user(db.pool(), "amina", "student").await;
    let brian = create_user(db.pool(), "brian", "adult").await;
    create_admin(db.pool(), "root").await;

    let tracker = MoodTracker::new(db.pool().clone(), test_config());
    for (user, score) in [(&amina, 4), (&brian, 7)] {
        tracker
            .record_entry(
                &user.id,
                MoodEntryInput {
                    mood_score: score,
                    energy_level: 5,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }
    let chat = ChatService::new(db.pool().clone(), test_config());
    let session = chat.start_session(&amina.id, StartSession::default()).await.unwrap();
    chat.send_message(&amina.id, &session.id, "I can't go on like this")
        .await
        .unwrap();

    let analytics = AnalyticsService::new(db.pool().clone());
    let today = Utc::now().date_naive();
    let snapshot = analytics.snapshot(today).await.unwrap();
    assert_eq!(snapshot.total_users, 3);
    assert_eq!(snapshot.new_users, 3);
    assert_eq!(snapshot.total_mood_entries, 2);
    assert_eq!(snapshot.total_chat_sessions, 1);
    assert_eq!(snapshot.total_messages, 2);
    assert_eq!(snapshot.crisis_alerts, 1);
    assert_eq!(snapshot.average_mood_score, Some(5.5));
    assert_eq!(snapshot.users_by_country.0["Kenya"], 3);

    // a second run replaces the row
    let again = analytics.snapshot(today).await.unwrap();
    assert_eq!(again.total_users, 3);

    let dashboard = analytics.dashboard().await.unwrap();
    assert_eq!(dashboard.users.total, 3);
    assert_eq!(dashboard.crisis.active, 1);
    assert_eq!(dashboard.engagement_today.mood_entries, 2);

    match analytics.widget(Widget::MoodTrends).await.unwrap() {
        WidgetData::MoodTrends { days } => {
            assert_eq!(days.len(), 1);
            assert_eq!(days[0].average, 5.5);
        }
        other => panic!("unexpected widget data: {:?}", other),
    }
}

#[tokio::test]
async fn test_suspension_revokes_sessions() {
    use mental_health_platform::admin::UserAdmin;

    let db = setup_test_db().await;
    let admin = create_admin(db.pool(), "root").await;
    let member = create_user(db.pool(), "amina", "student").await;
    let accounts = AccountService::new(db.pool().clone(), test_config());
    let login = accounts
        .login(LoginRequest {
            identifier: "amina".to_string(),
            password: "correct-horse".to_string(),
        })
        .await
        .unwrap();

    let users = UserAdmin::new(db.pool().clone(), test_config());
    let missing_reason = users
        .apply(&admin.id, &member.id, UserAction::Suspend, UserActionInput::default())
        .await;
    assert!(matches!(missing_reason, Err(AppError::Validation(_))));

    let self_suspend = users
        .apply(
            &admin.id,
            &admin.id,
            UserAction::Suspend,
            UserActionInput {
                reason: "testing".to_string(),
            },
        )
        .await;
    assert!(matches!(self_suspend, Err(AppError::Validation(_))));

    let suspended = users
        .apply(
            &admin.id,
            &member.id,
            UserAction::Suspend,
            UserActionInput {
                reason: "Repeated harassment".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(suspended.account_suspended);

    let sessions = SessionStore::new(db.pool().clone(), 3600);
    assert!(sessions.resolve(&login.token).await.is_err());
    assert!(accounts
        .login(LoginRequest {
            identifier: "amina".to_string(),
            password: "correct-horse".to_string(),
        })
        .await
        .is_err());

    let activated = users
        .apply(&admin.id, &member.id, UserAction::Activate, UserActionInput::default())
        .await
        .unwrap();
    assert!(!activated.account_suspended);

    let trail = AuditLogger::new(db.pool().clone())
        .for_object("User", &member.id)
        .await
        .unwrap();
    let actions: Vec<&str> = trail.iter().map(|e| e.action.as_str()).collect();
    assert!(actions.contains(&"user.suspend"));
    assert!(actions.contains(&"user.activate"));
}

#[tokio::test]
async fn test_file_backed_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("platform.db").display());

    {
        let db = Database::new(&url).await.unwrap();
        db.run_migrations().await.unwrap();
        create_user(db.pool(), "amina", "student").await;
        db.pool().close().await;
    }

    let db = Database::new(&url).await.unwrap();
    db.run_migrations().await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
    assert!(db.is_healthy().await);
}
