use mental_health_platform::accounts::{AccountService, EmergencyContactInput, LoginRequest, ProfileUpdate};
use mental_health_platform::auth::SessionStore;
use mental_health_platform::error::AppError;
use mental_health_platform::notifications::{NotificationService, NotificationType};

mod common;
use common::*;

#[tokio::test]
async fn test_register_and_login() {
    let db = setup_test_db().await;
    let accounts = AccountService::new(db.pool().clone(), test_config());

    let registration = accounts
        .register(register_request("amina", "student"))
        .await
        .unwrap();
    assert_eq!(registration.user.user_type, "student");
    assert!(!registration.requires_parental_consent);

    let login = accounts
        .login(LoginRequest {
            identifier: "amina@example.com".to_string(),
            password: "correct-horse".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(login.user.id, registration.user.id);

    let sessions = SessionStore::new(db.pool().clone(), 3600);
    let resolved = sessions.resolve(&login.token).await.unwrap();
    assert_eq!(resolved.id, registration.user.id);

    accounts.logout(&login.token).await.unwrap();
    assert!(sessions.resolve(&login.token).await.is_err());
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let db = setup_test_db().await;
    let accounts = AccountService::new(db.pool().clone(), test_config());
    accounts.register(register_request("amina", "student")).await.unwrap();

    let mut again = register_request("amina2", "student");
    again.email = "amina@example.com".to_string();
    let result = accounts.register(again).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_staff_roles_cannot_self_register() {
    let db = setup_test_db().await;
    let accounts = AccountService::new(db.pool().clone(), test_config());

    let result = accounts.register(register_request("mallory", "admin")).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_password_confirmation_must_match() {
    let db = setup_test_db().await;
    let accounts = AccountService::new(db.pool().clone(), test_config());

    let mut request = register_request("brian", "adult");
    request.confirm_password = "something-else".to_string();
    assert!(matches!(
        accounts.register(request).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let db = setup_test_db().await;
    let accounts = AccountService::new(db.pool().clone(), test_config());
    create_user(db.pool(), "amina", "student").await;

    let result = accounts
        .login(LoginRequest {
            identifier: "amina".to_string(),
            password: "wrong-password".to_string(),
        })
        .await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn test_profile_update() {
    let db = setup_test_db().await;
    let accounts = AccountService::new(db.pool().clone(), test_config());
    let user = create_user(db.pool(), "amina", "student").await;

    let view = accounts
        .update_profile(
            &user.id,
            ProfileUpdate {
                university: Some("University of Nairobi".to_string()),
                has_previous_therapy: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(view.profile.university, "University of Nairobi");
    assert!(view.profile.has_previous_therapy);
}

#[tokio::test]
async fn test_emergency_contacts_belong_to_their_owner() {
    let db = setup_test_db().await;
    let accounts = AccountService::new(db.pool().clone(), test_config());
    let owner = create_user(db.pool(), "amina", "student").await;
    let other = create_user(db.pool(), "brian", "student").await;

    let contact = accounts
        .add_emergency_contact(
            &owner.id,
            EmergencyContactInput {
                name: "Wanjiru".to_string(),
                relationship: "Sister".to_string(),
                phone_number: "+254700000000".to_string(),
                email: String::new(),
                is_primary: true,
                can_be_contacted_during_crisis: true,
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        accounts.delete_emergency_contact(&other.id, &contact.id).await,
        Err(AppError::NotFound(_))
    ));
    accounts.delete_emergency_contact(&owner.id, &contact.id).await.unwrap();
    assert!(accounts.list_emergency_contacts(&owner.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_notifications_read_state() {
    let db = setup_test_db().await;
    let user = create_user(db.pool(), "amina", "student").await;
    let notifications = NotificationService::new(db.pool().clone());

    for title in ["One", "Two"] {
        notifications
            .notify(&user.id, NotificationType::System, title, "body", None)
            .await
            .unwrap();
    }
    assert_eq!(notifications.unread_count(&user.id).await.unwrap(), 2);

    let first = notifications.list(&user.id, true).await.unwrap().remove(0);
    notifications.mark_read(&user.id, &first.id).await.unwrap();
    assert_eq!(notifications.unread_count(&user.id).await.unwrap(), 1);

    assert_eq!(notifications.mark_all_read(&user.id).await.unwrap(), 1);
    assert_eq!(notifications.unread_count(&user.id).await.unwrap(), 0);
}
