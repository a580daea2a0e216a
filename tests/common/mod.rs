#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use mental_health_platform::accounts::{AccountService, RegisterRequest};
use mental_health_platform::config::AppConfig;
use mental_health_platform::database::models::{TherapistProfile, User};
use mental_health_platform::database::Database;
use mental_health_platform::therapists::{TherapistDirectory, TherapistProfileInput};
use sqlx::SqlitePool;

/// Setup an in-memory SQLite database for testing
pub async fn setup_test_db() -> Database {
    Database::new_in_memory()
        .await
        .expect("Failed to create test database")
}

/// A migrated database in a file under `dir`, so several pooled
/// connections share it.
pub async fn setup_file_db(dir: &Path) -> Database {
    let url = format!("sqlite://{}", dir.join("platform.db").display());
    let db = Database::new(&url).await.expect("Failed to open file database");
    db.run_migrations().await.expect("Failed to run migrations");
    db
}

pub fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig::default())
}

pub fn config_with_message_cap(cap: i64) -> Arc<AppConfig> {
    let mut config = AppConfig::default();
    config.chat.max_messages_per_session = cap;
    Arc::new(config)
}

pub fn register_request(username: &str, user_type: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password: "correct-horse".to_string(),
        confirm_password: "correct-horse".to_string(),
        first_name: String::new(),
        last_name: String::new(),
        user_type: user_type.to_string(),
        date_of_birth: None,
        gender: None,
        country: "Kenya".to_string(),
        phone_number: String::new(),
    }
}

pub async fn create_user(pool: &SqlitePool, username: &str, user_type: &str) -> User {
    AccountService::new(pool.clone(), test_config())
        .register(register_request(username, user_type))
        .await
        .expect("Failed to register user")
        .user
}

pub async fn create_admin(pool: &SqlitePool, username: &str) -> User {
    AccountService::new(pool.clone(), test_config())
        .create_admin(username, &format!("{}@example.com", username), "correct-horse", "Kenya")
        .await
        .expect("Failed to create admin")
}

pub fn profile_input(license: &str) -> TherapistProfileInput {
    TherapistProfileInput {
        license_number: license.to_string(),
        specializations: vec!["cbt".to_string()],
        years_of_experience: 6,
        education: String::new(),
        certifications: String::new(),
        practice_name: String::new(),
        consultation_fee: Some(40.0),
        accepts_insurance: false,
        languages_spoken: vec!["English".to_string()],
        max_clients: None,
    }
}

/// A therapist account with a profile an admin has already verified.
pub async fn create_verified_therapist(pool: &SqlitePool, username: &str, admin: &User) -> (User, TherapistProfile) {
    let user = create_user(pool, username, "therapist").await;
    let directory = TherapistDirectory::new(pool.clone());
    let profile = directory
        .create_profile(&user.id, profile_input(&format!("LIC-{}", username)))
        .await
        .expect("Failed to create therapist profile");
    let profile = directory
        .verify(&admin.id, &profile.id)
        .await
        .expect("Failed to verify therapist");
    (user, profile)
}
