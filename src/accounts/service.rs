use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::types::*;
use crate::audit::AuditLogger;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::database::models::{EmergencyContact, User, UserProfile};
use crate::database::{new_id, now};
use crate::error::AppError;
use crate::validation::{is_valid_email, is_valid_username, max_length, require_text};

pub struct AccountService {
    pool: SqlitePool,
    config: Arc<AppConfig>,
}

/// Fields of a new `users` row after validation.
struct NewUser<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    user_type: UserType,
    date_of_birth: Option<chrono::NaiveDate>,
    gender: Option<Gender>,
    country: &'a str,
    phone_number: &'a str,
    verified: bool,
}

impl AccountService {
    pub fn new(pool: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { pool, config }
    }

    /// Register a self-service account (student, child, adult or therapist).
    pub async fn register(&self, request: RegisterRequest) -> Result<Registration, AppError> {
        let auth = &self.config.auth;

        let username = request.username.trim();
        if !is_valid_username(username) {
            return Err(AppError::validation(
                "Username must be 3-150 characters: letters, digits and @.+-_ only",
            ));
        }

        let email = request.email.trim();
        if !is_valid_email(email) {
            return Err(AppError::validation("Enter a valid email address"));
        }

        if request.password.chars().count() < auth.min_password_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                auth.min_password_length
            )));
        }
        if request.password != request.confirm_password {
            return Err(AppError::validation("Passwords do not match"));
        }

        let user_type = UserType::from_str(&request.user_type)
            .filter(UserType::self_registrable)
            .ok_or_else(|| AppError::validation(format!("Invalid user type: {}", request.user_type)))?;

        let gender = match request.gender.as_deref().filter(|g| !g.is_empty()) {
            Some(g) => Some(
                Gender::from_str(g).ok_or_else(|| AppError::validation(format!("Invalid gender: {}", g)))?,
            ),
            None => None,
        };

        let country = require_text("Country", &request.country, 100)?;
        max_length("Phone number", &request.phone_number, 20)?;
        max_length("First name", &request.first_name, 150)?;
        max_length("Last name", &request.last_name, 150)?;

        let today = Utc::now().date_naive();
        let mut requires_parental_consent = false;
        if let Some(dob) = request.date_of_birth {
            if dob > today {
                return Err(AppError::validation("Date of birth cannot be in the future"));
            }
            let age = age_on(dob, today);
            if age < auth.minimum_age {
                return Err(AppError::validation(format!(
                    "You must be at least {} years old to register",
                    auth.minimum_age
                )));
            }
            requires_parental_consent = age < auth.parental_consent_age;
        }

        self.ensure_unique(username, email).await?;

        let user = self
            .insert_user(NewUser {
                username,
                email,
                password: &request.password,
                first_name: request.first_name.trim(),
                last_name: request.last_name.trim(),
                user_type,
                date_of_birth: request.date_of_birth,
                gender,
                country: &country,
                phone_number: request.phone_number.trim(),
                verified: false,
            })
            .await?;

        AuditLogger::new(self.pool.clone())
            .record(
                Some(&user.id),
                "user.register",
                "User",
                &user.id,
                json!({ "user_type": user.user_type, "country": user.country }),
            )
            .await?;

        info!("Registered {} account {}", user.user_type, user.id);
        Ok(Registration {
            user,
            requires_parental_consent,
        })
    }

    /// Create a verified admin account (CLI bootstrap).
    pub async fn create_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
        country: &str,
    ) -> Result<User, AppError> {
        if !is_valid_username(username) || !is_valid_email(email) {
            return Err(AppError::validation("Invalid username or email"));
        }
        if password.chars().count() < self.config.auth.min_password_length {
            return Err(AppError::validation("Password too short"));
        }
        self.ensure_unique(username, email).await?;

        let user = self
            .insert_user(NewUser {
                username,
                email,
                password,
                first_name: "",
                last_name: "",
                user_type: UserType::Admin,
                date_of_birth: None,
                gender: None,
                country,
                phone_number: "",
                verified: true,
            })
            .await?;

        AuditLogger::new(self.pool.clone())
            .record(None, "user.create_admin", "User", &user.id, json!({ "username": username }))
            .await?;
        Ok(user)
    }

    async fn ensure_unique(&self, username: &str, email: &str) -> Result<(), AppError> {
        let username_taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        if username_taken {
            return Err(AppError::Conflict("This username is already taken".to_string()));
        }

        // the email column is declared COLLATE NOCASE
        let email_taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        if email_taken {
            return Err(AppError::Conflict("This email is already registered".to_string()));
        }
        Ok(())
    }

    async fn insert_user(&self, new_user: NewUser<'_>) -> Result<User, AppError> {
        let id = new_id();
        let created_at = now();
        let password_hash = hash_password(new_user.password)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users
            (id, username, email, password_hash, first_name, last_name, user_type, date_of_birth,
             gender, phone_number, country, is_verified, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(new_user.username)
        .bind(new_user.email)
        .bind(&password_hash)
        .bind(new_user.first_name)
        .bind(new_user.last_name)
        .bind(new_user.user_type.as_str())
        .bind(new_user.date_of_birth)
        .bind(new_user.gender.map(|g| g.as_str()))
        .bind(new_user.phone_number)
        .bind(new_user.country)
        .bind(new_user.verified)
        .bind(created_at)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_profiles (user_id, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(created_at)
            .bind(created_at)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO user_streaks (user_id, updated_at) VALUES (?, ?)")
            .bind(&id)
            .bind(created_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_user(&id).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// Authenticate by username or email and open a session.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let identifier = request.identifier.trim();
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ? OR email = ?")
            .bind(identifier)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;

        let user = match user {
            Some(user) if verify_password(&request.password, &user.password_hash) => user,
            _ => {
                warn!("Failed login attempt");
                return Err(AppError::Unauthorized("Invalid credentials".to_string()));
            }
        };

        if user.account_suspended || !user.is_active {
            return Err(AppError::forbidden("Account suspended"));
        }

        let login_at = now();
        sqlx::query("UPDATE users SET last_login = ?, last_active = ? WHERE id = ?")
            .bind(login_at)
            .bind(login_at)
            .bind(&user.id)
            .execute(&self.pool)
            .await?;

        let sessions = SessionStore::new(self.pool.clone(), self.config.auth.session_ttl_secs);
        let (token, expires_at) = sessions.create(&user.id).await?;

        info!("User {} logged in", user.id);
        Ok(LoginResponse {
            token,
            expires_at,
            user: self.get_user(&user.id).await?,
        })
    }

    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        SessionStore::new(self.pool.clone(), self.config.auth.session_ttl_secs)
            .revoke(token)
            .await
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<ProfileView, AppError> {
        let user = self.get_user(user_id).await?;
        let profile = sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(ProfileView { user, profile })
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<ProfileView, AppError> {
        if let Some(bio) = &update.bio {
            max_length("Bio", bio, 500)?;
        }
        if let Some(language) = &update.preferred_language {
            max_length("Preferred language", language, 10)?;
        }
        if let Some(phone) = &update.phone_number {
            max_length("Phone number", phone, 20)?;
        }
        for (field, value) in [
            ("University", &update.university),
            ("Field of study", &update.field_of_study),
        ] {
            if let Some(value) = value {
                max_length(field, value, 200)?;
            }
        }

        let updated_at = now();
        sqlx::query(
            r#"
            UPDATE users SET
                first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                phone_number = COALESCE(?, phone_number),
                region = COALESCE(?, region),
                preferred_language = COALESCE(?, preferred_language),
                timezone = COALESCE(?, timezone),
                is_anonymous = COALESCE(?, is_anonymous),
                data_sharing_consent = COALESCE(?, data_sharing_consent),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.phone_number)
        .bind(&update.region)
        .bind(&update.preferred_language)
        .bind(&update.timezone)
        .bind(update.is_anonymous)
        .bind(update.data_sharing_consent)
        .bind(updated_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            UPDATE user_profiles SET
                bio = COALESCE(?, bio),
                university = COALESCE(?, university),
                field_of_study = COALESCE(?, field_of_study),
                academic_year = COALESCE(?, academic_year),
                has_previous_therapy = COALESCE(?, has_previous_therapy),
                updated_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(&update.bio)
        .bind(&update.university)
        .bind(&update.field_of_study)
        .bind(&update.academic_year)
        .bind(update.has_previous_therapy)
        .bind(updated_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.get_profile(user_id).await
    }

    pub async fn add_emergency_contact(
        &self,
        user_id: &str,
        input: EmergencyContactInput,
    ) -> Result<EmergencyContact, AppError> {
        let name = require_text("Name", &input.name, 200)?;
        let relationship = require_text("Relationship", &input.relationship, 100)?;
        let phone_number = require_text("Phone number", &input.phone_number, 20)?;
        let email = input.email.trim();
        if !email.is_empty() && !is_valid_email(email) {
            return Err(AppError::validation("Enter a valid email address"));
        }

        if input.is_primary {
            sqlx::query("UPDATE emergency_contacts SET is_primary = 0 WHERE user_id = ?")
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        }

        let id = new_id();
        sqlx::query(
            r#"
            INSERT INTO emergency_contacts
            (id, user_id, name, relationship, phone_number, email, is_primary, can_be_contacted_during_crisis, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&name)
        .bind(&relationship)
        .bind(&phone_number)
        .bind(email)
        .bind(input.is_primary)
        .bind(input.can_be_contacted_during_crisis)
        .bind(now())
        .execute(&self.pool)
        .await?;

        let contact = sqlx::query_as::<_, EmergencyContact>("SELECT * FROM emergency_contacts WHERE id = ?")
            .bind(&id)
            .fetch_one(&self.pool)
            .await?;
        Ok(contact)
    }

    pub async fn list_emergency_contacts(&self, user_id: &str) -> Result<Vec<EmergencyContact>, AppError> {
        let contacts = sqlx::query_as::<_, EmergencyContact>(
            "SELECT * FROM emergency_contacts WHERE user_id = ? ORDER BY is_primary DESC, name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(contacts)
    }

    pub async fn delete_emergency_contact(&self, user_id: &str, contact_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM emergency_contacts WHERE id = ? AND user_id = ?")
            .bind(contact_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Emergency contact"));
        }
        Ok(())
    }
}
