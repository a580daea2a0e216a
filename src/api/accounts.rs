use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::accounts::*;
use crate::auth::AuthUser;
use crate::database::models::{EmergencyContact, Notification};
use crate::error::AppResult;
use crate::notifications::NotificationService;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile", get(get_profile).put(update_profile))
        .route(
            "/profile/emergency-contacts",
            get(list_emergency_contacts).post(add_emergency_contact),
        )
        .route("/profile/emergency-contacts/:id", delete(delete_emergency_contact))
        .route("/notifications", get(list_notifications))
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/:id/read", post(mark_read))
}

fn accounts(state: &AppState) -> AccountService {
    AccountService::new(state.pool(), state.config.clone())
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Registration>)> {
    let registration = accounts(&state).register(request).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> AppResult<Json<LoginResponse>> {
    Ok(Json(accounts(&state).login(request).await?))
}

async fn logout(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    accounts(&state).logout(&user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_profile(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<ProfileView>> {
    Ok(Json(accounts(&state).get_profile(user.id()).await?))
}

async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<ProfileView>> {
    Ok(Json(accounts(&state).update_profile(user.id(), update).await?))
}

async fn list_emergency_contacts(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<EmergencyContact>>> {
    Ok(Json(accounts(&state).list_emergency_contacts(user.id()).await?))
}

async fn add_emergency_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<EmergencyContactInput>,
) -> AppResult<(StatusCode, Json<EmergencyContact>)> {
    let contact = accounts(&state).add_emergency_contact(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn delete_emergency_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Path(contact_id): Path<String>,
) -> AppResult<StatusCode> {
    accounts(&state).delete_emergency_contact(user.id(), &contact_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
struct NotificationQuery {
    #[serde(default)]
    unread_only: bool,
}

async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<NotificationQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = NotificationService::new(state.pool())
        .list(user.id(), query.unread_only)
        .await?;
    Ok(Json(notifications))
}

async fn mark_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(notification_id): Path<String>,
) -> AppResult<StatusCode> {
    NotificationService::new(state.pool())
        .mark_read(user.id(), &notification_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn mark_all_read(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<Value>> {
    let updated = NotificationService::new(state.pool()).mark_all_read(user.id()).await?;
    Ok(Json(json!({ "marked_read": updated })))
}
