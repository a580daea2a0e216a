use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::admin::*;
use crate::audit::AuditLogger;
use crate::auth::AuthUser;
use crate::crisis::{AlertAction, AlertStatus, AlertUpdate, CrisisService};
use crate::database::models::{
    AuditLogEntry, CrisisAlert, ForumReport, PlatformAnalytics, Resource, TherapistProfile, User,
};
use crate::database::now;
use crate::error::{AppError, AppResult};
use crate::forum::{
    ForumService, ModerationNote, PostAction, PostView, ReplyAction, ReplyView, ReportStatus, ReviewReport,
};
use crate::resources::{ResourceAction, ResourceInput, ResourceLibrary};
use crate::state::AppState;
use crate::therapists::{AvailabilityToggle, TherapistDirectory};

const DEFAULT_AUDIT_LIMIT: i64 = 100;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/stats/:widget", get(widget))
        .route("/crisis-alerts", get(list_alerts))
        .route("/crisis-alerts/:id", get(get_alert))
        .route("/crisis-alerts/:id/:action", post(alert_action))
        .route("/forum/posts/:id/:action", post(moderate_post))
        .route("/forum/replies", get(held_replies))
        .route("/forum/replies/:id/:action", post(moderate_reply))
        .route("/forum/reports", get(list_reports))
        .route("/forum/reports/:id/review", post(review_report))
        .route("/users/:id/:action", post(user_action))
        .route("/therapists/:id/verify", post(verify_therapist))
        .route("/therapists/:id/availability", post(therapist_availability))
        .route("/resources", post(create_resource))
        .route("/resources/:id/:action", post(resource_action))
        .route("/analytics/snapshot", post(snapshot))
        .route("/audit-logs", get(audit_logs))
}

async fn dashboard(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<StaffDashboard>> {
    user.require_staff()?;
    Ok(Json(AnalyticsService::new(state.pool()).dashboard().await?))
}

async fn widget(
    State(state): State<AppState>,
    user: AuthUser,
    Path(widget): Path<String>,
) -> AppResult<Json<WidgetData>> {
    user.require_staff()?;
    let widget = Widget::from_str(&widget).ok_or_else(|| AppError::not_found("Widget"))?;
    Ok(Json(AnalyticsService::new(state.pool()).widget(widget).await?))
}

#[derive(Debug, Default, Deserialize)]
struct StatusFilter {
    status: Option<String>,
}

async fn list_alerts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filter): Query<StatusFilter>,
) -> AppResult<Json<Vec<CrisisAlert>>> {
    user.require_staff()?;
    let status = match filter.status.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(
            AlertStatus::from_str(s).ok_or_else(|| AppError::validation(format!("Unknown alert status: {}", s)))?,
        ),
        None => None,
    };
    let alerts = CrisisService::new(state.pool(), state.config.clone())
        .list_alerts(status)
        .await?;
    Ok(Json(alerts))
}

async fn get_alert(
    State(state): State<AppState>,
    user: AuthUser,
    Path(alert_id): Path<String>,
) -> AppResult<Json<CrisisAlert>> {
    user.require_staff()?;
    let alert = CrisisService::new(state.pool(), state.config.clone())
        .get_alert(&alert_id)
        .await?;
    Ok(Json(alert))
}

async fn alert_action(
    State(state): State<AppState>,
    user: AuthUser,
    Path((alert_id, action)): Path<(String, String)>,
    body: Option<Json<AlertUpdate>>,
) -> AppResult<Json<CrisisAlert>> {
    user.require_staff()?;
    let action = AlertAction::from_str(&action)
        .ok_or_else(|| AppError::validation(format!("Unknown alert action: {}", action)))?;
    let update = body.map(|Json(b)| b).unwrap_or_default();
    let alert = CrisisService::new(state.pool(), state.config.clone())
        .apply_action(&alert_id, user.id(), action, update)
        .await?;
    Ok(Json(alert))
}

async fn moderate_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path((post_id, action)): Path<(String, String)>,
    body: Option<Json<ModerationNote>>,
) -> AppResult<Json<PostView>> {
    user.require_staff()?;
    let action = PostAction::from_str(&action)
        .ok_or_else(|| AppError::validation(format!("Unknown moderation action: {}", action)))?;
    let note = body.map(|Json(b)| b).unwrap_or_default();
    let post = ForumService::new(state.pool(), state.config.clone())
        .moderate_post(user.id(), &post_id, action, note)
        .await?;
    Ok(Json(post))
}

async fn held_replies(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<Vec<ReplyView>>> {
    user.require_staff()?;
    let replies = ForumService::new(state.pool(), state.config.clone())
        .held_replies()
        .await?;
    Ok(Json(replies))
}

async fn moderate_reply(
    State(state): State<AppState>,
    user: AuthUser,
    Path((reply_id, action)): Path<(String, String)>,
    body: Option<Json<ModerationNote>>,
) -> AppResult<Json<ReplyView>> {
    user.require_staff()?;
    let action = ReplyAction::from_str(&action)
        .ok_or_else(|| AppError::validation(format!("Unknown moderation action: {}", action)))?;
    let note = body.map(|Json(b)| b).unwrap_or_default();
    let reply = ForumService::new(state.pool(), state.config.clone())
        .moderate_reply(user.id(), &reply_id, action, note)
        .await?;
    Ok(Json(reply))
}

async fn list_reports(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filter): Query<StatusFilter>,
) -> AppResult<Json<Vec<ForumReport>>> {
    user.require_staff()?;
    let status = match filter.status.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(
            ReportStatus::from_str(s).ok_or_else(|| AppError::validation(format!("Unknown report status: {}", s)))?,
        ),
        None => None,
    };
    let reports = ForumService::new(state.pool(), state.config.clone())
        .list_reports(status)
        .await?;
    Ok(Json(reports))
}

async fn review_report(
    State(state): State<AppState>,
    user: AuthUser,
    Path(report_id): Path<String>,
    Json(review): Json<ReviewReport>,
) -> AppResult<Json<ForumReport>> {
    user.require_staff()?;
    let report = ForumService::new(state.pool(), state.config.clone())
        .review_report(user.id(), &report_id, review)
        .await?;
    Ok(Json(report))
}

async fn user_action(
    State(state): State<AppState>,
    user: AuthUser,
    Path((user_id, action)): Path<(String, String)>,
    body: Option<Json<UserActionInput>>,
) -> AppResult<Json<User>> {
    user.require_admin()?;
    let action = UserAction::from_str(&action)
        .ok_or_else(|| AppError::validation(format!("Unknown user action: {}", action)))?;
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let updated = UserAdmin::new(state.pool(), state.config.clone())
        .apply(user.id(), &user_id, action, input)
        .await?;
    Ok(Json(updated))
}

async fn verify_therapist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(therapist_id): Path<String>,
) -> AppResult<Json<TherapistProfile>> {
    user.require_admin()?;
    let profile = TherapistDirectory::new(state.pool())
        .verify(user.id(), &therapist_id)
        .await?;
    Ok(Json(profile))
}

async fn therapist_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(therapist_id): Path<String>,
    Json(toggle): Json<AvailabilityToggle>,
) -> AppResult<Json<TherapistProfile>> {
    user.require_admin()?;
    let profile = TherapistDirectory::new(state.pool())
        .set_available(user.id(), &therapist_id, toggle.available)
        .await?;
    Ok(Json(profile))
}

async fn create_resource(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<ResourceInput>,
) -> AppResult<(StatusCode, Json<Resource>)> {
    user.require_staff()?;
    let resource = ResourceLibrary::new(state.pool()).create(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(resource)))
}

async fn resource_action(
    State(state): State<AppState>,
    user: AuthUser,
    Path((resource_id, action)): Path<(String, String)>,
) -> AppResult<Json<Resource>> {
    user.require_staff()?;
    let action = ResourceAction::from_str(&action)
        .ok_or_else(|| AppError::validation(format!("Unknown resource action: {}", action)))?;
    let resource = ResourceLibrary::new(state.pool())
        .apply_action(user.id(), &resource_id, action)
        .await?;
    Ok(Json(resource))
}

async fn snapshot(
    State(state): State<AppState>,
    user: AuthUser,
    body: Option<Json<SnapshotRequest>>,
) -> AppResult<Json<PlatformAnalytics>> {
    user.require_admin()?;
    let date = body
        .and_then(|Json(b)| b.date)
        .unwrap_or_else(|| now().date_naive());
    Ok(Json(AnalyticsService::new(state.pool()).snapshot(date).await?))
}

#[derive(Debug, Default, Deserialize)]
struct AuditQuery {
    limit: Option<i64>,
}

async fn audit_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<Vec<AuditLogEntry>>> {
    user.require_admin()?;
    let limit = query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, 1000);
    Ok(Json(AuditLogger::new(state.pool()).recent(limit).await?))
}
