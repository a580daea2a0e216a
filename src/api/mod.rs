//! HTTP surface
//!
//! JSON handlers grouped by domain. Handlers resolve the caller with the
//! `AuthUser` extractor, build the domain service they need from the shared
//! pool and map `AppError` onto a status code.

pub mod accounts;
pub mod admin;
pub mod care;
pub mod chat;
pub mod community;
pub mod library;
pub mod site;
pub mod wellbeing;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(site::routes())
        .merge(accounts::routes())
        .merge(chat::routes())
        .merge(wellbeing::routes())
        .merge(community::routes())
        .merge(care::routes())
        .merge(library::routes())
        .nest("/admin", admin::routes())
        .fallback(not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).into_inner())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.db.is_healthy().await;
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "status": if database { "healthy" } else { "degraded" },
            "service": "mental-health-platform",
            "database": database,
            "timestamp": chrono::Utc::now(),
        })),
    )
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
