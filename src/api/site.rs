use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::site::*;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/services", get(services))
        .route("/contact", post(contact))
        .route("/quick-checkin", post(quick_checkin))
        .route("/crisis-support", get(crisis_support))
        .route("/dashboard", get(dashboard))
}

fn site(state: &AppState) -> SiteService {
    SiteService::new(state.pool(), state.config.clone())
}

async fn home(State(state): State<AppState>) -> AppResult<Json<HomePage>> {
    Ok(Json(site(&state).home().await?))
}

async fn about(State(state): State<AppState>) -> AppResult<Json<AboutPage>> {
    Ok(Json(site(&state).about().await?))
}

async fn services(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "services": site(&state).services() }))
}

async fn contact(State(state): State<AppState>, Json(form): Json<ContactForm>) -> AppResult<Json<Acknowledgement>> {
    Ok(Json(site(&state).contact(form)?))
}

async fn quick_checkin(
    State(state): State<AppState>,
    Json(form): Json<QuickCheckin>,
) -> AppResult<Json<Acknowledgement>> {
    Ok(Json(site(&state).quick_checkin(form)?))
}

/// Hotlines for the caller's country, or the default country when signed out.
async fn crisis_support(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> AppResult<Json<CrisisSupportPage>> {
    let country = user.as_ref().map(|u| u.user.country.as_str());
    Ok(Json(site(&state).crisis_support(country).await?))
}

async fn dashboard(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<UserDashboard>> {
    Ok(Json(site(&state).dashboard(user.id()).await?))
}
