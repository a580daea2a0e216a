use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::database::models::{ActivityLog, JournalEntry, MoodEntry, MoodPattern, Recommendation, WellnessActivity};
use crate::error::AppResult;
use crate::gamification::{GamificationService, GamificationSummary};
use crate::mood::{MoodEntryInput, MoodQuery, MoodTracker, RecordedMood};
use crate::recommendations::{GeneratedRecommendations, RecommendationEngine};
use crate::state::AppState;
use crate::wellness::{CompleteActivity, CompletedActivity, JournalInput, SavedJournalEntry, WellnessService};

const DEFAULT_ANALYSIS_DAYS: i64 = 30;
const DEFAULT_HISTORY_LIMIT: i64 = 50;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/mood", get(list_moods).post(record_mood))
        .route("/mood/analysis", get(analyze_mood))
        .route("/mood/:id", get(get_mood))
        .route("/activities", get(list_activities))
        .route("/activities/history", get(activity_history))
        .route("/activities/:id", get(get_activity))
        .route("/activities/:id/complete", post(complete_activity))
        .route("/journal", get(list_journal).post(create_journal))
        .route("/journal/:id", delete(delete_journal))
        .route("/achievements", get(achievements))
        .route("/recommendations", get(list_recommendations))
        .route("/recommendations/generate", post(generate_recommendations))
        .route("/recommendations/:id/view", post(view_recommendation))
        .route("/recommendations/:id/dismiss", post(dismiss_recommendation))
}

fn mood(state: &AppState) -> MoodTracker {
    MoodTracker::new(state.pool(), state.config.clone())
}

fn wellness(state: &AppState) -> WellnessService {
    WellnessService::new(state.pool(), state.config.clone())
}

fn recommendations(state: &AppState) -> RecommendationEngine {
    RecommendationEngine::new(state.pool(), state.config.clone())
}

async fn list_moods(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MoodQuery>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    Ok(Json(mood(&state).list_entries(user.id(), query).await?))
}

async fn record_mood(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<MoodEntryInput>,
) -> AppResult<(StatusCode, Json<RecordedMood>)> {
    let recorded = mood(&state).record_entry(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

async fn get_mood(
    State(state): State<AppState>,
    user: AuthUser,
    Path(entry_id): Path<String>,
) -> AppResult<Json<MoodEntry>> {
    Ok(Json(mood(&state).get_entry(user.id(), &entry_id).await?))
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisQuery {
    days: Option<i64>,
}

async fn analyze_mood(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AnalysisQuery>,
) -> AppResult<Json<MoodPattern>> {
    let days = query.days.unwrap_or(DEFAULT_ANALYSIS_DAYS);
    Ok(Json(mood(&state).analyze(user.id(), days).await?))
}

#[derive(Debug, Default, Deserialize)]
struct ActivityFilter {
    #[serde(rename = "type")]
    activity_type: Option<String>,
}

async fn list_activities(
    State(state): State<AppState>,
    Query(filter): Query<ActivityFilter>,
) -> AppResult<Json<Vec<WellnessActivity>>> {
    let activities = wellness(&state)
        .list_activities(filter.activity_type.as_deref())
        .await?;
    Ok(Json(activities))
}

async fn get_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<String>,
) -> AppResult<Json<WellnessActivity>> {
    Ok(Json(wellness(&state).get_activity(&activity_id).await?))
}

#[derive(Debug, Default, Deserialize)]
struct HistoryQuery {
    limit: Option<i64>,
}

async fn activity_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<ActivityLog>>> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, 500);
    Ok(Json(wellness(&state).activity_history(user.id(), limit).await?))
}

async fn complete_activity(
    State(state): State<AppState>,
    user: AuthUser,
    Path(activity_id): Path<String>,
    Json(input): Json<CompleteActivity>,
) -> AppResult<(StatusCode, Json<CompletedActivity>)> {
    let completed = wellness(&state)
        .complete_activity(user.id(), &activity_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(completed)))
}

async fn list_journal(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<Vec<JournalEntry>>> {
    Ok(Json(wellness(&state).list_journal_entries(user.id()).await?))
}

async fn create_journal(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<JournalInput>,
) -> AppResult<(StatusCode, Json<SavedJournalEntry>)> {
    let saved = wellness(&state).create_journal_entry(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn delete_journal(
    State(state): State<AppState>,
    user: AuthUser,
    Path(entry_id): Path<String>,
) -> AppResult<StatusCode> {
    wellness(&state).delete_journal_entry(user.id(), &entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn achievements(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<GamificationSummary>> {
    let summary = GamificationService::new(state.pool(), state.config.clone())
        .summary(user.id())
        .await?;
    Ok(Json(summary))
}

async fn list_recommendations(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<Recommendation>>> {
    Ok(Json(recommendations(&state).list(user.id()).await?))
}

async fn generate_recommendations(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<(StatusCode, Json<GeneratedRecommendations>)> {
    let generated = recommendations(&state).generate(user.id()).await?;
    Ok((StatusCode::CREATED, Json(generated)))
}

async fn view_recommendation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(recommendation_id): Path<String>,
) -> AppResult<Json<Recommendation>> {
    Ok(Json(recommendations(&state).mark_viewed(user.id(), &recommendation_id).await?))
}

async fn dismiss_recommendation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(recommendation_id): Path<String>,
) -> AppResult<Json<Recommendation>> {
    Ok(Json(recommendations(&state).dismiss(user.id(), &recommendation_id).await?))
}
