use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};

use crate::appointments::*;
use crate::auth::AuthUser;
use crate::database::models::{Appointment, AvailabilitySlot, SessionNote, TherapistProfile, TherapistReview};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::therapists::*;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/find-therapist", get(find_therapist))
        .route("/therapists/profile", get(own_profile).post(create_profile))
        .route("/therapists/availability", post(add_availability))
        .route("/therapists/availability/:id", delete(remove_availability))
        .route("/therapists/:id", get(therapist_detail))
        .route("/appointments", get(list_appointments).post(book_appointment))
        .route("/appointments/:id", get(get_appointment))
        .route("/appointments/:id/review", post(review_appointment))
        .route("/appointments/:id/notes", post(add_session_note))
        .route("/appointments/:id/:action", post(transition_appointment))
}

fn directory(state: &AppState) -> TherapistDirectory {
    TherapistDirectory::new(state.pool())
}

fn appointments(state: &AppState) -> AppointmentService {
    AppointmentService::new(state.pool())
}

async fn find_therapist(
    State(state): State<AppState>,
    Query(search): Query<TherapistSearch>,
) -> AppResult<Json<Vec<TherapistListing>>> {
    Ok(Json(directory(&state).search(search).await?))
}

async fn therapist_detail(
    State(state): State<AppState>,
    Path(therapist_id): Path<String>,
) -> AppResult<Json<TherapistDetail>> {
    Ok(Json(directory(&state).detail(&therapist_id).await?))
}

async fn own_profile(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<TherapistProfile>> {
    user.require_therapist()?;
    Ok(Json(directory(&state).profile_for_user(user.id()).await?))
}

async fn create_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<TherapistProfileInput>,
) -> AppResult<(StatusCode, Json<TherapistProfile>)> {
    user.require_therapist()?;
    let profile = directory(&state).create_profile(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn add_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<AvailabilityInput>,
) -> AppResult<(StatusCode, Json<AvailabilitySlot>)> {
    user.require_therapist()?;
    let slot = directory(&state).add_availability(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

async fn remove_availability(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slot_id): Path<String>,
) -> AppResult<StatusCode> {
    user.require_therapist()?;
    directory(&state).remove_availability(user.id(), &slot_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_appointments(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AppointmentQuery>,
) -> AppResult<Json<Vec<Appointment>>> {
    Ok(Json(appointments(&state).list(user.id(), &query).await?))
}

async fn book_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<BookAppointment>,
) -> AppResult<(StatusCode, Json<Appointment>)> {
    let appointment = appointments(&state).book(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn get_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(appointment_id): Path<String>,
) -> AppResult<Json<Appointment>> {
    let appointment = appointments(&state)
        .get_for(user.id(), user.is_admin(), &appointment_id)
        .await?;
    Ok(Json(appointment))
}

async fn transition_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((appointment_id, action)): Path<(String, String)>,
) -> AppResult<Json<Appointment>> {
    let action = AppointmentAction::from_str(&action)
        .ok_or_else(|| AppError::validation(format!("Unknown appointment action: {}", action)))?;
    let appointment = appointments(&state)
        .transition(user.id(), user.is_admin(), &appointment_id, action)
        .await?;
    Ok(Json(appointment))
}

async fn add_session_note(
    State(state): State<AppState>,
    user: AuthUser,
    Path(appointment_id): Path<String>,
    Json(input): Json<SessionNoteInput>,
) -> AppResult<(StatusCode, Json<SessionNote>)> {
    let note = appointments(&state)
        .add_note(user.id(), &appointment_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn review_appointment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(appointment_id): Path<String>,
    Json(input): Json<ReviewInput>,
) -> AppResult<(StatusCode, Json<TherapistReview>)> {
    let review = appointments(&state)
        .review(user.id(), &appointment_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}
