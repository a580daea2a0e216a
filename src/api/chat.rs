use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};

use crate::auth::AuthUser;
use crate::chat::*;
use crate::database::models::ChatSession;
use crate::error::AppResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chat", get(list_sessions))
        .route("/chat/new", post(start_session))
        .route("/chat/messages/:id/rate", post(rate_response))
        .route("/chat/:id", get(get_session))
        .route("/chat/:id/send", post(send_message))
        .route("/chat/:id/end", post(end_session))
}

fn chat(state: &AppState) -> ChatService {
    ChatService::new(state.pool(), state.config.clone())
}

async fn list_sessions(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<Vec<ChatSession>>> {
    Ok(Json(chat(&state).list_sessions(user.id()).await?))
}

async fn start_session(
    State(state): State<AppState>,
    user: AuthUser,
    body: Option<Json<StartSession>>,
) -> AppResult<(StatusCode, Json<ChatSession>)> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let session = chat(&state).start_session(user.id(), request).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn get_session(
    State(state): State<AppState>,
    user: AuthUser,
    Path(session_id): Path<String>,
) -> AppResult<Json<SessionTranscript>> {
    let transcript = chat(&state)
        .get_session(user.id(), user.is_staff(), &session_id)
        .await?;
    Ok(Json(transcript))
}

async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Path(session_id): Path<String>,
    Json(body): Json<SendMessage>,
) -> AppResult<Json<ChatExchange>> {
    let exchange = chat(&state)
        .send_message(user.id(), &session_id, &body.message)
        .await?;
    Ok(Json(exchange))
}

async fn end_session(
    State(state): State<AppState>,
    user: AuthUser,
    Path(session_id): Path<String>,
) -> AppResult<Json<ChatSession>> {
    Ok(Json(chat(&state).end_session(user.id(), &session_id).await?))
}

async fn rate_response(
    State(state): State<AppState>,
    user: AuthUser,
    Path(message_id): Path<String>,
    Json(body): Json<RateResponse>,
) -> AppResult<StatusCode> {
    chat(&state).rate_response(user.id(), &message_id, body).await?;
    Ok(StatusCode::NO_CONTENT)
}
