use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::database::models::{ForumCategory, ForumReport};
use crate::error::AppResult;
use crate::forum::*;
use crate::state::AppState;

const FORUM_RECENT: i64 = 10;
const FORUM_POPULAR: i64 = 5;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/forum", get(forum_index))
        .route("/forum/posts", get(list_posts).post(create_post))
        .route("/forum/posts/:id", get(get_post))
        .route("/forum/posts/:id/replies", post(reply))
        .route("/forum/posts/:id/like", post(like_post))
        .route("/forum/replies/:id/like", post(like_reply))
        .route("/forum/reports", post(report))
}

fn forum(state: &AppState) -> ForumService {
    ForumService::new(state.pool(), state.config.clone())
}

fn viewer(user: &Option<AuthUser>) -> Viewer<'_> {
    match user {
        Some(user) => Viewer {
            user_id: Some(user.id()),
            is_staff: user.is_staff(),
        },
        None => Viewer::anonymous(),
    }
}

#[derive(Debug, Serialize)]
struct ForumIndex {
    categories: Vec<ForumCategory>,
    recent_posts: Vec<PostView>,
    popular_posts: Vec<PostView>,
}

async fn forum_index(State(state): State<AppState>) -> AppResult<Json<ForumIndex>> {
    let forum = forum(&state);
    Ok(Json(ForumIndex {
        categories: forum.categories().await?,
        recent_posts: forum.recent_posts(FORUM_RECENT).await?,
        popular_posts: forum.popular_posts(FORUM_POPULAR).await?,
    }))
}

async fn list_posts(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Query(query): Query<PostQuery>,
) -> AppResult<Json<Vec<PostView>>> {
    Ok(Json(forum(&state).list_posts(query, viewer(&user)).await?))
}

async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<PostInput>,
) -> AppResult<(StatusCode, Json<CreatedPost>)> {
    let created = forum(&state).create_post(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_post(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(post_id): Path<String>,
) -> AppResult<Json<PostDetail>> {
    Ok(Json(forum(&state).get_post(&post_id, viewer(&user)).await?))
}

async fn reply(
    State(state): State<AppState>,
    user: AuthUser,
    Path(post_id): Path<String>,
    Json(input): Json<ReplyInput>,
) -> AppResult<(StatusCode, Json<ReplyView>)> {
    let reply = forum(&state).reply(user.id(), &post_id, input).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

async fn like_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(post_id): Path<String>,
) -> AppResult<Json<Value>> {
    let like_count = forum(&state).like_post(user.id(), &post_id).await?;
    Ok(Json(json!({ "like_count": like_count })))
}

async fn like_reply(
    State(state): State<AppState>,
    user: AuthUser,
    Path(reply_id): Path<String>,
) -> AppResult<Json<Value>> {
    let like_count = forum(&state).like_reply(user.id(), &reply_id).await?;
    Ok(Json(json!({ "like_count": like_count })))
}

async fn report(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<ReportInput>,
) -> AppResult<(StatusCode, Json<ForumReport>)> {
    let report = forum(&state).report(user.id(), input).await?;
    Ok((StatusCode::CREATED, Json(report)))
}
