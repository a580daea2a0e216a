use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};

use crate::auth::AuthUser;
use crate::database::models::Resource;
use crate::error::AppResult;
use crate::resources::*;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/resources", get(search))
        .route("/resources/:id", get(get_resource))
        .route("/resources/:id/interact", post(interact))
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> AppResult<Json<Vec<Resource>>> {
    Ok(Json(ResourceLibrary::new(state.pool()).search(&query).await?))
}

async fn get_resource(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(resource_id): Path<String>,
) -> AppResult<Json<Resource>> {
    let reader = user.as_ref().map(|u| u.id());
    Ok(Json(ResourceLibrary::new(state.pool()).get(&resource_id, reader).await?))
}

async fn interact(
    State(state): State<AppState>,
    user: AuthUser,
    Path(resource_id): Path<String>,
    Json(input): Json<InteractionInput>,
) -> AppResult<Json<InteractionResult>> {
    let result = ResourceLibrary::new(state.pool())
        .interact(user.id(), &resource_id, input)
        .await?;
    Ok(Json(result))
}
