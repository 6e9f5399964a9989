use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{SearchQuery, SearchResponse},
    repo_types::Doctor,
    services,
};
use crate::{error::AppError, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/doctors", get(list_doctors))
        .route("/doctors/search", get(search_doctors))
}

#[instrument(skip(state))]
pub async fn list_doctors(State(state): State<AppState>) -> Result<Json<Vec<Doctor>>, AppError> {
    Ok(Json(state.doctors.list_all().await?))
}

#[instrument(skip(state))]
pub async fn search_doctors(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    Ok(Json(services::search(state.doctors.as_ref(), &params.q).await?))
}
