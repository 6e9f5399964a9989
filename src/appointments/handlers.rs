use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{BookRequest, Receipt},
    repo_types::Appointment,
    services,
};
use crate::{
    auth::extractors::AuthContext,
    error::AppError,
    scheduling::SlotDate,
    state::AppState,
};

pub fn patient_routes() -> Router<AppState> {
    Router::new()
        .route("/appointments", get(list_appointments).post(book_appointment))
        .route("/appointments/:id", get(get_receipt).delete(cancel_appointment))
}

#[instrument(skip(state, body))]
pub async fn book_appointment(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(body): Json<BookRequest>,
) -> Result<(StatusCode, HeaderMap, Json<Appointment>), AppError> {
    let appointment = services::book(&state, &ctx, body, SlotDate::today()).await?;

    let mut headers = HeaderMap::new();
    let location = format!("/api/v1/appointments/{}", appointment.id)
        .parse::<HeaderValue>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("location header: {e}")))?;
    headers.insert(axum::http::header::LOCATION, location);

    Ok((StatusCode::CREATED, headers, Json(appointment)))
}

#[instrument(skip(state))]
pub async fn list_appointments(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<Vec<Receipt>>, AppError> {
    Ok(Json(services::list_mine(&state, &ctx).await?))
}

#[instrument(skip(state))]
pub async fn get_receipt(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<i64>,
) -> Result<Json<Receipt>, AppError> {
    Ok(Json(services::receipt(&state, &ctx, id).await?))
}

#[instrument(skip(state))]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    services::cancel(&state, &ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
