use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{Dashboard, DashboardQuery},
    services,
};
use crate::{
    appointments::{repo_types::Appointment, services::review},
    auth::extractors::AdminContext,
    doctors::{dto::AddDoctorRequest, repo_types::Doctor, services as doctor_services},
    error::AppError,
    scheduling::{ReviewAction, SlotDate},
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/dashboard", get(get_dashboard))
        .route("/admin/doctors", post(add_doctor))
        .route("/admin/doctors/:id", delete(delete_doctor))
        .route("/admin/appointments/:id/:action", post(review_appointment))
        .route("/admin/export", get(export_appointments))
}

#[instrument(skip(state, _admin))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    _admin: AdminContext,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, AppError> {
    let date = match params.date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<SlotDate>()
                .map_err(|_| AppError::BadRequest("Invalid date, expected YYYY-MM-DD".into()))?,
        ),
    };
    Ok(Json(services::dashboard(&state, date).await?))
}

#[instrument(skip(state, body))]
pub async fn add_doctor(
    State(state): State<AppState>,
    AdminContext(admin): AdminContext,
    Json(body): Json<AddDoctorRequest>,
) -> Result<(StatusCode, Json<Doctor>), AppError> {
    let doctor = doctor_services::add_doctor(state.doctors.as_ref(), body).await?;
    info!(admin_id = %admin.user_id, doctor_id = doctor.id, "admin added doctor");
    Ok((StatusCode::CREATED, Json(doctor)))
}

#[instrument(skip(state))]
pub async fn delete_doctor(
    State(state): State<AppState>,
    AdminContext(admin): AdminContext,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    doctor_services::delete_doctor(state.doctors.as_ref(), state.appointments.as_ref(), id).await?;
    info!(admin_id = %admin.user_id, doctor_id = id, "admin deleted doctor");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn review_appointment(
    State(state): State<AppState>,
    AdminContext(admin): AdminContext,
    Path((id, action)): Path<(i64, String)>,
) -> Result<Json<Appointment>, AppError> {
    let action: ReviewAction = action
        .parse()
        .map_err(|e: anyhow::Error| AppError::BadRequest(e.to_string()))?;
    let updated = review(&state, id, action).await?;
    info!(admin_id = %admin.user_id, appointment_id = id, ?action, "admin reviewed appointment");
    Ok(Json(updated))
}

#[instrument(skip(state, _admin))]
pub async fn export_appointments(
    State(state): State<AppState>,
    _admin: AdminContext,
) -> Result<impl IntoResponse, AppError> {
    let csv = services::export_csv(&state).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment;filename=appointments.csv"),
        ],
        csv,
    ))
}
