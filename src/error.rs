use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::scheduling::slots::SlotError;

/// Errors surfaced to API clients.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error("No doctor available for given symptoms.")]
    NoMatchingDoctor,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Slot(SlotError::PastDate) => StatusCode::BAD_REQUEST,
            AppError::Slot(SlotError::SlotConflict) => StatusCode::CONFLICT,
            AppError::NoMatchingDoctor => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(e) => {
                error!(error = %format!("{e:#}"), "internal error");
                "Internal server error".to_string()
            }
            other => {
                warn!(%status, error = %other, "request rejected");
                other.to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        assert_eq!(AppError::from(SlotError::PastDate).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::from(SlotError::SlotConflict).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::DuplicateEmail.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NoMatchingDoctor.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(
            AppError::from(SlotError::SlotConflict).to_string(),
            "Slot already booked. Please choose another."
        );
        assert_eq!(AppError::NotFound("Appointment").to_string(), "Appointment not found");
    }

    #[test]
    fn internal_errors_hide_details() {
        let res = AppError::Internal(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
