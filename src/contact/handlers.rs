use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};

use super::repo::{ContactInbox, ContactMessage, NewContactMessage};
use crate::{
    auth::services::{is_valid_email, normalize_email},
    error::AppError,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/contact", post(send_message))
}

pub async fn submit(inbox: &dyn ContactInbox, req: ContactRequest) -> Result<ContactMessage, AppError> {
    let name = req.name.trim();
    let message = req.message.trim();
    let email = normalize_email(&req.email);

    if name.is_empty() || message.is_empty() {
        return Err(AppError::BadRequest("Name and message are required".into()));
    }
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email".into()));
    }

    let saved = inbox
        .submit(NewContactMessage {
            name: name.to_string(),
            email,
            message: message.to_string(),
        })
        .await?;
    info!(message_id = saved.id, "contact message received");
    Ok(saved)
}

#[instrument(skip(state, body))]
pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactMessage>), AppError> {
    let saved = submit(state.inbox.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}
