use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::models::registrant::WebhookRecord;
use crate::services::notifier::Delivery;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::empty_success;

/// `POST /hooks/registrant-created`: invoked by the database when a row is
/// inserted elsewhere. The notification is sent before responding so the
/// webhook sender sees delivery failures.
pub async fn registrant_created(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    let record = WebhookRecord::from_payload(payload)
        .map_err(|e| AppError::MalformedPayload(e.to_string()))?;
    let source_id = record.id_text();
    let registrant = record.into_registrant().ok_or_else(|| {
        AppError::MalformedPayload("webhook record needs name and email".to_string())
    })?;

    tracing::debug!(source_id = ?source_id, "Webhook delivery received");

    let delivery = state
        .notifier
        .notify(&registrant)
        .await
        .map_err(|e| AppError::ExternalServiceError(e.to_string()))?;

    let message = match delivery {
        Delivery::Sent => "Notification sent",
        Delivery::Skipped => "Notification skipped",
    };
    Ok(empty_success(message).into_response())
}
