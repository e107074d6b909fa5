use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::registrant::{RegistrationRequest, RegistrationSummary};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

const REGISTERED_MESSAGE: &str = "Registration completed";

/// `POST /api/submit`: table-backed intake. Only the id and name of the
/// stored record are echoed back.
pub async fn submit_registration(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let stored = state.table_intake.submit(request).await?;

    Ok(success(RegistrationSummary::from(&stored), REGISTERED_MESSAGE).into_response())
}
