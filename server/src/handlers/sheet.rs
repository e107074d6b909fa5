use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::models::registrant::RegistrationRequest;
use crate::state::AppState;
use crate::utils::error::AppError;

const SAVED_MESSAGE: &str = "Submission saved";
const STATUS_LINE: &str = "Registrant intake is running.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetReply {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_link: Option<String>,
}

/// `POST /sheet/submit`: spreadsheet-backed intake. Replies use the
/// `{status, message, chatLink}` shape the static form expects.
///
/// The form posts here in `no-cors` mode, which downgrades the content type
/// to `text/plain`, so the body is parsed as JSON whatever the header says.
pub async fn sheet_submit(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match serde_json::from_slice::<RegistrationRequest>(&body) {
        Ok(request) => state.sheet_intake.submit(request).await.map_err(AppError::from),
        Err(e) => Err(AppError::MalformedPayload(e.to_string())),
    };

    match result {
        Ok(_) => Json(SheetReply {
            status: "success",
            message: SAVED_MESSAGE.to_string(),
            chat_link: Some(state.chat_link.to_string()),
        })
        .into_response(),
        Err(e) => {
            let status = e.status_code();
            let message = match e.details() {
                Some(details) => format!("{e}: {details}"),
                None => e.to_string(),
            };
            let reply = SheetReply {
                status: "error",
                message,
                chat_link: None,
            };
            (status, Json(reply)).into_response()
        }
    }
}

/// `GET /sheet/submit`: plain-text liveness line.
pub async fn sheet_status() -> &'static str {
    STATUS_LINE
}
