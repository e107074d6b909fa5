use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::services::intake::IntakeError;
use crate::services::validator::ValidationError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(#[from] ValidationError),

    #[error("Malformed request body: {0}")]
    MalformedPayload(String),

    #[error("duplicate email")]
    DuplicateEmail,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Failed to save registration")]
    StoreFailure(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::StoreFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ExternalServiceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            AppError::DuplicateEmail => "DUPLICATE_EMAIL",
            AppError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            AppError::StoreFailure(_) => "STORE_FAILURE",
            AppError::ExternalServiceError(_) => "EXTERNAL_SERVICE_ERROR",
        }
    }

    /// Diagnostic text attached to server-side failures.
    pub fn details(&self) -> Option<String> {
        match self {
            AppError::StoreFailure(details) | AppError::ExternalServiceError(details) => {
                Some(details.clone())
            }
            _ => None,
        }
    }

    fn log(&self) {
        match self {
            AppError::StoreFailure(details) => {
                error!(code = self.code(), details = %details, "Store failure");
            }
            AppError::ExternalServiceError(details) => {
                error!(code = self.code(), details = %details, "External service failure");
            }
            AppError::MalformedPayload(msg) => {
                warn!(code = self.code(), message = %msg, "Rejected request body");
            }
            // Expected client outcomes are logged where they are decided.
            _ => {}
        }
    }
}

impl From<IntakeError> for AppError {
    fn from(e: IntakeError) -> Self {
        match e {
            IntakeError::Invalid(e) => AppError::ValidationError(e),
            IntakeError::DuplicateEmail => AppError::DuplicateEmail,
            IntakeError::Store(details) => AppError::StoreFailure(details),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedPayload(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let field = match &self {
            AppError::ValidationError(e) => Some(e.field()),
            _ => None,
        };

        error_response(
            self.code(),
            self.to_string(),
            field,
            self.details(),
            self.status_code(),
        )
    }
}
