//! Maps domain errors onto HTTP responses.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use fr_core::AppError;
use serde_json::json;
use thiserror::Error;

/// `AppError` as it leaves a handler.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct ApiError(#[from] pub AppError);

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError(AppError::from(err))
    }
}

impl ApiError {
    /// What the client gets to read. Server errors stay in the log.
    fn public_message(&self) -> String {
        match &self.0 {
            AppError::NotFound(what, id) => format!("{what} with ID {id} does not exist."),
            AppError::Forbidden(msg)
            | AppError::Unauthorized(msg)
            | AppError::ValidationError(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::LookupFailure(_) | AppError::Internal(_) => {
                "An internal error occurred.".to_string()
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::LookupFailure(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self.0);
        } else {
            log::warn!("request rejected: {}", self.0);
        }
        HttpResponse::build(status).json(json!({ "error": self.public_message() }))
    }
}
