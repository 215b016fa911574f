use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::twilio::TwilioError;

/// Application-specific error types.
///
/// Each variant maps to exactly one HTTP status and JSON body shape, so the
/// handlers can return a tagged outcome instead of assembling responses
/// inline.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Bad request error (missing or invalid input).
    BadRequest(String),
    /// The provider rejected the request; `message` carries its error text.
    UpstreamRejected { error: String, message: String },
    /// Required provider credentials are not configured.
    ConfigError,
    /// The lookup succeeded but carried no usable spam-score result.
    SpamScoreUnavailable(serde_json::Value),
    /// Internal server error (parse failures, transport failures, anything
    /// unexpected).
    InternalError(String),
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::UpstreamRejected { error, message } => {
                write!(f, "{}: {}", error, message)
            }
            AppError::ConfigError => write!(f, "Server configuration error"),
            AppError::SpamScoreUnavailable(details) => {
                write!(f, "Failed to retrieve spam score: {}", details)
            }
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to the status code and JSON body of the
    /// endpoint contract. Logs errors appropriately based on their severity.
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::UpstreamRejected { error, message } => {
                tracing::warn!("Provider rejected request: {}: {}", error, message);
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": error, "message": message }),
                )
            }
            AppError::ConfigError => {
                tracing::error!("Twilio credentials missing from configuration");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Server configuration error" }),
                )
            }
            AppError::SpamScoreUnavailable(details) => {
                tracing::error!("Spam score unavailable: {}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Failed to retrieve spam score", "details": details }),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error", "message": msg }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl AppError {
    /// Translates a provider error for a given failing operation.
    ///
    /// REST rejections surface as 400 with the provider's error text; any
    /// other client failure (transport, decode) is an internal error.
    pub fn upstream(operation: &str, err: TwilioError) -> Self {
        match err {
            TwilioError::Rest { message, .. } => AppError::UpstreamRejected {
                error: operation.to_string(),
                message,
            },
            other => AppError::InternalError(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    fn from(err: reqwest::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    /// Converts a body parse failure into an `AppError`.
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}
