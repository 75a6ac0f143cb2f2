use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type RelayResult<T> = Result<T, RelayError>;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Edge/CDN refused the session endpoint (HTTP 403).
    #[error("CLOUDFLARE")]
    BlockedByEdge,

    /// Session endpoint answered but carried no access token.
    #[error("UNAUTHORIZED")]
    Unauthenticated,

    /// Backend answered with a non-success status before streaming began.
    #[error("{status} {message}")]
    Http { status: u16, message: String },

    /// No arkose challenge request has ever been captured.
    #[error("Arkose config missing: {0}")]
    ConfigMissing(String),

    /// Replayed arkose challenge request yielded no token field.
    #[error("Failed to get arkose token: {0}")]
    TokenFetchFailed(String),

    #[error("Event stream error: {0}")]
    StreamError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            RelayError::HttpRequest(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            RelayError::JsonError(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            RelayError::BlockedByEdge => (StatusCode::FORBIDDEN, self.to_string()),
            RelayError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            RelayError::Http { status, .. } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                self.to_string(),
            ),
            RelayError::ConfigMissing(_) => (StatusCode::PRECONDITION_FAILED, self.to_string()),
            RelayError::TokenFetchFailed(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            RelayError::StreamError(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            RelayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            RelayError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": "relay_error",
                "code": status.as_u16()
            }
        }));

        (status, body).into_response()
    }
}
