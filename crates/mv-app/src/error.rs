use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mv_core::JobStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("cannot {action} a job that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: JobStatus,
    },
    #[error("job not found: {0}")]
    JobNotFound(String),
    #[error("job {0} has not been started")]
    NotStarted(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Core(#[from] mv_core::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("Error from backend: {0}")]
    BackendError(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Failure reported by the external artifact generator
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("generator request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generator returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generator error: {0}")]
    Service(String),
    #[error("unexpected generator response: {0}")]
    Malformed(String),
}

/// Both provenance tiers refused a record
#[derive(Error, Debug)]
#[error("provenance write failed (primary: {primary}, fallback: {fallback})")]
pub struct ProvenanceError {
    pub primary: String,
    pub fallback: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidTransition { .. } | Self::NotStarted(_) => StatusCode::CONFLICT,
            Self::JobNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) | Self::Core(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BackendError(_) | Self::Http(_) => StatusCode::BAD_GATEWAY,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
