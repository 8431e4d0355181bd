use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Everything a request can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or invalid token")]
    InvalidToken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("rating point {year}-{month}-{day} is not a valid calendar date")]
    InvalidDatePoint { year: i64, month: i64, day: i64 },
    #[error("storage unavailable: {0}")]
    Storage(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Uniform failure body. Auth failures and credential mismatches all
/// serialize to the same bytes so callers cannot tell them apart.
#[derive(Debug, Serialize)]
pub struct Failure {
    pub success: bool,
}

pub fn failure() -> Json<Failure> {
    Json(Failure { success: false })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            // Token and credential problems answer 200 with a failure body.
            // Existing API consumers key off the `success` field, not the
            // status line.
            ApiError::InvalidToken | ApiError::InvalidCredentials | ApiError::DuplicateEmail => {
                StatusCode::OK
            }
            ApiError::Upstream(_) | ApiError::InvalidDatePoint { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else if status != StatusCode::OK {
            warn!(error = %self, "request failed");
        }

        (status, failure()).into_response()
    }
}
