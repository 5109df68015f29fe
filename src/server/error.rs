use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

use crate::scoring::ScoreResult;
use crate::submit::SubmitError;

/// Error returned by API handlers, always rendered as a JSON body.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// Scored but not stored; the client may retry with the same id.
    NotSaved {
        submission_id: String,
        result: Box<ScoreResult>,
        message: String,
    },
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotSaved {
                submission_id,
                result,
                message,
            } => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": message,
                    "retryable": true,
                    "submissionId": submission_id,
                    "result": result,
                })),
            )
                .into_response(),
            ApiError::Internal(e) => {
                error!(error = %format!("{:#}", e), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::InvalidInput(e) => ApiError::BadRequest(e.to_string()),
            SubmitError::Persistence {
                submission_id,
                result,
                source,
            } => {
                warn!(
                    submission_id = %submission_id,
                    error = %format!("{:#}", source),
                    "submission scored but not saved"
                );
                ApiError::NotSaved {
                    message: "Submission scored but not saved, retry with the same submission id"
                        .to_string(),
                    submission_id,
                    result,
                }
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}
