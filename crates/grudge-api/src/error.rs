use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use grudge_core::Error as DomainError;

/// HTTP-facing error. Domain failures keep their message; internal ones are
/// logged and withheld from the client.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Conflict(&'static str),
    Domain(DomainError),
    Internal(anyhow::Error),
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError::Domain(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.to_string()),
            ApiError::Domain(e) => match &e {
                DomainError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                DomainError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                DomainError::Forbidden => (StatusCode::FORBIDDEN, e.to_string()),
                DomainError::AlreadyExists => (StatusCode::CONFLICT, e.to_string()),
                DomainError::Expired(_) => (StatusCode::GONE, e.to_string()),
                DomainError::Database(inner) => {
                    error!("database error: {inner:#}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
            ApiError::Internal(e) => {
                error!("internal error: {e:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({ "error": message }));
        (status, body).into_response()
    }
}

/// Joins a `spawn_blocking` result, folding a panicked task into an
/// internal error.
pub fn join_blocking<T>(
    res: Result<Result<T, DomainError>, tokio::task::JoinError>,
) -> Result<T, ApiError> {
    match res {
        Ok(inner) => inner.map_err(ApiError::from),
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            Err(ApiError::Internal(anyhow::anyhow!("blocking task failed")))
        }
    }
}
