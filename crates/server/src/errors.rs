use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use service::errors::ServiceError;

use crate::observability::UPSTREAM_ERRORS_TOTAL;

/// Adapter from the service error taxonomy to HTTP. Keeps the three caller
/// outcomes distinguishable: bad input (4xx on the caller), missing record,
/// and "the system could not complete the request" (5xx).
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::UpstreamRejected(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let msg = self.0.to_string();
        if status.is_server_error() {
            UPSTREAM_ERRORS_TOTAL.inc();
            error!(error = %msg, status = %status, "request failed");
        }
        (status, Json(serde_json::json!({"error": msg}))).into_response()
    }
}
