//! HTTP rendering of gateway errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use aigate_core::error::GatewayError;

/// Wrapper so the core error type can be returned from axum handlers.
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match &err {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::NoModelAvailable { .. }
            | GatewayError::Store(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }

        let mut body = json!({
            "error": err.client_code().as_str(),
            "message": err.to_string(),
            "retryable": err.is_retryable(),
        });
        if let GatewayError::QuotaExceeded { limit } = err {
            body["limit"] = json!(limit);
        }
        (status, Json(body)).into_response()
    }
}
