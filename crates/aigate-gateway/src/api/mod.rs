//! JSON HTTP binding for the gateway operations.
//!
//! - `POST /v1/ai/request`         : process one prompt
//! - `GET  /v1/ai/usage/:user_id`  : today's usage and upgrade hints

pub mod error;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use aigate_core::error::GatewayError;
use aigate_core::protocol::{GatewayRequest, GatewayResponse, UsageStats};

use crate::app_state::AppState;
use error::ApiError;

pub async fn process_request(
    State(state): State<AppState>,
    body: Result<Json<GatewayRequest>, JsonRejection>,
) -> Result<Json<GatewayResponse>, ApiError> {
    let Json(req) = body.map_err(|e| GatewayError::BadRequest(e.body_text()))?;
    let resp = state.gateway().process_request(req).await?;
    Ok(Json(resp))
}

pub async fn usage_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UsageStats>, ApiError> {
    let stats = state.gateway().usage_stats(&user_id).await?;
    Ok(Json(stats))
}
