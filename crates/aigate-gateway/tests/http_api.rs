//! HTTP binding: status codes and JSON error bodies.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use aigate_core::model::ModelId;
use aigate_core::protocol::GatewayRequest;
use aigate_gateway::api::error::ApiError;
use aigate_gateway::{api, app_state::AppState, config, ops};

use common::{gateway_with_store, holdings, FailingUsageStore, ScriptedBackend};

fn state(backend: ScriptedBackend) -> AppState {
    let cfg = config::load_from_str("version: 1\n").unwrap();
    AppState::with_parts(&cfg, Arc::new(backend), holdings()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post(state: &AppState, req: GatewayRequest) -> axum::response::Response {
    api::process_request(State(state.clone()), Ok(Json(req)))
        .await
        .into_response()
}

#[tokio::test]
async fn success_returns_response_json() {
    let st = state(ScriptedBackend::new());
    let resp = post(&st, GatewayRequest::new("Suggest a domain name")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["model_used"], "grok");
    assert_eq!(body["credits_remaining"], 4);
    assert_eq!(body["tier_info"]["id"], "free");
    assert_eq!(body["fallback_used"], false);
}

#[tokio::test]
async fn quota_exceeded_is_429_with_limit() {
    let st = state(ScriptedBackend::new());
    for _ in 0..5 {
        assert_eq!(post(&st, GatewayRequest::new("hi")).await.status(), StatusCode::OK);
    }
    let resp = post(&st, GatewayRequest::new("hi")).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let body = body_json(resp).await;
    assert_eq!(body["error"], "QUOTA_EXCEEDED");
    assert_eq!(body["limit"], 5);
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
async fn upstream_failure_is_502() {
    let st = state(ScriptedBackend::new().failing(ModelId::Grok));
    let resp = post(&st, GatewayRequest::new("hello")).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(resp).await;
    assert_eq!(body["error"], "UPSTREAM_ERROR");
    assert_eq!(body["retryable"], true);
}

#[tokio::test]
async fn blank_prompt_is_400() {
    let st = state(ScriptedBackend::new());
    let resp = post(&st, GatewayRequest::new(" ")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn usage_endpoint_reports_stats() {
    let st = state(ScriptedBackend::new());
    let _ = post(&st, GatewayRequest::new("hi").with_user("silver")).await;

    let resp = api::usage_stats(State(st.clone()), Path("silver".to_string()))
        .await
        .into_response();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["tier"]["id"], "silver");
    assert_eq!(body["daily_usage"]["prompts_used"], 1);
    assert_eq!(body["daily_usage"]["models_used"]["grok"], 1);
    assert_eq!(body["upgrade_benefits"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn readiness_flips_when_draining_and_metrics_render() {
    let st = state(ScriptedBackend::new());
    let _ = post(&st, GatewayRequest::new("hi")).await;

    let ready = ops::readyz(State(st.clone())).await;
    assert_eq!(ready.status(), StatusCode::OK);
    assert_eq!(body_json(ready).await["models"].as_array().map(Vec::len), Some(5));

    st.set_draining();
    let ready = ops::readyz(State(st.clone())).await;
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(ready).await["status"], "draining");

    let metrics = ops::metrics(State(st.clone())).await;
    let bytes = axum::body::to_bytes(metrics.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("aigate_requests_total{model=\"grok\",outcome=\"ok\",tier=\"free\"} 1"));
    assert!(text.contains("aigate_draining 1"));
    assert!(text.contains("aigate_usage_records 1"));
}

#[tokio::test]
async fn not_ready_without_any_usable_provider() {
    let cfg = config::load_from_str("version: 1\nproviders: {}\n").unwrap();
    let st = AppState::new(&cfg).unwrap();

    let ready = ops::readyz(State(st)).await;
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(ready).await["status"], "no_provider");
}

#[tokio::test]
async fn usage_store_failure_is_500_and_retryable() {
    let gateway = gateway_with_store(Arc::new(ScriptedBackend::new()), Arc::new(FailingUsageStore::reads()));
    let err = gateway
        .process_request(GatewayRequest::new("hi"))
        .await
        .expect_err("store down");

    let resp = ApiError(err).into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(resp).await;
    assert_eq!(body["error"], "INTERNAL");
    assert_eq!(body["retryable"], true);
    assert!(body.get("limit").is_none());
}
