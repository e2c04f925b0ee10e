// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{ChatResponse, FALLBACK_MODEL, assistant, gemini};
use crate::config::{Config, GeminiConfig};
use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

pub const AVAILABLE_MODELS: [&str; 2] = ["gemini-1.5-flash", "gemini-1.5-pro"];

#[derive(Clone)]
pub struct AppState {
    pub gemini: Arc<GeminiConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(gemini: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(crate::utils::user_agent())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            gemini: Arc::new(gemini),
            http,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/health", get(health))
        .route("/api/test-gemini", get(test_gemini))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn chat(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> Response {
    let Ok(Json(body)) = body else {
        return error_body(
            StatusCode::BAD_REQUEST,
            "Message is required and must be a string",
        );
    };
    let message = match body.get("message").and_then(Value::as_str) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => {
            return error_body(
                StatusCode::BAD_REQUEST,
                "Message is required and must be a string",
            );
        }
    };
    info!(len = message.len(), "chat message received");

    if state.gemini.is_configured() {
        let prompt = gemini::build_prompt(&message, body.get("context"));
        match gemini::generate(&state.http, &state.gemini, &prompt, true).await {
            Ok(reply) => {
                return Json(ChatResponse {
                    reply: Some(reply),
                    model: Some(state.gemini.model.clone()),
                    error: None,
                })
                .into_response();
            }
            Err(err) => warn!(error = %err, "gemini request failed, falling back"),
        }
    }

    Json(ChatResponse {
        reply: Some(assistant::fallback_reply(&message).to_string()),
        model: Some(FALLBACK_MODEL.to_string()),
        error: None,
    })
    .into_response()
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "gemini_configured": state.gemini.is_configured(),
        "available_models": AVAILABLE_MODELS,
    }))
}

async fn test_gemini(State(state): State<AppState>) -> Response {
    if !state.gemini.is_configured() {
        return error_body(StatusCode::BAD_REQUEST, "GEMINI_API_KEY not configured");
    }
    match gemini::generate(&state.http, &state.gemini, gemini::PROBE_PROMPT, false).await {
        Ok(reply) => Json(json!({
            "success": true,
            "reply": reply,
            "model": state.gemini.model,
        }))
        .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Gemini test failed", "details": err.to_string() })),
        )
            .into_response(),
    }
}

pub async fn run(cfg: &Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", cfg.server.host, cfg.server.port))?;
    let state = AppState::new(cfg.gemini.clone())?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, gemini_configured = cfg.gemini.is_configured(), "chat proxy listening");
    info!("POST /api/chat, GET /api/health, GET /api/test-gemini");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .context("Server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app(api_key: Option<&str>) -> Router {
        let gemini = GeminiConfig {
            api_key: api_key.map(str::to_string),
            // Nothing listens here, so configured keys fail fast.
            base_url: "http://127.0.0.1:1/v1beta".to_string(),
            timeout_seconds: 2,
            ..GeminiConfig::default()
        };
        router(AppState::new(gemini).unwrap())
    }

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_chat(body: &str) -> Request<Body> {
        Request::post("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn rejects_non_string_message() {
        let (status, body) = call(app(None), post_chat(r#"{"message": 42}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message is required and must be a string");

        let (status, _) = call(app(None), post_chat("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(app(None), post_chat("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn answers_with_fallback_without_key() {
        let (status, body) = call(app(None), post_chat(r#"{"message": "How can I save?"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], "fallback");
        assert!(body["reply"].as_str().unwrap().starts_with("Here are quick"));
    }

    #[tokio::test]
    async fn upstream_failure_falls_back() {
        let (status, body) = call(app(Some("k")), post_chat(r#"{"message": "solar?"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], "fallback");
        assert!(body["reply"].as_str().unwrap().starts_with("Solar panels"));
    }

    #[tokio::test]
    async fn health_reports_configuration() {
        let req = Request::get("/api/health").body(Body::empty()).unwrap();
        let (status, body) = call(app(None), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["gemini_configured"], false);
        assert_eq!(body["available_models"][1], "gemini-1.5-pro");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_gemini_endpoint_statuses() {
        let req = || Request::get("/api/test-gemini").body(Body::empty()).unwrap();
        let (status, body) = call(app(None), req()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "GEMINI_API_KEY not configured");

        let (status, body) = call(app(Some("k")), req()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Gemini test failed");
        assert!(body["details"].is_string());
    }
}
