//! Route handler functions.

use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::{Extensions, HeaderMap};
use axum::Json;
use palette_action::{CommandRequest, CommandResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::rate_limit::client_key;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

/// GET / - service banner.
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        name: "Command Palette API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "healthy".to_string(),
    })
}

/// GET /health - liveness check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// POST /command - classify a prompt.
///
/// The prompt is validated before it counts against the daily limit.
pub async fn command(
    State(state): State<AppState>,
    headers: HeaderMap,
    extensions: Extensions,
    body: Result<Json<CommandRequest>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::BadRequest("prompt must not be empty".to_string()));
    }
    let max = state.config.max_prompt_chars;
    if prompt.chars().count() > max {
        return Err(ApiError::BadRequest(format!(
            "prompt exceeds {} characters",
            max
        )));
    }

    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(&headers, peer);
    let usage = state.limiter.check(&client).map_err(|usage| {
        warn!(%client, used = usage.used, "Daily command limit exceeded");
        ApiError::LimitExceeded(usage)
    })?;

    let mut response = state.classifier.classify(prompt).await?;
    info!(%client, action = %response.action, remaining = usage.remaining, "Command classified");
    response.rate_limit = Some(usage);
    Ok(Json(response))
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("No such endpoint".to_string())
}
