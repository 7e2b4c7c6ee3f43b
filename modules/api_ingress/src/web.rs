use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Extension,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::Json,
};
use runtime::RunMode;
use serde_json::{json, Value};

use crate::model::ApiCatalog;

pub const HEALTH_PATH: &str = "/health";
pub const DOCS_PATH: &str = "/api/docs";

/// Shared by the host endpoints and the fallback.
#[derive(Debug)]
pub struct HostState {
    pub catalog: ApiCatalog,
    pub mode: RunMode,
    pub started_at: Instant,
}

impl HostState {
    /// Every reachable route as `"METHOD path"`, host endpoints first.
    pub fn available_endpoints(&self) -> Vec<String> {
        ["GET /", "GET /health", "GET /api/docs"]
            .into_iter()
            .map(str::to_owned)
            .chain(self.catalog.endpoints.iter().map(|e| e.route_line()))
            .collect()
    }
}

pub async fn health_check(Extension(state): Extension<Arc<HostState>>) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Server is running",
        "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "environment": state.mode.as_str(),
    }))
}

pub async fn root(Extension(state): Extension<Arc<HostState>>) -> Json<Value> {
    let mut endpoints = serde_json::Map::new();
    for (name, path) in &state.catalog.resources {
        endpoints.insert(name.clone(), Value::String(path.clone()));
    }
    endpoints.insert("health".into(), Value::String(HEALTH_PATH.into()));

    Json(json!({
        "success": true,
        "message": format!("Welcome to the {}", state.catalog.title),
        "version": state.catalog.version,
        "documentation": DOCS_PATH,
        "endpoints": endpoints,
    }))
}

pub async fn docs(Extension(state): Extension<Arc<HostState>>, headers: HeaderMap) -> Json<Value> {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    Json(json!({
        "success": true,
        "message": format!("{} documentation", state.catalog.title),
        "version": state.catalog.version,
        "baseUrl": format!("http://{host}"),
        "endpoints": state.catalog.endpoints,
        "examples": state.catalog.examples,
    }))
}

/// Catch-all for unknown paths and unsupported methods.
pub async fn not_found(
    Extension(state): Extension<Arc<HostState>>,
    method: Method,
    uri: Uri,
) -> (StatusCode, Json<Value>) {
    let path = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_owned(), |pq| pq.as_str().to_owned());
    tracing::debug!(%method, %path, "no route matched");

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Route not found",
            "path": path,
            "method": method.as_str(),
            "availableEndpoints": state.available_endpoints(),
        })),
    )
}
