//! Health check endpoints
//!
//! - /health: process is up
//! - /health/live: liveness probe, never touches dependencies
//! - /health/ready: readiness probe, pings the database

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

const SERVICE_NAME: &str = "schedulit";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseCheck>,
}

/// Result of the database ping
#[derive(Debug, Serialize)]
pub struct DatabaseCheck {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    fn new(status: &'static str, database: Option<DatabaseCheck>) -> Self {
        Self {
            status,
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            database,
        }
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy", None))
}

pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("alive", None))
}

/// Readiness probe; 503 while the database is unreachable
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    match db::health_check(state.db()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse::new(
                "ready",
                Some(DatabaseCheck {
                    healthy: true,
                    error: None,
                }),
            )),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::new(
                "not_ready",
                Some(DatabaseCheck {
                    healthy: false,
                    error: Some(e.to_string()),
                }),
            )),
        ),
    }
}
