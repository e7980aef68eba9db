/// Health endpoint
///
/// Reports liveness plus the state of the one dependency provisioning
/// cannot work without: the database holding profiles and the compensation
/// log. The identity directory has no cheap probe (in production it shares
/// the same database), so it is not reported separately.
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "conforma-api",
///   "version": "0.1.0",
///   "database": { "reachable": true, "latency_ms": 2 }
/// }
/// ```
///
/// Always `200`; a degraded database shows up in the body, not the status
/// code, so load balancers keep routing while operators see the problem.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use conforma_shared::db::pool::ping;
use serde::{Deserialize, Serialize};

/// Probe result for the database dependency
#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseHealth {
    /// Whether the round-trip query succeeded
    pub reachable: bool,

    /// Round-trip time, absent when unreachable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,

    /// Service name, for fleet-wide probe dashboards
    pub service: String,

    /// Application version
    pub version: String,

    /// Database probe result
    pub database: DatabaseHealth,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database = match ping(&state.db).await {
        Ok(latency) => DatabaseHealth {
            reachable: true,
            latency_ms: Some(latency.as_millis() as u64),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Database probe failed");
            DatabaseHealth {
                reachable: false,
                latency_ms: None,
            }
        }
    };

    Ok(Json(HealthResponse {
        status: if database.reachable { "healthy" } else { "degraded" }.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    }))
}
