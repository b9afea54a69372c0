//! Health check handler for the SSE transport.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

/// Health status response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Status indicator, always "ok" while the process serves requests.
    pub status: String,

    /// Service name for identification.
    pub service: String,

    /// Service version from build-time.
    pub version: String,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
        }
    }
}

/// Liveness handler for `GET /health`.
///
/// Returns 200 OK whenever the process is running; the retail prices API is
/// intentionally not probed here.
pub async fn health_handler() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_alive() {
        let status = HealthStatus::alive("azure-pricing-mcp", "0.1.0");
        assert_eq!(status.status, "ok");
        assert_eq!(status.service, "azure-pricing-mcp");
        assert_eq!(status.version, "0.1.0");
    }

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus::alive("azure-pricing-mcp", "0.1.0");
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"service\":\"azure-pricing-mcp\""));
    }
}
