//! Health check endpoint.

use axum::Json;
use common::DateTime;
use serde::Serialize;

/// Status of a running server.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Health {
    /// Always `healthy`, as long as the server is able to respond.
    pub status: &'static str,

    /// [`DateTime`] the check was performed at.
    pub timestamp: DateTime,

    /// Name of the service.
    pub service: &'static str,

    /// Version of the service.
    pub version: &'static str,
}

/// Name of the service reported by the [`Health`] check.
const SERVICE_NAME: &str = "sog-global-consult";

/// Version of the service reported by the [`Health`] check.
const VERSION: &str = "1.0.0";

/// `GET /health`
#[expect(clippy::unused_async, reason = "`async` is required by `axum`")]
pub async fn check() -> Json<Health> {
    Json(Health {
        status: "healthy",
        timestamp: DateTime::now(),
        service: SERVICE_NAME,
        version: VERSION,
    })
}

#[cfg(test)]
mod spec {
    use super::check;

    #[tokio::test]
    async fn reports_healthy() {
        let health = check().await.0;

        assert_eq!(health.status, "healthy");
        assert_eq!(health.service, "sog-global-consult");
        assert_eq!(health.version, "1.0.0");

        let json = serde_json::to_value(health).unwrap();
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
