use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::services::metrics::METRICS;

/// Handler for GET /metrics endpoint
/// Returns Prometheus metrics in text format
pub async fn get_metrics() -> Response {
    match METRICS.export() {
        Ok(output) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            output,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to export metrics: {}", e),
        )
            .into_response(),
    }
}
