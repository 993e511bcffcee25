//! HTTP Server for Status API
//!
//! Axum-based HTTP server providing status endpoints.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::metrics::metrics_handler;
use super::state::{ApiState, ExecutionStatus, HealthResponse, ResultsResponse, StatusResponse};

/// Start the API server on the given port
///
/// Runs until the process exits.
pub async fn start_api_server(
    port: u16,
    state: ApiState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(port = port, "Starting status API server");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the API router
pub(crate) fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/results", get(results_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
///
/// Returns 200 while the process is up, whatever the batch status.
async fn health_handler(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        status: state.status(),
    })
}

/// Current progress
async fn status_handler(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(state.get_status_response())
}

/// Results endpoint
///
/// Returns 202 Accepted while the batch is still running.
async fn results_handler(State(state): State<ApiState>) -> (StatusCode, Json<ResultsResponse>) {
    let status = state.status();

    let status_code = match status {
        ExecutionStatus::Running => StatusCode::ACCEPTED,
        ExecutionStatus::Completed | ExecutionStatus::Failed => StatusCode::OK,
    };

    (
        status_code,
        Json(ResultsResponse {
            status,
            results: state.get_results(),
            failure: state.failure(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RunResult;
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, body) = get_json(create_router(ApiState::new()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], true);
        assert_eq!(body["status"], "running");
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let state = ApiState::new();
        state.set_total_collections(3);
        state.record_result(RunResult::passed("A", Duration::from_millis(3)));

        let (status, body) = get_json(create_router(state), "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["collections_total"], 3);
        assert_eq!(body["collections_passed"], 1);
    }

    #[tokio::test]
    async fn test_results_running() {
        let (status, _) = get_json(create_router(ApiState::new()), "/results").await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_results_failed() {
        let state = ApiState::new();
        state.record_result(RunResult::failed("B", "boom", Duration::ZERO));
        state.complete(false, None);

        let (status, body) = get_json(create_router(state), "/results").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "failed");
        assert_eq!(body["results"][0]["collection"], "B");
        assert_eq!(body["results"][0]["succeeded"], false);
    }
}
