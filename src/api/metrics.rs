//! Prometheus metrics
//!
//! Exposes batch progress in Prometheus text format at `/metrics`.
//!
//! ## Metrics Exposed
//!
//! - `collection_runner_collections_total` - Collections in the batch
//! - `collection_runner_collections_passed` - Collections that passed
//! - `collection_runner_collections_failed` - Collections that failed
//! - `collection_runner_collections_skipped` - Collections skipped after a failure
//! - `collection_runner_execution_status` - 0=running, 1=completed, 2=failed
//! - `collection_runner_collection_passed{collection}` - Per-collection verdict
//! - `collection_runner_collection_duration_seconds{collection}` - Per-collection duration

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::fmt::Write;
use tracing::error;

use super::state::{ApiState, ExecutionStatus, StatusResponse};
use crate::runner::RunResult;

const PREFIX: &str = "collection_runner";

/// Generate Prometheus-format metrics
pub async fn metrics_handler(State(state): State<ApiState>) -> impl IntoResponse {
    match render_metrics(&state.get_status_response(), &state.get_results()) {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        ),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain; charset=utf-8")],
                String::new(),
            )
        }
    }
}

fn gauge(out: &mut String, name: &str, help: &str, value: impl std::fmt::Display) -> std::fmt::Result {
    writeln!(out, "# HELP {PREFIX}_{name} {help}")?;
    writeln!(out, "# TYPE {PREFIX}_{name} gauge")?;
    writeln!(out, "{PREFIX}_{name} {value}")?;
    writeln!(out)
}

fn per_collection<F, V>(
    out: &mut String,
    name: &str,
    help: &str,
    results: &[RunResult],
    value: F,
) -> std::fmt::Result
where
    F: Fn(&RunResult) -> V,
    V: std::fmt::Display,
{
    writeln!(out, "# HELP {PREFIX}_{name} {help}")?;
    writeln!(out, "# TYPE {PREFIX}_{name} gauge")?;
    for result in results {
        writeln!(
            out,
            "{PREFIX}_{name}{{collection=\"{}\"}} {}",
            escape_label(&result.collection),
            value(result)
        )?;
    }
    writeln!(out)
}

/// Escape a label value per the Prometheus text format
fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Render the full metrics page
pub(crate) fn render_metrics(
    status: &StatusResponse,
    results: &[RunResult],
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "# HELP {PREFIX}_info Build information")?;
    writeln!(out, "# TYPE {PREFIX}_info gauge")?;
    writeln!(
        out,
        "{PREFIX}_info{{version=\"{}\"}} 1",
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out)?;

    let status_value = match status.status {
        ExecutionStatus::Running => 0,
        ExecutionStatus::Completed => 1,
        ExecutionStatus::Failed => 2,
    };
    gauge(
        &mut out,
        "execution_status",
        "Current execution status (0=running, 1=completed, 2=failed)",
        status_value,
    )?;
    gauge(
        &mut out,
        "collections_total",
        "Number of collections in the batch",
        status.collections_total,
    )?;
    gauge(
        &mut out,
        "collections_passed",
        "Number of collections that passed",
        status.collections_passed,
    )?;
    gauge(
        &mut out,
        "collections_failed",
        "Number of collections that failed",
        status.collections_failed,
    )?;
    gauge(
        &mut out,
        "collections_skipped",
        "Number of collections skipped after a failure",
        status.collections_skipped,
    )?;
    gauge(
        &mut out,
        "elapsed_seconds",
        "Time elapsed since start",
        status.elapsed_ms as f64 / 1000.0,
    )?;

    if !results.is_empty() {
        per_collection(
            &mut out,
            "collection_passed",
            "Whether a collection passed (1) or failed (0)",
            results,
            |r| u8::from(r.succeeded),
        )?;
        per_collection(
            &mut out,
            "collection_duration_seconds",
            "Duration of each collection run",
            results,
            |r| r.duration.as_secs_f64(),
        )?;
    }

    Ok(out)
}
