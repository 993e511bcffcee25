//! Status HTTP API
//!
//! Optional HTTP API for watching a batch from outside the process, e.g.
//! from a CI dashboard or a container orchestrator waiting on completion.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check (always returns 200 if running)
//! - `GET /status` - Current progress
//! - `GET /results` - Run results (202 while running, 200 once complete)
//! - `GET /metrics` - Prometheus metrics

mod metrics;
mod server;
mod state;

pub use server::start_api_server;
pub use state::{ApiState, ExecutionStatus, StatusResponse};
