//! API State management
//!
//! Shared state for the status API, tracking batch progress. The state is
//! also a [`BatchObserver`], so the orchestrator updates it directly.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::orchestrator::{BatchObserver, BatchOutcome, BatchStep, StepFailure};
use crate::runner::RunResult;

/// Execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Collections are currently running
    Running,
    /// All collections passed
    Completed,
    /// A collection failed and the batch stopped
    Failed,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Running => write!(f, "running"),
            ExecutionStatus::Completed => write!(f, "completed"),
            ExecutionStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug)]
struct InnerState {
    status: ExecutionStatus,
    started_at: Instant,
    completed_at: Option<Instant>,
    collections_total: usize,
    collections_passed: usize,
    collections_failed: usize,
    current_collection: Option<String>,
    failure: Option<StepFailure>,
    results: Vec<RunResult>,
}

/// Shared API state
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<RwLock<InnerState>>,
}

impl Default for ApiState {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiState {
    /// Create new API state
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(InnerState {
                status: ExecutionStatus::Running,
                started_at: Instant::now(),
                completed_at: None,
                collections_total: 0,
                collections_passed: 0,
                collections_failed: 0,
                current_collection: None,
                failure: None,
                results: Vec::new(),
            })),
        }
    }

    /// Set the number of collections in the batch
    pub fn set_total_collections(&self, total: usize) {
        self.inner.write().collections_total = total;
    }

    /// Mark a collection as running
    pub fn start_collection(&self, name: &str) {
        self.inner.write().current_collection = Some(name.to_string());
    }

    /// Record a finished run
    pub fn record_result(&self, result: RunResult) {
        let mut state = self.inner.write();
        if result.succeeded {
            state.collections_passed += 1;
        } else {
            state.collections_failed += 1;
        }
        state.current_collection = None;
        state.results.push(result);
    }

    /// Mark the batch as finished
    pub fn complete(&self, success: bool, failure: Option<StepFailure>) {
        let mut state = self.inner.write();
        state.status = if success {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Failed
        };
        state.completed_at = Some(Instant::now());
        state.current_collection = None;
        state.failure = failure;
    }

    /// Get current status
    pub fn status(&self) -> ExecutionStatus {
        self.inner.read().status
    }

    /// Get status summary for API response
    pub fn get_status_response(&self) -> StatusResponse {
        let state = self.inner.read();
        let completed = state.collections_passed + state.collections_failed;
        StatusResponse {
            status: state.status,
            collections_total: state.collections_total,
            collections_completed: completed,
            collections_passed: state.collections_passed,
            collections_failed: state.collections_failed,
            collections_skipped: if state.status == ExecutionStatus::Running {
                0
            } else {
                state.collections_total.saturating_sub(completed)
            },
            current_collection: state.current_collection.clone(),
            elapsed_ms: state.started_at.elapsed().as_millis() as u64,
            duration_ms: state
                .completed_at
                .map(|t| t.duration_since(state.started_at).as_millis() as u64),
        }
    }

    /// Get all results
    pub fn get_results(&self) -> Vec<RunResult> {
        self.inner.read().results.clone()
    }

    /// Get the failure that stopped the batch, if any
    pub fn failure(&self) -> Option<StepFailure> {
        self.inner.read().failure.clone()
    }
}

impl BatchObserver for ApiState {
    fn on_step_start(&self, _index: usize, step: &BatchStep) {
        self.start_collection(step.collection.name());
    }

    fn on_step_complete(&self, result: &RunResult) {
        self.record_result(result.clone());
    }

    fn on_batch_complete(&self, outcome: &BatchOutcome) {
        self.complete(outcome.succeeded(), outcome.failure.clone());
    }
}

/// Status API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: ExecutionStatus,
    pub collections_total: usize,
    pub collections_completed: usize,
    pub collections_passed: usize,
    pub collections_failed: usize,
    pub collections_skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_collection: Option<String>,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub status: ExecutionStatus,
}

/// Results response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub status: ExecutionStatus,
    pub results: Vec<RunResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<StepFailure>,
}
