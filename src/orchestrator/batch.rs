//! Sequential batch execution

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::discovery::{CollectionRef, IterationDataRef};
use crate::runner::{
    CollectionRunner, DEFAULT_REPORTERS, DEFAULT_REQUEST_TIMEOUT, RunConfig, RunResult,
};

/// Exit code for a batch where every step passed
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for a batch that failed or faulted
pub const EXIT_FAILURE: i32 = 1;

/// One collection plus its optional iteration data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStep {
    pub collection: CollectionRef,
    pub iteration_data: IterationDataRef,
}

impl BatchStep {
    pub fn new(collection: CollectionRef, iteration_data: IterationDataRef) -> Self {
        Self {
            collection,
            iteration_data,
        }
    }
}

/// Options applied to every run in the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Reporter(s) passed to the runner
    pub reporters: String,
    /// Per-request timeout
    pub timeout_request: Option<Duration>,
    /// Stop each collection on its first failing request
    pub bail: bool,
    /// Environment file for every run
    pub environment: Option<PathBuf>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            reporters: DEFAULT_REPORTERS.to_string(),
            timeout_request: Some(DEFAULT_REQUEST_TIMEOUT),
            bail: true,
            environment: None,
        }
    }
}

impl BatchOptions {
    /// Runner invocation for one step
    pub fn run_config(&self, step: &BatchStep) -> RunConfig {
        RunConfig::new(step.collection.name(), step.collection.path())
            .with_iteration_data(step.iteration_data.clone())
            .with_environment(self.environment.clone())
            .with_reporters(&self.reporters)
            .with_timeout_request(self.timeout_request)
            .with_bail(self.bail)
    }
}

/// The step that stopped the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    /// 1-based position of the failing step
    pub step: usize,
    /// Collection base name
    pub collection: String,
    /// Failure detail from the runner
    pub error: String,
}

/// Aggregate result of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Number of steps the batch was given
    pub steps_total: usize,
    /// Results of the steps that ran, in order
    pub results: Vec<RunResult>,
    /// First failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<StepFailure>,
    /// Wall-clock time for the whole batch
    pub duration: Duration,
}

impl BatchOutcome {
    /// Whether every step passed
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// Process exit code: 0 when every step passed, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.succeeded() {
            EXIT_SUCCESS
        } else {
            EXIT_FAILURE
        }
    }

    /// Number of steps that were invoked
    pub fn steps_run(&self) -> usize {
        self.results.len()
    }

    /// Number of steps never invoked because the batch stopped early
    pub fn steps_skipped(&self) -> usize {
        self.steps_total.saturating_sub(self.results.len())
    }
}

/// Receives progress notifications while a batch runs
pub trait BatchObserver: Send + Sync {
    /// A step is about to be invoked (`index` is 1-based)
    fn on_step_start(&self, _index: usize, _step: &BatchStep) {}

    /// A step finished, passed or failed
    fn on_step_complete(&self, _result: &RunResult) {}

    /// The batch is done
    fn on_batch_complete(&self, _outcome: &BatchOutcome) {}
}

/// Observer that ignores every notification
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Run `steps` in order, stopping at the first failure
///
/// Runner faults are folded into a failed [`RunResult`] so the batch
/// always resolves to an outcome rather than an error.
pub async fn run_batch(
    steps: &[BatchStep],
    runner: &dyn CollectionRunner,
    opts: &BatchOptions,
    observer: &dyn BatchObserver,
) -> BatchOutcome {
    let start = Instant::now();
    let mut outcome = BatchOutcome {
        steps_total: steps.len(),
        ..BatchOutcome::default()
    };

    info!(
        steps = steps.len(),
        runner = runner.name(),
        "Starting batch"
    );

    for (idx, step) in steps.iter().enumerate() {
        let index = idx + 1;
        let config = opts.run_config(step);

        debug!(
            step = index,
            collection = %step.collection,
            iteration_data = %step.iteration_data,
            "Invoking collection runner"
        );
        observer.on_step_start(index, step);

        let step_start = Instant::now();
        let result = match runner.run(&config).await {
            Ok(result) => result,
            Err(e) => {
                error!(collection = %step.collection, error = %e, "Collection runner fault");
                RunResult::failed(step.collection.name(), e.to_string(), step_start.elapsed())
            }
        };

        observer.on_step_complete(&result);

        if result.succeeded {
            info!(
                step = index,
                collection = %result.collection,
                duration_ms = result.duration.as_millis(),
                "Collection PASSED"
            );
            outcome.results.push(result);
            continue;
        }

        let error = result
            .error
            .clone()
            .unwrap_or_else(|| "collection run failed".to_string());
        error!(
            step = index,
            collection = %result.collection,
            duration_ms = result.duration.as_millis(),
            error = %error,
            remaining = steps.len() - index,
            "Collection FAILED, stopping batch"
        );

        outcome.failure = Some(StepFailure {
            step: index,
            collection: result.collection.clone(),
            error,
        });
        outcome.results.push(result);
        break;
    }

    outcome.duration = start.elapsed();
    observer.on_batch_complete(&outcome);

    if outcome.succeeded() {
        info!(
            steps = outcome.steps_run(),
            duration_ms = outcome.duration.as_millis(),
            "All collections PASSED"
        );
    } else {
        error!(
            steps_run = outcome.steps_run(),
            steps_skipped = outcome.steps_skipped(),
            "Batch FAILED"
        );
    }

    outcome
}
