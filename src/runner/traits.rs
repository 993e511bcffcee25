//! Collection runner trait and supporting types
//!
//! The `CollectionRunner` trait is the seam to the external tool that
//! actually executes a collection. The orchestrator only ever sees a
//! `RunResult` (or a `RunnerError`, which it treats as a failed run).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::discovery::IterationDataRef;

/// Default reporter passed to the collaborator
pub const DEFAULT_REPORTERS: &str = "cli";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised when a collection cannot be executed at all
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Collection runner unavailable: {0}")]
    Unavailable(String),

    #[error("Runner was terminated by a signal")]
    Terminated,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// One invocation of the collection runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Collection base name, used for logging and results
    pub name: String,
    /// Path to the collection file
    pub collection: PathBuf,
    /// Iteration data driving repeated runs
    #[serde(default)]
    pub iteration_data: IterationDataRef,
    /// Environment file with variable values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<PathBuf>,
    /// Reporter(s) the collaborator should use
    pub reporters: String,
    /// Per-request timeout
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout_request: Option<Duration>,
    /// Stop the collection on its first failing request
    pub bail: bool,
}

impl RunConfig {
    /// Create a config with the default reporter, timeout and bail policy
    pub fn new(name: impl Into<String>, collection: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            collection: collection.into(),
            iteration_data: IterationDataRef::Absent,
            environment: None,
            reporters: DEFAULT_REPORTERS.to_string(),
            timeout_request: Some(DEFAULT_REQUEST_TIMEOUT),
            bail: true,
        }
    }

    /// Attach iteration data
    pub fn with_iteration_data(mut self, data: IterationDataRef) -> Self {
        self.iteration_data = data;
        self
    }

    /// Attach an environment file
    pub fn with_environment(mut self, environment: Option<PathBuf>) -> Self {
        self.environment = environment;
        self
    }

    /// Set the reporter(s)
    pub fn with_reporters(mut self, reporters: impl Into<String>) -> Self {
        self.reporters = reporters.into();
        self
    }

    /// Set or clear the per-request timeout
    pub fn with_timeout_request(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_request = timeout;
        self
    }

    /// Set the in-collection bail policy
    pub fn with_bail(mut self, bail: bool) -> Self {
        self.bail = bail;
        self
    }
}

/// Outcome of running one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Collection base name
    pub collection: String,
    /// Whether every request's assertions passed
    pub succeeded: bool,
    /// Failure detail when `succeeded` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// How long the run took
    pub duration: Duration,
}

impl RunResult {
    /// Create a passing result
    pub fn passed(collection: impl Into<String>, duration: Duration) -> Self {
        Self {
            collection: collection.into(),
            succeeded: true,
            error: None,
            duration,
        }
    }

    /// Create a failing result
    pub fn failed(
        collection: impl Into<String>,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            collection: collection.into(),
            succeeded: false,
            error: Some(error.into()),
            duration,
        }
    }
}

/// Executes a single collection
///
/// Implementations must resolve exactly once per call: either a
/// `RunResult` (assertions passed or failed) or a `RunnerError` when the
/// collection could not be run at all.
///
/// ## Example Implementation
///
/// ```ignore
/// use async_trait::async_trait;
/// use collection_runner::runner::{CollectionRunner, RunConfig, RunResult, RunnerError};
///
/// pub struct AlwaysPass;
///
/// #[async_trait]
/// impl CollectionRunner for AlwaysPass {
///     fn name(&self) -> &'static str { "always-pass" }
///     fn description(&self) -> &'static str { "Reports success without running anything" }
///
///     async fn run(&self, config: &RunConfig) -> Result<RunResult, RunnerError> {
///         Ok(RunResult::passed(&config.name, Default::default()))
///     }
/// }
/// ```
#[async_trait]
pub trait CollectionRunner: Send + Sync {
    /// Unique backend name (used in CLI and config)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Verify the backend can run at all, before any collection starts
    async fn preflight(&self) -> Result<(), RunnerError> {
        Ok(())
    }

    /// Run one collection to completion
    async fn run(&self, config: &RunConfig) -> Result<RunResult, RunnerError>;
}
