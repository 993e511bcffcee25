//! Newman backend
//!
//! Runs each collection through the `newman` CLI as a child process.
//! Newman's own CLI reporter writes straight to our stdout/stderr; we only
//! look at its exit status.
//!
//! ## Invocation
//!
//! ```text
//! newman run <collection> [-d <data>] [-e <environment>] -r <reporters>
//!        [--timeout-request <ms>] [--bail]
//! ```

use async_trait::async_trait;
use std::ffi::OsString;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::traits::{CollectionRunner, RunConfig, RunResult, RunnerError};

/// Default executable name
pub const DEFAULT_PROGRAM: &str = "newman";

/// Runs collections with the newman CLI
#[derive(Debug, Clone)]
pub struct NewmanRunner {
    program: String,
}

impl Default for NewmanRunner {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl NewmanRunner {
    /// Use `program` as the newman executable (name on PATH or a full path)
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable this runner spawns
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Build the argument list for one run
    pub fn build_args(config: &RunConfig) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["run".into(), config.collection.clone().into()];

        if let Some(data) = config.iteration_data.as_path() {
            args.push("-d".into());
            args.push(data.into());
        }

        if let Some(env) = &config.environment {
            args.push("-e".into());
            args.push(env.into());
        }

        if !config.reporters.is_empty() {
            args.push("-r".into());
            args.push(config.reporters.clone().into());
        }

        if let Some(timeout) = config.timeout_request {
            args.push("--timeout-request".into());
            // 0 means "no timeout" to newman
            args.push(timeout.as_millis().max(1).to_string().into());
        }

        if config.bail {
            args.push("--bail".into());
        }

        args
    }

    fn spawn_error(&self, source: std::io::Error) -> RunnerError {
        if source.kind() == std::io::ErrorKind::NotFound {
            RunnerError::Unavailable(format!(
                "{} not found. Install with `npm install -g newman`",
                self.program
            ))
        } else {
            RunnerError::Spawn {
                program: self.program.clone(),
                source,
            }
        }
    }
}

#[async_trait]
impl CollectionRunner for NewmanRunner {
    fn name(&self) -> &'static str {
        "newman"
    }

    fn description(&self) -> &'static str {
        "Run collections with the newman CLI"
    }

    async fn preflight(&self) -> Result<(), RunnerError> {
        let status = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if status.success() {
            debug!(program = %self.program, "Preflight passed");
            Ok(())
        } else {
            Err(RunnerError::Unavailable(format!(
                "`{} --version` exited with {status}",
                self.program
            )))
        }
    }

    async fn run(&self, config: &RunConfig) -> Result<RunResult, RunnerError> {
        let start = Instant::now();
        let args = Self::build_args(config);

        info!(
            collection = %config.name,
            path = %config.collection.display(),
            iteration_data = %config.iteration_data,
            "Starting newman"
        );
        debug!(program = %self.program, args = ?args, "Spawning collection runner");

        let status = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| self.spawn_error(e))?;

        let duration = start.elapsed();

        match status.code() {
            Some(0) => Ok(RunResult::passed(&config.name, duration)),
            Some(code) => {
                warn!(collection = %config.name, exit_code = code, "newman reported failures");
                Ok(RunResult::failed(
                    &config.name,
                    format!("newman exited with code {code}"),
                    duration,
                ))
            }
            None => Err(RunnerError::Terminated),
        }
    }
}
