//! Dry-run backend
//!
//! Logs what would be executed and reports success without spawning
//! anything. Useful for checking discovery and data pairing in CI before
//! wiring up newman.

use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use super::traits::{CollectionRunner, RunConfig, RunResult, RunnerError};

/// Pretends every collection passed
pub struct DryRunRunner;

#[async_trait]
impl CollectionRunner for DryRunRunner {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    fn description(&self) -> &'static str {
        "Log each planned run and report success without executing it"
    }

    async fn run(&self, config: &RunConfig) -> Result<RunResult, RunnerError> {
        info!(
            collection = %config.name,
            path = %config.collection.display(),
            iteration_data = %config.iteration_data,
            environment = ?config.environment,
            reporters = %config.reporters,
            timeout_request_ms = config.timeout_request.map(|t| t.as_millis() as u64),
            bail = config.bail,
            "Dry run"
        );

        Ok(RunResult::passed(&config.name, Duration::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_passes() {
        let result = DryRunRunner
            .run(&RunConfig::new("Missing", "/nowhere/Missing.json"))
            .await
            .unwrap();
        assert!(result.succeeded);
        assert_eq!(result.collection, "Missing");
    }

    #[tokio::test]
    async fn test_preflight_is_noop() {
        assert!(DryRunRunner.preflight().await.is_ok());
    }
}
