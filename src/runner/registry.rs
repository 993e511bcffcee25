//! Runner registry
//!
//! Central registry of collection runner backends, keyed by the name used
//! in `runner.backend` and `--runner`. Each entry builds its runner from
//! the `runner` section of the configuration.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

use super::traits::CollectionRunner;
use super::{DryRunRunner, NewmanRunner};
use crate::config::RunnerConfig;

/// Builds a runner from configuration
pub type RunnerFactory = fn(&RunnerConfig) -> Arc<dyn CollectionRunner>;

/// Global registry of available backends
///
/// IndexMap keeps registration order so `runners` output is stable.
pub static RUNNERS: Lazy<IndexMap<&'static str, RunnerFactory>> = Lazy::new(|| {
    let mut m: IndexMap<&'static str, RunnerFactory> = IndexMap::new();

    m.insert("newman", newman);
    m.insert("dry-run", dry_run);

    m
});

fn newman(config: &RunnerConfig) -> Arc<dyn CollectionRunner> {
    Arc::new(NewmanRunner::new(&config.program))
}

fn dry_run(_: &RunnerConfig) -> Arc<dyn CollectionRunner> {
    Arc::new(DryRunRunner)
}

/// Build the runner registered under `name`
pub fn build_runner(name: &str, config: &RunnerConfig) -> Option<Arc<dyn CollectionRunner>> {
    RUNNERS.get(name).map(|factory| factory(config))
}

/// List all registered backend names
pub fn list_runners() -> Vec<&'static str> {
    RUNNERS.keys().copied().collect()
}
