//! Collection Runner - CI gate for saved API test collections
//!
//! Discovers collection files, pairs each with an optional iteration-data
//! file, runs them one at a time through an external collection runner
//! (newman), and reduces the whole batch to a single exit code.
//!
//! ## Modules
//!
//! - [`discovery`] - Collection listing and iteration-data resolution
//! - [`runner`] - Collection runner trait and backends (newman, dry-run)
//! - [`orchestrator`] - Planning and sequential, fail-fast execution
//! - [`config`] - YAML configuration
//! - [`api`] - Optional status HTTP API and Prometheus metrics

pub mod api;
pub mod config;
pub mod discovery;
pub mod orchestrator;
pub mod runner;
