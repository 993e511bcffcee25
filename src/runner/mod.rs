//! Collection runner backends
//!
//! This module provides the `CollectionRunner` trait and the backends that
//! execute a single collection on behalf of the orchestrator.
//!
//! ## Backends
//!
//! - **newman**: spawns the newman CLI once per collection
//! - **dry-run**: logs the planned invocation and reports success
//!
//! ## Adding a Backend
//!
//! 1. Create a new file in `src/runner/`
//! 2. Implement the `CollectionRunner` trait
//! 3. Register a factory in `registry.rs`

mod dry_run;
mod newman;
pub mod registry;
mod traits;

pub use dry_run::DryRunRunner;
pub use newman::{DEFAULT_PROGRAM, NewmanRunner};
pub use registry::{RUNNERS, build_runner, list_runners};
pub use traits::*;
