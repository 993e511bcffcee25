//! Run orchestration
//!
//! Turns a suite into an ordered list of steps and runs them one at a time.
//!
//! ## Policy
//!
//! - Steps run strictly in sequence; each run is awaited before the next starts.
//! - The first failed run stops the batch. Later steps are never invoked.
//! - A runner fault (the collection could not be run at all) counts as a failure.
//! - Nothing is retried.
//!
//! The batch result is a single [`BatchOutcome`] whose exit code is the
//! program's only externally visible verdict.

mod batch;
mod plan;

pub use batch::{
    BatchObserver, BatchOptions, BatchOutcome, BatchStep, NoopObserver, StepFailure, run_batch,
};
pub use plan::{plan_dynamic, plan_static};
