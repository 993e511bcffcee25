//! Collection Runner Test Kit
//!
//! Test infrastructure for exercising discovery and orchestration without
//! a real newman install.
//!
//! This crate provides:
//! - Temporary suite layouts (collection and data directories)
//! - A scripted collaborator that records invocations
//! - A fake `newman` executable for subprocess tests (unix only)
//!
//! # Example
//!
//! ```rust
//! use collection_runner_testkit::fixture::SuiteFixture;
//!
//! let suite = SuiteFixture::new()
//!     .with_collection("A")
//!     .with_collection("B")
//!     .with_data("A_Data.json");
//!
//! assert!(suite.collection_dir().join("A.json").exists());
//! assert!(suite.data_dir().join("A_Data.json").exists());
//! ```

pub mod fixture;
pub mod mock;
#[cfg(unix)]
pub mod newman;

// Re-exports for convenience
pub use fixture::SuiteFixture;
pub use mock::{MockCall, MockCollaborator, MockOutcome};
