//! Configuration parsing
//!
//! Handles parsing of the suite configuration file.
//!
//! ## Configuration Format
//!
//! ```yaml
//! suite:
//!   name: smoke
//!   collection_dir: ./tests/postman/Tests/
//!   data_dir: ./tests/postman/PostmanData/
//!   collection_extension: .json
//!   data_suffixes: [_Data.json, _data.json]
//!
//! runner:
//!   backend: newman
//!   reporters: cli
//!   timeout_request: 10s
//!   bail: true
//!
//! # Optional: run these in order instead of discovering collections
//! steps:
//!   - collection: ./tests/postman/Tests/Login.json
//!     iteration_data: ./tests/postman/PostmanData/Login_Data.json
//!   - collection: ./tests/postman/Tests/Health.json
//! ```

mod suite;

pub use suite::{Config, ConfigError, RunMode, RunnerConfig, StepConfig, SuiteConfig};
