//! Scripted collaborator for unit and integration tests
//!
//! `MockCollaborator` decides an outcome per collection name and records
//! every call in order. It does not depend on the runner trait; tests wrap
//! it in a small adapter implementing `CollectionRunner`.
//!
//! # Example
//!
//! ```rust
//! use collection_runner_testkit::mock::{MockCollaborator, MockOutcome};
//!
//! let mock = MockCollaborator::new().with_outcome("B", MockOutcome::Fail("1 assertion failed".into()));
//!
//! assert_eq!(mock.invoke("A", "/t/A.json", None), MockOutcome::Pass);
//! assert!(matches!(mock.invoke("B", "/t/B.json", None), MockOutcome::Fail(_)));
//! assert_eq!(mock.invoked_names(), vec!["A", "B"]);
//! ```

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What the collaborator reports for a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOutcome {
    /// Every assertion passed
    Pass,
    /// Assertions failed, with detail
    Fail(String),
    /// The collection could not be run at all
    Fault(String),
}

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub name: String,
    pub collection: PathBuf,
    pub iteration_data: Option<PathBuf>,
}

/// Collaborator answering from a script; unknown collections pass
#[derive(Debug, Clone, Default)]
pub struct MockCollaborator {
    script: HashMap<String, MockOutcome>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockCollaborator {
    /// Create a collaborator where every collection passes
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome for one collection
    pub fn with_outcome(mut self, name: impl Into<String>, outcome: MockOutcome) -> Self {
        self.script.insert(name.into(), outcome);
        self
    }

    /// Record a call and return its scripted outcome
    pub fn invoke(
        &self,
        name: &str,
        collection: impl AsRef<Path>,
        iteration_data: Option<&Path>,
    ) -> MockOutcome {
        self.calls.lock().push(MockCall {
            name: name.to_string(),
            collection: collection.as_ref().to_path_buf(),
            iteration_data: iteration_data.map(Path::to_path_buf),
        });
        self.script.get(name).cloned().unwrap_or(MockOutcome::Pass)
    }

    /// All calls so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Names of invoked collections, in order
    pub fn invoked_names(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.name.clone()).collect()
    }

    /// Number of calls so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}
