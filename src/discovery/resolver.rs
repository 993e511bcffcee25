//! Iteration-data resolution
//!
//! Pairs a collection with its companion data file by naming convention:
//! `{data_dir}/{collection_name}{suffix}`. Suffixes are tried in order and
//! the first existing file wins, so at most one data file is ever attached
//! to a collection.
//!
//! A missing data file is the normal case, not an error. The existence
//! check races with anything else touching the directory; if the file
//! vanishes before use, the collection runner reports that failure itself.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::listing::CollectionRef;

/// Suffixes tried by default, in order
pub const DEFAULT_DATA_SUFFIXES: &[&str] = &["_Data.json", "_data.json"];

/// Optional iteration data for a collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "path")]
pub enum IterationDataRef {
    /// Run once per row of this data file
    Present(PathBuf),
    /// Run exactly once, no data-driven iteration
    #[default]
    Absent,
}

impl IterationDataRef {
    /// Whether a data file is attached
    pub fn is_present(&self) -> bool {
        matches!(self, IterationDataRef::Present(_))
    }

    /// The data file path, if any
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            IterationDataRef::Present(path) => Some(path),
            IterationDataRef::Absent => None,
        }
    }
}

impl From<Option<PathBuf>> for IterationDataRef {
    fn from(path: Option<PathBuf>) -> Self {
        path.map_or(IterationDataRef::Absent, IterationDataRef::Present)
    }
}

impl std::fmt::Display for IterationDataRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IterationDataRef::Present(path) => write!(f, "{}", path.display()),
            IterationDataRef::Absent => write!(f, "-"),
        }
    }
}

/// How data file names are derived from collection names
///
/// Existing suites mix `_Data.json` and `_data.json`; on a case-sensitive
/// filesystem those are different files, so both are listed and checked
/// in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFilePolicy {
    suffixes: Vec<String>,
}

impl Default for DataFilePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_SUFFIXES.iter().map(|s| s.to_string()))
    }
}

impl DataFilePolicy {
    /// Create a policy from an ordered list of suffixes
    pub fn new(suffixes: impl IntoIterator<Item = String>) -> Self {
        Self {
            suffixes: suffixes.into_iter().collect(),
        }
    }

    /// Configured suffixes in lookup order
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Candidate data file paths for a collection, in lookup order
    pub fn candidates<'a>(
        &'a self,
        data_dir: &'a Path,
        collection_name: &'a str,
    ) -> impl Iterator<Item = PathBuf> + 'a {
        self.suffixes
            .iter()
            .map(move |suffix| data_dir.join(format!("{collection_name}{suffix}")))
    }
}

/// Resolve the iteration-data file for a collection
///
/// Candidates are built from the collection's base name, i.e. its file
/// name with the collection extension stripped (`Orders.v2.json` looks for
/// `Orders.v2_Data.json`). Never fails: anything other than an existing
/// regular file resolves to [`IterationDataRef::Absent`].
pub async fn resolve_iteration_file(
    collection: &CollectionRef,
    data_dir: &Path,
    policy: &DataFilePolicy,
) -> IterationDataRef {
    for candidate in policy.candidates(data_dir, collection.name()) {
        match tokio::fs::metadata(&candidate).await {
            Ok(meta) if meta.is_file() => {
                debug!(
                    collection = collection.name(),
                    data = %candidate.display(),
                    "Found iteration data"
                );
                return IterationDataRef::Present(candidate);
            }
            Ok(_) => {
                debug!(candidate = %candidate.display(), "Candidate is not a file");
            }
            Err(e) => {
                debug!(candidate = %candidate.display(), error = %e, "No iteration data at candidate");
            }
        }
    }

    IterationDataRef::Absent
}
