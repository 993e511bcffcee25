//! Collection directory listing
//!
//! Enumerates the collection directory, keeps only entries matching the
//! configured extension, and returns them sorted by name so runs are
//! reproducible across filesystems.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Default extension for collection files
pub const DEFAULT_COLLECTION_EXTENSION: &str = ".json";

/// Errors that can occur while discovering collections
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to read collection directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single test collection on disk
///
/// Immutable once created; `name` is the file name with the collection
/// extension stripped and is what iteration data is matched against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionRef {
    path: PathBuf,
    name: String,
}

impl CollectionRef {
    /// Build a reference from a collection path, stripping `extension`
    /// from the file name to derive the base name
    pub fn from_path(path: impl Into<PathBuf>, extension: &str) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = base_name(&file_name, extension).to_string();
        Self { path, name }
    }

    /// Location of the collection file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name without extension
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Strip a known trailing extension from a file name
///
/// The extension is matched ASCII case-insensitively, so `Users.v2.json`
/// yields `Users.v2` rather than `Users`. If the name does not carry the
/// extension, only its final `.xxx` component is removed.
pub fn base_name<'a>(file_name: &'a str, extension: &str) -> &'a str {
    if !extension.is_empty() && file_name.len() > extension.len() {
        let split = file_name.len() - extension.len();
        if let (Some(stem), Some(tail)) = (file_name.get(..split), file_name.get(split..)) {
            if tail.eq_ignore_ascii_case(extension) {
                return stem;
            }
        }
    }

    match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    }
}

/// Which directory entries count as collections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFilter {
    extension: String,
}

impl Default for CollectionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_COLLECTION_EXTENSION)
    }
}

impl CollectionFilter {
    /// Accept files ending in `extension` (e.g. `.json` or `.postman_collection.json`)
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// The extension this filter accepts
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether a file name is a collection under this filter
    pub fn matches(&self, file_name: &str) -> bool {
        if file_name.len() <= self.extension.len() {
            return false;
        }
        let split = file_name.len() - self.extension.len();
        file_name
            .get(split..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(&self.extension))
    }
}

/// List the collections in `dir`, sorted by name
///
/// Subdirectories and files not matching `filter` are skipped. A directory
/// that cannot be read is a `DiscoveryError`; an empty directory is not.
pub async fn list_collections(
    dir: &Path,
    filter: &CollectionFilter,
) -> Result<Vec<CollectionRef>, DiscoveryError> {
    let read_err = |source| DiscoveryError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;
    let mut collections = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let path = entry.path();
        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %path.display(), "Skipping entry with non UTF-8 name");
            continue;
        };

        if !filter.matches(&file_name) {
            debug!(file = %file_name, extension = filter.extension(), "Skipping non-collection entry");
            continue;
        }

        // Follow symlinks so linked collections are picked up
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                debug!(file = %file_name, "Skipping directory");
                continue;
            }
            Err(e) => {
                warn!(file = %file_name, error = %e, "Skipping unreadable entry");
                continue;
            }
        }

        collections.push(CollectionRef::from_path(path, filter.extension()));
    }

    collections.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));

    debug!(
        dir = %dir.display(),
        count = collections.len(),
        "Collection discovery complete"
    );

    Ok(collections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_strips_known_extension() {
        assert_eq!(base_name("Login.json", ".json"), "Login");
        assert_eq!(base_name("Users.v2.json", ".json"), "Users.v2");
        assert_eq!(base_name("LOGIN.JSON", ".json"), "LOGIN");
        assert_eq!(
            base_name("Smoke.postman_collection.json", ".postman_collection.json"),
            "Smoke"
        );
    }

    #[test]
    fn test_base_name_falls_back_to_last_extension() {
        assert_eq!(base_name("Login.yaml", ".json"), "Login");
        assert_eq!(base_name("README", ".json"), "README");
        assert_eq!(base_name(".hidden", ".json"), ".hidden");
        assert_eq!(base_name(".json", ".json"), ".json");
    }

    #[test]
    fn test_filter_matches() {
        let filter = CollectionFilter::default();
        assert!(filter.matches("A.json"));
        assert!(filter.matches("A.JSON"));
        assert!(!filter.matches("A.txt"));
        assert!(!filter.matches(".json"));
        assert!(!filter.matches("notes.md"));
    }

    #[test]
    fn test_collection_ref_from_path() {
        let r = CollectionRef::from_path("/tmp/tests/Orders.v1.json", ".json");
        assert_eq!(r.name(), "Orders.v1");
        assert_eq!(r.path(), Path::new("/tmp/tests/Orders.v1.json"));
        assert_eq!(r.to_string(), "Orders.v1");
    }

    #[tokio::test]
    async fn test_list_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "A.json", "c.json", "notes.txt"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.json")).unwrap();

        let found = list_collections(dir.path(), &CollectionFilter::default())
            .await
            .unwrap();
        let names: Vec<_> = found.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["A", "b", "c"]);
    }

    #[tokio::test]
    async fn test_list_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let found = list_collections(dir.path(), &CollectionFilter::default())
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = list_collections(&missing, &CollectionFilter::default())
            .await
            .unwrap_err();
        match err {
            DiscoveryError::ReadDir { path, .. } => assert_eq!(path, missing),
        }
    }
}
