//! Temporary suite layouts
//!
//! Mirrors the conventional `Tests/` + `PostmanData/` layout inside a
//! temporary directory that is removed on drop.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Minimal Postman v2.1 collection document
pub fn collection_json(name: &str) -> String {
    serde_json::json!({
        "info": {
            "name": name,
            "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"
        },
        "item": []
    })
    .to_string()
}

/// A temporary suite with collection and data directories
#[derive(Debug)]
pub struct SuiteFixture {
    root: TempDir,
}

impl Default for SuiteFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl SuiteFixture {
    /// Create empty `Tests/` and `PostmanData/` directories
    ///
    /// # Panics
    /// Panics if the temporary directory cannot be created.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("Tests")).expect("create Tests dir");
        std::fs::create_dir_all(root.path().join("PostmanData")).expect("create PostmanData dir");
        Self { root }
    }

    /// Root of the fixture
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Directory holding collections
    pub fn collection_dir(&self) -> PathBuf {
        self.root.path().join("Tests")
    }

    /// Directory holding iteration data
    pub fn data_dir(&self) -> PathBuf {
        self.root.path().join("PostmanData")
    }

    /// Add `{name}.json` to the collection directory
    pub fn with_collection(self, name: &str) -> Self {
        let file = format!("{name}.json");
        self.with_collection_file(&file, &collection_json(name))
    }

    /// Add an arbitrary file to the collection directory
    pub fn with_collection_file(self, file_name: &str, contents: &str) -> Self {
        std::fs::write(self.collection_dir().join(file_name), contents)
            .expect("write collection file");
        self
    }

    /// Add a data file (full file name, e.g. `A_Data.json`) with one row
    pub fn with_data(self, file_name: &str) -> Self {
        let rows = serde_json::json!([{ "row": 1 }]).to_string();
        std::fs::write(self.data_dir().join(file_name), rows).expect("write data file");
        self
    }

    /// Path of a collection added with [`with_collection`](Self::with_collection)
    pub fn collection_path(&self, name: &str) -> PathBuf {
        self.collection_dir().join(format!("{name}.json"))
    }

    /// Path of a data file in the data directory
    pub fn data_path(&self, file_name: &str) -> PathBuf {
        self.data_dir().join(file_name)
    }
}
