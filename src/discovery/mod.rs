//! Collection discovery
//!
//! Finds the collections to run and pairs each one with an optional
//! iteration-data file.
//!
//! ## Naming convention
//!
//! A collection `Login.json` in the collection directory picks up
//! `{data_dir}/Login_Data.json` (or any other configured suffix) as its
//! iteration data. A collection with no matching data file runs once.

mod listing;
mod resolver;

pub use listing::{
    CollectionFilter, CollectionRef, DEFAULT_COLLECTION_EXTENSION, DiscoveryError, base_name,
    list_collections,
};
pub use resolver::{
    DEFAULT_DATA_SUFFIXES, DataFilePolicy, IterationDataRef, resolve_iteration_file,
};
