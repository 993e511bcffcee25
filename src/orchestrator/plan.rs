//! Batch planning
//!
//! Builds the ordered step list for either mode: discovery (list the
//! collection directory, resolve data files by convention) or a static
//! hand-written list.

use std::path::Path;
use tracing::info;

use super::batch::BatchStep;
use crate::config::StepConfig;
use crate::discovery::{
    CollectionFilter, DataFilePolicy, DiscoveryError, list_collections, resolve_iteration_file,
};

/// Discover collections in `collection_dir` and pair each with its data file
///
/// Fails only if the collection directory cannot be read; a missing data
/// directory just means no collection has iteration data.
pub async fn plan_dynamic(
    collection_dir: &Path,
    data_dir: &Path,
    filter: &CollectionFilter,
    policy: &DataFilePolicy,
) -> Result<Vec<BatchStep>, DiscoveryError> {
    let collections = list_collections(collection_dir, filter).await?;

    let mut steps = Vec::with_capacity(collections.len());
    for collection in collections {
        let iteration_data = resolve_iteration_file(&collection, data_dir, policy).await;
        steps.push(BatchStep::new(collection, iteration_data));
    }

    info!(
        collection_dir = %collection_dir.display(),
        collections = steps.len(),
        with_data = steps.iter().filter(|s| s.iteration_data.is_present()).count(),
        "Discovered collections"
    );

    Ok(steps)
}

/// Steps from a hand-written list, in the order given
///
/// Paths are taken as-is; a missing file surfaces as a runner failure
/// when its step executes.
pub fn plan_static(steps: &[StepConfig], extension: &str) -> Vec<BatchStep> {
    steps.iter().map(|s| s.to_batch_step(extension)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::IterationDataRef;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_pairs_data_by_name() {
        let root = tempfile::tempdir().unwrap();
        let tests = root.path().join("Tests");
        let data = root.path().join("Data");
        std::fs::create_dir_all(&tests).unwrap();
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(tests.join("A.json"), "{}").unwrap();
        std::fs::write(tests.join("B.json"), "{}").unwrap();
        std::fs::write(data.join("A_Data.json"), "[]").unwrap();

        let steps = plan_dynamic(
            &tests,
            &data,
            &CollectionFilter::default(),
            &DataFilePolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].collection.name(), "A");
        assert_eq!(
            steps[0].iteration_data,
            IterationDataRef::Present(data.join("A_Data.json"))
        );
        assert_eq!(steps[1].collection.name(), "B");
        assert_eq!(steps[1].iteration_data, IterationDataRef::Absent);
    }

    #[tokio::test]
    async fn test_missing_collection_dir_fails() {
        let root = tempfile::tempdir().unwrap();
        let result = plan_dynamic(
            &root.path().join("missing"),
            root.path(),
            &CollectionFilter::default(),
            &DataFilePolicy::default(),
        )
        .await;
        assert!(matches!(result, Err(DiscoveryError::ReadDir { .. })));
    }

    #[test]
    fn test_static_plan_keeps_order() {
        let steps = vec![
            StepConfig {
                collection: PathBuf::from("tests/Zeta.json"),
                iteration_data: None,
            },
            StepConfig {
                collection: PathBuf::from("tests/Alpha.json"),
                iteration_data: Some(PathBuf::from("data/Alpha_data.json")),
            },
        ];

        let plan = plan_static(&steps, ".json");
        assert_eq!(plan[0].collection.name(), "Zeta");
        assert_eq!(plan[1].collection.name(), "Alpha");
        assert!(plan[1].iteration_data.is_present());
    }
}
