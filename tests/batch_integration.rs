//! End-to-end discovery + orchestration against a scripted collaborator

use async_trait::async_trait;
use collection_runner::config::Config;
use collection_runner::discovery::{
    CollectionFilter, DataFilePolicy, DiscoveryError, IterationDataRef,
};
use collection_runner::orchestrator::{
    BatchOptions, BatchStep, NoopObserver, plan_dynamic, plan_static, run_batch,
};
use collection_runner::runner::{CollectionRunner, RunConfig, RunResult, RunnerError};
use collection_runner_testkit::{MockCollaborator, MockOutcome, SuiteFixture};
use std::time::Duration;

/// Adapts the testkit collaborator to the runner trait
struct MockRunner(MockCollaborator);

#[async_trait]
impl CollectionRunner for MockRunner {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn description(&self) -> &'static str {
        "Scripted test collaborator"
    }

    async fn run(&self, config: &RunConfig) -> Result<RunResult, RunnerError> {
        match self.0.invoke(
            &config.name,
            &config.collection,
            config.iteration_data.as_path(),
        ) {
            MockOutcome::Pass => Ok(RunResult::passed(&config.name, Duration::ZERO)),
            MockOutcome::Fail(detail) => Ok(RunResult::failed(&config.name, detail, Duration::ZERO)),
            MockOutcome::Fault(detail) => Err(RunnerError::Internal(detail)),
        }
    }
}

async fn discover(suite: &SuiteFixture) -> Result<Vec<BatchStep>, DiscoveryError> {
    plan_dynamic(
        &suite.collection_dir(),
        &suite.data_dir(),
        &CollectionFilter::default(),
        &DataFilePolicy::default(),
    )
    .await
}

#[tokio::test]
async fn test_data_file_paired_by_name() {
    let suite = SuiteFixture::new()
        .with_collection("A")
        .with_collection("B")
        .with_data("A_Data.json");

    let mock = MockCollaborator::new();
    let steps = discover(&suite).await.unwrap();
    let outcome = run_batch(
        &steps,
        &MockRunner(mock.clone()),
        &BatchOptions::default(),
        &NoopObserver,
    )
    .await;

    assert_eq!(outcome.exit_code(), 0);

    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].name, "A");
    assert_eq!(calls[0].iteration_data, Some(suite.data_path("A_Data.json")));
    assert_eq!(calls[1].name, "B");
    assert_eq!(calls[1].iteration_data, None);
}

#[tokio::test]
async fn test_failure_in_middle_stops_batch() {
    let suite = SuiteFixture::new()
        .with_collection("A")
        .with_collection("B")
        .with_collection("C");

    let mock = MockCollaborator::new().with_outcome("B", MockOutcome::Fail("expected 200, got 500".into()));
    let steps = discover(&suite).await.unwrap();
    let outcome = run_batch(
        &steps,
        &MockRunner(mock.clone()),
        &BatchOptions::default(),
        &NoopObserver,
    )
    .await;

    assert_ne!(outcome.exit_code(), 0);
    assert_eq!(mock.invoked_names(), vec!["A", "B"]);
    assert_eq!(outcome.failure.unwrap().collection, "B");
}

#[tokio::test]
async fn test_fault_stops_batch() {
    let suite = SuiteFixture::new()
        .with_collection("A")
        .with_collection("B");

    let mock = MockCollaborator::new().with_outcome("A", MockOutcome::Fault("invalid collection".into()));
    let steps = discover(&suite).await.unwrap();
    let outcome = run_batch(
        &steps,
        &MockRunner(mock.clone()),
        &BatchOptions::default(),
        &NoopObserver,
    )
    .await;

    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(mock.invoked_names(), vec!["A"]);
}

#[tokio::test]
async fn test_missing_collection_dir_invokes_nothing() {
    let suite = SuiteFixture::new().with_collection("A");
    let missing = suite.root().join("NoSuchDir");
    let mock = MockCollaborator::new();

    let planned = plan_dynamic(
        &missing,
        &suite.data_dir(),
        &CollectionFilter::default(),
        &DataFilePolicy::default(),
    )
    .await;

    let outcome = match planned {
        Ok(steps) => Some(
            run_batch(
                &steps,
                &MockRunner(mock.clone()),
                &BatchOptions::default(),
                &NoopObserver,
            )
            .await,
        ),
        Err(e) => {
            assert!(matches!(e, DiscoveryError::ReadDir { .. }));
            None
        }
    };

    assert!(outcome.is_none());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_non_collection_files_are_ignored() {
    let suite = SuiteFixture::new()
        .with_collection("A")
        .with_collection_file("README.md", "# notes")
        .with_collection_file(".DS_Store", "");

    let steps = discover(&suite).await.unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].collection.name(), "A");
}

#[tokio::test]
async fn test_empty_suite_succeeds() {
    let suite = SuiteFixture::new();
    let mock = MockCollaborator::new();

    let steps = discover(&suite).await.unwrap();
    let outcome = run_batch(
        &steps,
        &MockRunner(mock.clone()),
        &BatchOptions::default(),
        &NoopObserver,
    )
    .await;

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_static_list_runs_in_given_order() {
    let suite = SuiteFixture::new()
        .with_collection("Alpha")
        .with_collection("Zeta")
        .with_data("Alpha_data.json");

    let yaml = format!(
        r"
steps:
  - collection: {zeta}
  - collection: {alpha}
    iteration_data: {data}
",
        zeta = suite.collection_path("Zeta").display(),
        alpha = suite.collection_path("Alpha").display(),
        data = suite.data_path("Alpha_data.json").display(),
    );
    let config = Config::from_yaml(&yaml).unwrap();
    let steps = plan_static(&config.steps, &config.suite.collection_extension);

    let mock = MockCollaborator::new();
    let outcome = run_batch(
        &steps,
        &MockRunner(mock.clone()),
        &config.batch_options(),
        &NoopObserver,
    )
    .await;

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(mock.invoked_names(), vec!["Zeta", "Alpha"]);
    assert_eq!(
        mock.calls()[1].iteration_data,
        Some(suite.data_path("Alpha_data.json"))
    );
    assert_eq!(steps[0].iteration_data, IterationDataRef::Absent);
}
