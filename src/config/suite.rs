//! Suite configuration types
//!
//! Defines the structure of the YAML configuration file. Every field has a
//! default matching the conventional `tests/postman/` layout, so an empty
//! file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::discovery::{
    CollectionFilter, CollectionRef, DEFAULT_COLLECTION_EXTENSION, DEFAULT_DATA_SUFFIXES,
    DataFilePolicy, IterationDataRef,
};
use crate::orchestrator::{BatchOptions, BatchStep, plan_static};
use crate::runner::{DEFAULT_PROGRAM, DEFAULT_REPORTERS, DEFAULT_REQUEST_TIMEOUT, RUNNERS};

/// Smallest request timeout newman can express (it takes whole milliseconds)
const MIN_TIMEOUT_REQUEST: Duration = Duration::from_millis(1);

/// Errors that can occur during configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How the batch is assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// List the collection directory and resolve data files by convention
    Discovery,
    /// Run the hand-written `steps` list in order
    Static,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Discovery => write!(f, "discovery"),
            RunMode::Static => write!(f, "static"),
        }
    }
}

/// Where collections and their data live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Suite name
    #[serde(default = "default_suite_name")]
    pub name: String,

    /// Directory holding one file per collection
    #[serde(default = "default_collection_dir")]
    pub collection_dir: PathBuf,

    /// Directory holding iteration-data files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File extension identifying collections; stripped to get the base name
    #[serde(default = "default_collection_extension")]
    pub collection_extension: String,

    /// Data file suffixes appended to the base name, tried in order
    #[serde(default = "default_data_suffixes")]
    pub data_suffixes: Vec<String>,

    /// Environment file passed to every run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<PathBuf>,
}

fn default_suite_name() -> String {
    "default".to_string()
}

fn default_collection_dir() -> PathBuf {
    PathBuf::from("./tests/postman/Tests/")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./tests/postman/PostmanData/")
}

fn default_collection_extension() -> String {
    DEFAULT_COLLECTION_EXTENSION.to_string()
}

fn default_data_suffixes() -> Vec<String> {
    DEFAULT_DATA_SUFFIXES.iter().map(|s| s.to_string()).collect()
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            name: default_suite_name(),
            collection_dir: default_collection_dir(),
            data_dir: default_data_dir(),
            collection_extension: default_collection_extension(),
            data_suffixes: default_data_suffixes(),
            environment: None,
        }
    }
}

impl SuiteConfig {
    /// Discovery filter built from `collection_extension`
    pub fn collection_filter(&self) -> CollectionFilter {
        CollectionFilter::new(&self.collection_extension)
    }

    /// Data file lookup policy built from `data_suffixes`
    pub fn data_file_policy(&self) -> DataFilePolicy {
        DataFilePolicy::new(self.data_suffixes.iter().cloned())
    }
}

/// Collection runner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Registered backend name
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Executable for the newman backend
    #[serde(default = "default_program")]
    pub program: String,

    /// Reporter(s) passed to the runner
    #[serde(default = "default_reporters")]
    pub reporters: String,

    /// Per-request timeout; `~` disables it
    #[serde(default = "default_timeout_request", with = "humantime_serde")]
    pub timeout_request: Option<Duration>,

    /// Stop a collection on its first failing request
    #[serde(default = "default_bail")]
    pub bail: bool,
}

fn default_backend() -> String {
    "newman".to_string()
}

fn default_program() -> String {
    DEFAULT_PROGRAM.to_string()
}

fn default_reporters() -> String {
    DEFAULT_REPORTERS.to_string()
}

fn default_timeout_request() -> Option<Duration> {
    Some(DEFAULT_REQUEST_TIMEOUT)
}

fn default_bail() -> bool {
    true
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            program: default_program(),
            reporters: default_reporters(),
            timeout_request: default_timeout_request(),
            bail: default_bail(),
        }
    }
}

/// One entry of a hand-written run list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Path to the collection file
    pub collection: PathBuf,

    /// Iteration data for this collection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration_data: Option<PathBuf>,
}

impl StepConfig {
    /// Convert to a batch step, deriving the name with `extension`
    pub fn to_batch_step(&self, extension: &str) -> BatchStep {
        BatchStep::new(
            CollectionRef::from_path(&self.collection, extension),
            IterationDataRef::from(self.iteration_data.clone()),
        )
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Collection and data locations
    #[serde(default)]
    pub suite: SuiteConfig,

    /// Runner backend settings
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Explicit run list; when non-empty, discovery is skipped
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepConfig>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    ///
    /// An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discovery or static list, depending on `steps`
    pub fn mode(&self) -> RunMode {
        if self.steps.is_empty() {
            RunMode::Discovery
        } else {
            RunMode::Static
        }
    }

    /// Per-run options shared by every step
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            reporters: self.runner.reporters.clone(),
            timeout_request: self.runner.timeout_request,
            bail: self.runner.bail,
            environment: self.suite.environment.clone(),
        }
    }

    /// Steps of the static run list
    pub fn static_steps(&self) -> Vec<BatchStep> {
        plan_static(&self.steps, &self.suite.collection_extension)
    }

    /// Reject configurations that cannot produce a meaningful run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.suite.collection_extension.is_empty() {
            return Err(ConfigError::Invalid(
                "suite.collection_extension must not be empty".to_string(),
            ));
        }

        if self.suite.data_suffixes.is_empty() {
            return Err(ConfigError::Invalid(
                "suite.data_suffixes must list at least one suffix".to_string(),
            ));
        }

        if let Some(suffix) = self.suite.data_suffixes.iter().find(|s| s.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "suite.data_suffixes contains an empty suffix ({suffix:?})"
            )));
        }

        if let Some(timeout) = self
            .runner
            .timeout_request
            .filter(|t| *t < MIN_TIMEOUT_REQUEST)
        {
            return Err(ConfigError::Invalid(format!(
                "runner.timeout_request must be at least 1ms (got {timeout:?})"
            )));
        }

        if !RUNNERS.contains_key(self.runner.backend.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown runner backend '{}'",
                self.runner.backend
            )));
        }

        if let Some(idx) = self
            .steps
            .iter()
            .position(|s| s.collection.as_os_str().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "steps[{idx}] has an empty collection path"
            )));
        }

        Ok(())
    }

    /// Generate a default configuration
    pub fn default_config() -> Self {
        Config {
            suite: SuiteConfig {
                name: "smoke".to_string(),
                ..SuiteConfig::default()
            },
            runner: RunnerConfig::default(),
            steps: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r"
suite:
  name: lost-smoke
  collection_dir: ./api/Tests/
  data_dir: ./api/Data/
  data_suffixes: [_data.json]
  environment: ./api/Environments/dev.json
runner:
  timeout_request: 30s
  bail: false
";

    const STATIC_CONFIG: &str = r"
suite:
  collection_extension: .postman_collection.json
runner:
  backend: dry-run
  timeout_request: ~
steps:
  - collection: ./tests/Login.postman_collection.json
    iteration_data: ./data/Login_Data.json
  - collection: ./tests/Health.postman_collection.json
";

    #[test]
    fn test_parse_config() {
        let config = Config::from_yaml(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.suite.name, "lost-smoke");
        assert_eq!(config.suite.collection_dir, PathBuf::from("./api/Tests/"));
        assert_eq!(config.suite.data_suffixes, vec!["_data.json".to_string()]);
        assert_eq!(
            config.suite.environment,
            Some(PathBuf::from("./api/Environments/dev.json"))
        );
        assert_eq!(config.runner.timeout_request, Some(Duration::from_secs(30)));
        assert!(!config.runner.bail);
        assert_eq!(config.mode(), RunMode::Discovery);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(
            config.suite.collection_dir,
            PathBuf::from("./tests/postman/Tests/")
        );
        assert_eq!(
            config.suite.data_dir,
            PathBuf::from("./tests/postman/PostmanData/")
        );
        assert_eq!(config.suite.collection_extension, ".json");
        assert_eq!(config.suite.data_suffixes, vec!["_Data.json", "_data.json"]);
        assert_eq!(config.runner.backend, "newman");
        assert_eq!(config.runner.reporters, "cli");
        assert_eq!(config.runner.timeout_request, Some(Duration::from_secs(10)));
        assert!(config.runner.bail);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_static_mode() {
        let config = Config::from_yaml(STATIC_CONFIG).unwrap();
        assert_eq!(config.mode(), RunMode::Static);
        assert_eq!(config.runner.timeout_request, None);

        let steps = config.static_steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].collection.name(), "Login");
        assert_eq!(
            steps[0].iteration_data,
            IterationDataRef::Present(PathBuf::from("./data/Login_Data.json"))
        );
        assert_eq!(steps[1].collection.name(), "Health");
        assert_eq!(steps[1].iteration_data, IterationDataRef::Absent);
    }

    #[test]
    fn test_batch_options() {
        let config = Config::from_yaml(SAMPLE_CONFIG).unwrap();
        let opts = config.batch_options();
        assert_eq!(opts.reporters, "cli");
        assert_eq!(opts.timeout_request, Some(Duration::from_secs(30)));
        assert!(!opts.bail);
        assert_eq!(
            opts.environment,
            Some(PathBuf::from("./api/Environments/dev.json"))
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.suite.collection_extension.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.suite.data_suffixes.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.runner.timeout_request = Some(Duration::ZERO);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.runner.timeout_request = Some(Duration::from_micros(500));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.runner.timeout_request = Some(Duration::from_millis(1));
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.runner.backend = "postman-desktop".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.steps.push(StepConfig {
            collection: PathBuf::new(),
            iteration_data: None,
        });
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unparseable_yaml() {
        let err = Config::from_yaml("suite: [not, a, map]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_roundtrip() {
        let config = Config::default_config();
        let yaml = config.to_yaml().unwrap();
        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.suite.name, parsed.suite.name);
        assert_eq!(config.runner.timeout_request, parsed.runner.timeout_request);
        assert_eq!(config.suite.data_suffixes, parsed.suite.data_suffixes);
    }
}
