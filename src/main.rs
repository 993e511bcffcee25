//! Collection Runner CLI
//!
//! Run saved API test collections through newman and fail the build when
//! any of them fails.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use collection_runner::api::{ApiState, start_api_server};
use collection_runner::config::{Config, RunMode, RunnerConfig};
use collection_runner::orchestrator::{BatchStep, plan_dynamic, run_batch};
use collection_runner::runner::{RUNNERS, build_runner};

/// Configuration file picked up when `--config` is not given
const DEFAULT_CONFIG_FILE: &str = "collections.yaml";

/// Collection Runner - run API test collections as a CI gate
#[derive(Debug, Parser)]
#[command(name = "collection-runner")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where to find the suite
#[derive(Debug, Args)]
struct SuiteArgs {
    /// Path to configuration file (defaults to ./collections.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing collection files
    #[arg(long)]
    collection_dir: Option<PathBuf>,

    /// Directory containing iteration-data files
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlanFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run every collection in order, stopping at the first failure
    Run {
        #[command(flatten)]
        suite: SuiteArgs,

        /// Runner backend (see `runners`)
        #[arg(short, long)]
        runner: Option<String>,

        /// Per-request timeout (e.g. 10s, 1m)
        #[arg(short, long, value_parser = parse_duration, conflicts_with = "no_timeout")]
        timeout: Option<Duration>,

        /// Disable the per-request timeout
        #[arg(long)]
        no_timeout: bool,

        /// Let each collection continue past failing requests
        #[arg(long)]
        no_bail: bool,

        /// Log the planned runs without executing them
        #[arg(long, conflicts_with = "runner")]
        dry_run: bool,

        /// Start HTTP status API on this port
        #[arg(long)]
        api_port: Option<u16>,

        /// Keep running after the batch completes (for API access)
        #[arg(long, requires = "api_port")]
        keep_alive: bool,
    },

    /// Show the planned runs and their iteration data
    List {
        #[command(flatten)]
        suite: SuiteArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: PlanFormat,
    },

    /// Generate a default configuration file
    Init {
        /// Output file path
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        output: String,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: String,
    },

    /// List available runner backends
    Runners,
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(s).map_err(|e| e.to_string())
}

fn setup_logging(verbose: bool, json: bool) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr so newman's report owns stdout
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.json);

    match cli.command {
        Commands::Run {
            suite,
            runner,
            timeout,
            no_timeout,
            no_bail,
            dry_run,
            api_port,
            keep_alive,
        } => {
            let mut config = load_config(&suite)?;
            if let Some(backend) = runner {
                config.runner.backend = backend;
            }
            if dry_run {
                config.runner.backend = "dry-run".to_string();
            }
            if let Some(timeout) = timeout {
                config.runner.timeout_request = Some(timeout);
            }
            if no_timeout {
                config.runner.timeout_request = None;
            }
            if no_bail {
                config.runner.bail = false;
            }
            config.validate().context("Invalid configuration")?;

            run_collections(&config, api_port, keep_alive).await
        }

        Commands::List { suite, format } => {
            let config = load_config(&suite)?;
            config.validate().context("Invalid configuration")?;
            list_plan(&config, format).await?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Init { output } => {
            init_config(&output)?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Validate { config } => {
            validate_config(&config)?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Runners => {
            list_runners();
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Load configuration from `--config`, the default file, or built-in defaults,
/// then apply directory overrides
fn load_config(args: &SuiteArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Config::from_file(DEFAULT_CONFIG_FILE)
            .with_context(|| format!("Failed to load config from {DEFAULT_CONFIG_FILE}"))?,
        None => {
            tracing::debug!("No configuration file, using defaults");
            Config::default()
        }
    };

    if config.mode() == RunMode::Static
        && (args.collection_dir.is_some() || args.data_dir.is_some())
    {
        tracing::warn!(
            steps = config.steps.len(),
            "--collection-dir/--data-dir are ignored: the configuration lists its steps explicitly"
        );
    }

    if let Some(dir) = &args.collection_dir {
        config.suite.collection_dir = dir.clone();
    }
    if let Some(dir) = &args.data_dir {
        config.suite.data_dir = dir.clone();
    }

    Ok(config)
}

/// Build the ordered step list for the configured mode
async fn plan_steps(config: &Config) -> Result<Vec<BatchStep>> {
    match config.mode() {
        RunMode::Discovery => plan_dynamic(
            &config.suite.collection_dir,
            &config.suite.data_dir,
            &config.suite.collection_filter(),
            &config.suite.data_file_policy(),
        )
        .await
        .context("Collection discovery failed"),
        RunMode::Static => Ok(config.static_steps()),
    }
}

/// Run the batch and map its outcome to the process exit code
async fn run_collections(
    config: &Config,
    api_port: Option<u16>,
    keep_alive: bool,
) -> Result<ExitCode> {
    tracing::info!(
        suite = %config.suite.name,
        mode = %config.mode(),
        runner = %config.runner.backend,
        "Loading suite"
    );

    let steps = plan_steps(config).await?;

    let runner = build_runner(&config.runner.backend, &config.runner)
        .with_context(|| format!("Unknown runner backend '{}'", config.runner.backend))?;

    if steps.is_empty() {
        tracing::warn!("No collections to run");
    } else {
        runner
            .preflight()
            .await
            .context("Collection runner is not usable")?;
    }

    let api_state = ApiState::new();
    api_state.set_total_collections(steps.len());

    if let Some(port) = api_port {
        let state_clone = api_state.clone();
        tokio::spawn(async move {
            if let Err(e) = start_api_server(port, state_clone).await {
                tracing::error!(error = %e, "API server error");
            }
        });
        // Give the server a moment to start
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let outcome = run_batch(&steps, runner.as_ref(), &config.batch_options(), &api_state).await;

    if let Some(failure) = &outcome.failure {
        tracing::error!(
            step = failure.step,
            collection = %failure.collection,
            error = %failure.error,
            "Batch stopped at first failure"
        );
    }

    if keep_alive && api_port.is_some() {
        tracing::info!("Keeping alive for API access. Press Ctrl+C to exit.");
        loop {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
    }

    Ok(ExitCode::from(u8::try_from(outcome.exit_code()).unwrap_or(1)))
}

/// Print the planned runs
async fn list_plan(config: &Config, format: PlanFormat) -> Result<()> {
    let steps = plan_steps(config).await?;

    match format {
        PlanFormat::Json => {
            let json = serde_json::to_string_pretty(&steps).context("Failed to serialize plan")?;
            println!("{json}");
        }
        PlanFormat::Text => {
            println!("Suite: {} ({} mode)", config.suite.name, config.mode());
            println!();
            if steps.is_empty() {
                println!("  (no collections)");
            }
            for (idx, step) in steps.iter().enumerate() {
                println!(
                    "  {:>3}. {:30} {}",
                    idx + 1,
                    step.collection.name(),
                    step.collection.path().display()
                );
                if let Some(data) = step.iteration_data.as_path() {
                    println!("       data: {}", data.display());
                }
            }
        }
    }

    Ok(())
}

/// Generate a default configuration file
fn init_config(output: &str) -> Result<()> {
    let config = Config::default_config();
    let yaml = config.to_yaml().context("Failed to serialize config")?;

    std::fs::write(output, &yaml).with_context(|| format!("Failed to write config to {output}"))?;

    tracing::info!(path = %output, "Configuration file created");
    println!("Created {output}");
    println!();
    println!("Edit the file to point at your collections, then run:");
    println!("  collection-runner run --config {output}");

    Ok(())
}

/// Validate a configuration file
fn validate_config(config_path: &str) -> Result<()> {
    tracing::info!(config = %config_path, "Validating configuration");

    let config = Config::from_file(config_path)
        .with_context(|| format!("Failed to load config from {config_path}"))?;
    config.validate().context("Invalid configuration")?;

    println!("Configuration is valid!");
    println!();
    println!("Suite: {}", config.suite.name);
    println!("Mode: {}", config.mode());
    match config.mode() {
        RunMode::Discovery => {
            println!("Collections: {}", config.suite.collection_dir.display());
            println!("Data: {}", config.suite.data_dir.display());
            println!("Data suffixes: {}", config.suite.data_suffixes.join(", "));
        }
        RunMode::Static => {
            println!("Steps: {}", config.steps.len());
            for step in &config.steps {
                match &step.iteration_data {
                    Some(data) => println!(
                        "  - {} (data: {})",
                        step.collection.display(),
                        data.display()
                    ),
                    None => println!("  - {}", step.collection.display()),
                }
            }
        }
    }
    if let Some(env) = &config.suite.environment {
        println!("Environment: {}", env.display());
    }

    println!();
    println!("Runner: {}", config.runner.backend);
    match config.runner.timeout_request {
        Some(timeout) => println!("Request timeout: {}ms", timeout.as_millis()),
        None => println!("Request timeout: none"),
    }
    println!("Bail: {}", config.runner.bail);

    Ok(())
}

/// List available runner backends
fn list_runners() {
    println!("Available runners:");
    println!();

    let defaults = RunnerConfig::default();
    for (name, factory) in RUNNERS.iter() {
        println!("  {name:20} - {}", factory(&defaults).description());
    }

    println!();
    println!("Select one with:");
    println!("  collection-runner run --runner dry-run");
}
