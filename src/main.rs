//! Cascade - Sequential Jenkins build-pipeline runner
//!
//! CLI entry point: resolve the job sequence, load credentials, run the
//! pipeline, record outcomes.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cascade::cli::{ConsoleDisplay, ProgressSink, SilentSink};
use cascade::config::CascadeConfig;
use cascade::jenkins::{Credentials, JenkinsClient};
use cascade::log::{JobOutcome, JsonlLogger};
use cascade::pipeline::Pipeline;
use cascade::track::{BuildInfo, TrackError};

/// Config path used when `--config` is not passed.
const DEFAULT_CONFIG_PATH: &str = "cascade.toml";

/// Sequential Jenkins build-pipeline runner
///
/// Triggers each job on the Jenkins instance named by JENKINS_HOST
/// (authenticated with JENKINS_USER / JENKINS_PASSWORD), polls it to
/// completion, and only then moves on to the next job. The first failing
/// or timed-out job aborts the rest of the pipeline.
#[derive(Parser, Debug)]
#[command(name = "cascade", version, about)]
struct Cli {
    /// Jenkins job names to run in order
    #[arg(conflicts_with = "pipeline")]
    jobs: Vec<String>,

    /// Name of a pipeline defined in the config file
    #[arg(long)]
    pipeline: Option<String>,

    /// Path to the cascade.toml configuration file (defaults to
    /// cascade.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the history log (.cascade by default)
    #[arg(long, default_value = ".cascade")]
    log_dir: PathBuf,

    /// Suppress progress output (tracing diagnostics are unaffected)
    #[arg(long)]
    quiet: bool,
}

/// Load the config file. An explicitly passed `--config` path must exist;
/// without the flag, `cascade.toml` is read when present and built-in
/// defaults apply otherwise.
fn load_config(explicit: Option<&Path>) -> Result<CascadeConfig> {
    let path = match explicit {
        Some(path) => path,
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return Ok(CascadeConfig::default());
            }
            default
        }
    };
    CascadeConfig::from_path(path)
        .with_context(|| format!("Failed to load config from '{}'", path.display()))
}

/// Append every known outcome of a run to the history log: the stages that
/// succeeded, then the failing job's outcome when there is one.
fn record_outcomes(
    logger: &JsonlLogger,
    completed: &[BuildInfo],
    error: Option<&TrackError>,
) -> Result<()> {
    for info in completed {
        logger
            .append(&JobOutcome::success(info))
            .context("Failed to write to history log")?;
    }
    if let Some(outcome) = error.and_then(JobOutcome::from_error) {
        logger
            .append(&outcome)
            .context("Failed to write to history log")?;
    }
    Ok(())
}

/// Resolve the ordered job list from positional args or a named pipeline.
fn resolve_jobs(cli: &Cli, config: &CascadeConfig) -> Result<Vec<String>> {
    if let Some(name) = &cli.pipeline {
        let def = config.get_pipeline(name).with_context(|| {
            format!(
                "Unknown pipeline '{name}'. Available pipelines: {}",
                available_pipeline_names(config)
            )
        })?;
        return Ok(def.jobs.clone());
    }

    if cli.jobs.is_empty() {
        bail!("No jobs given. Pass job names as arguments or use --pipeline <name>.");
    }
    Ok(cli.jobs.clone())
}

/// Format available pipeline names for error messages.
fn available_pipeline_names(config: &CascadeConfig) -> String {
    if config.pipelines.is_empty() {
        return "(none defined)".to_string();
    }
    config
        .pipelines
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cascade=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let jobs = resolve_jobs(&cli, &config)?;

    // Credentials are checked before any job is touched
    let credentials = Credentials::from_env()?;
    let client = JenkinsClient::new(credentials);

    let logger = JsonlLogger::new(&cli.log_dir).context("Failed to initialize history log")?;

    let console = ConsoleDisplay::new();
    let silent = SilentSink;
    let sink: &dyn ProgressSink = if cli.quiet { &silent } else { &console };

    let pipeline = Pipeline::new(&client, config.poll.settings(), sink);
    match pipeline.run(&jobs).await {
        Ok(completed) => {
            record_outcomes(&logger, &completed, None)?;
            Ok(())
        }
        Err(failure) => {
            record_outcomes(&logger, &failure.completed, Some(&failure.error))?;
            if let TrackError::Client(client_error) = &failure.error {
                eprintln!("Remote call failed: {client_error}");
            }
            std::process::exit(1);
        }
    }
}
