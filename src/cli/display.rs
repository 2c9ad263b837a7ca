//! Terminal display for pipeline execution
//!
//! Renders job progress and final build results as colored terminal output.
//! All output goes to stderr so stdout remains clean for piping.

use colored::Colorize;

use crate::track::BuildInfo;

/// Sink for human-readable progress and result lines.
///
/// The tracker and sequencer report through this trait instead of printing
/// directly, so tests run silent and alternative frontends can render
/// differently.
pub trait ProgressSink: Send + Sync {
    /// A job was triggered and is being tracked.
    fn job_started(&self, job: &str);
    /// A pipeline run is starting with the given stages.
    fn pipeline_started(&self, jobs: &[String]);
    /// A pipeline stage is about to be triggered.
    fn stage_started(&self, job: &str, index: usize, total: usize);
    /// A tracked job finished successfully.
    fn job_succeeded(&self, info: &BuildInfo);
    /// A tracked job failed or timed out.
    fn job_failed(&self, info: &BuildInfo);
}

/// Colored console implementation of [`ProgressSink`].
#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl ConsoleDisplay {
    /// Create a console display.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProgressSink for ConsoleDisplay {
    fn job_started(&self, job: &str) {
        eprintln!("Starting job: {job}");
    }

    fn pipeline_started(&self, jobs: &[String]) {
        eprintln!("{} {}", "Build pipeline:".bold().cyan(), jobs.join("; "));
    }

    fn stage_started(&self, job: &str, index: usize, total: usize) {
        eprintln!(
            "Starting {job} (pipeline item #{} out of #{total})",
            index + 1
        );
    }

    fn job_succeeded(&self, info: &BuildInfo) {
        eprintln!("{}", "Build result: OK".bold().yellow());
        if let Some(url) = &info.url {
            eprintln!("{url}");
        }
    }

    fn job_failed(&self, info: &BuildInfo) {
        eprintln!("{}", "Build result: KO".bold().red());
        if info.is_timeout_while_queued() {
            eprintln!("  {} job never left the build queue", "timeout:".red());
        } else if info.is_timeout_while_ongoing() {
            eprintln!("  {} build did not finish in time", "timeout:".red());
        }
        eprintln!("{info:#?}");
    }
}

/// [`ProgressSink`] that swallows all output. Used by `--quiet` runs.
#[derive(Debug, Default)]
pub struct SilentSink;

impl ProgressSink for SilentSink {
    fn job_started(&self, _job: &str) {}
    fn pipeline_started(&self, _jobs: &[String]) {}
    fn stage_started(&self, _job: &str, _index: usize, _total: usize) {}
    fn job_succeeded(&self, _info: &BuildInfo) {}
    fn job_failed(&self, _info: &BuildInfo) {}
}
