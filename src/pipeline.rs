//! Pipeline sequencer
//!
//! Chains job trackers into a strict sequential pipeline: each job is
//! triggered only after the previous one finished successfully, and the
//! first failure or timeout aborts the remaining stages. Stages are
//! inherently ordered — each assumes the previous produced a release-worthy
//! state — so there is no concurrency between them.

use thiserror::Error;

use crate::cli::ProgressSink;
use crate::config::PollSettings;
use crate::jenkins::BuildServer;
use crate::track::{BuildInfo, JobTracker, TrackError};

/// A failed pipeline run.
///
/// Carries the stages that had already succeeded next to the error that
/// aborted the run, so callers can still record the completed builds.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PipelineError {
    /// Final build info of every stage that completed before the failure.
    pub completed: Vec<BuildInfo>,
    /// The failure that aborted the run.
    #[source]
    pub error: TrackError,
}

/// Runs an ordered sequence of jobs against one build server.
pub struct Pipeline<'a> {
    server: &'a dyn BuildServer,
    settings: PollSettings,
    sink: &'a dyn ProgressSink,
}

impl<'a> Pipeline<'a> {
    /// Create a sequencer over the given server, settings and output sink.
    #[must_use]
    pub fn new(server: &'a dyn BuildServer, settings: PollSettings, sink: &'a dyn ProgressSink) -> Self {
        Self {
            server,
            settings,
            sink,
        }
    }

    /// Execute `jobs` strictly in order.
    ///
    /// Resolves with the final [`BuildInfo`] of every completed stage once
    /// all of them succeed; an empty sequence succeeds trivially. The first
    /// failing stage aborts the rest; the [`PipelineError`] pairs that job's
    /// [`TrackError`] with the stages that did complete.
    pub async fn run(&self, jobs: &[String]) -> Result<Vec<BuildInfo>, PipelineError> {
        self.sink.pipeline_started(jobs);

        let tracker = JobTracker::new(self.server, self.settings, self.sink);
        let mut completed = Vec::with_capacity(jobs.len());

        for (index, job) in jobs.iter().enumerate() {
            self.sink.stage_started(job, index, jobs.len());
            match tracker.track(job).await {
                Ok(info) => completed.push(info),
                Err(error) => return Err(PipelineError { completed, error }),
            }
        }

        Ok(completed)
    }
}
