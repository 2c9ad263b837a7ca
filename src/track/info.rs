//! Normalized build information
//!
//! [`BuildInfo`] is the value the tracker and pipeline pass around: one
//! immutable interpretation of one status snapshot. A fresh one is produced
//! on every poll tick; it is superseded, never mutated.

use serde::{Deserialize, Serialize};

use crate::jenkins::StatusSnapshot;

/// Result string Jenkins reports for a successful build.
pub const RESULT_SUCCESS: &str = "SUCCESS";

/// Which phase a tracked job was in when its time budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPhase {
    /// The job never left the build queue.
    Queued,
    /// The job started but did not finish.
    Ongoing,
}

/// Normalized view of one job invocation at one point in time.
///
/// Exactly one of three conditions holds for a pre-timeout value: not yet
/// started (`is_ongoing` and `is_finished` both false), ongoing, or finished.
/// `is_success` is only meaningful when `is_finished` is true. The timeout
/// marker is attached by the tracker at its terminal rejection point, never
/// by the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    /// Name of the job this invocation belongs to.
    pub job_name: String,
    /// Browser URL of the build, once known.
    pub url: Option<String>,
    /// Terminal result string; `None` until the build finishes.
    pub result: Option<String>,
    /// The build has started and is still running.
    pub is_ongoing: bool,
    /// The build reached a terminal result.
    pub is_finished: bool,
    /// The terminal result was `SUCCESS`.
    pub is_success: bool,
    /// Build number, once known.
    pub build_number: Option<u32>,
    /// Set when the tracker gave up waiting, with the phase it was stuck in.
    pub timed_out: Option<TimeoutPhase>,
}

impl BuildInfo {
    /// The "not yet started" interpretation: the snapshot described a
    /// previous invocation, so nothing about the current one is known.
    #[must_use]
    pub fn not_started(job_name: &str) -> Self {
        Self {
            job_name: job_name.to_string(),
            url: None,
            result: None,
            is_ongoing: false,
            is_finished: false,
            is_success: false,
            build_number: None,
            timed_out: None,
        }
    }

    /// Interpretation of a snapshot trusted to describe the current
    /// invocation: running while `result` is null, finished otherwise.
    #[must_use]
    pub fn from_snapshot(job_name: &str, snapshot: &StatusSnapshot) -> Self {
        Self {
            job_name: job_name.to_string(),
            url: snapshot.url.clone(),
            result: snapshot.result.clone(),
            is_ongoing: snapshot.result.is_none(),
            is_finished: snapshot.result.is_some(),
            is_success: snapshot.result.as_deref() == Some(RESULT_SUCCESS),
            build_number: snapshot.number,
            timed_out: None,
        }
    }

    /// Attach a timeout marker. Only the tracker calls this, on the tick
    /// where a phase budget is exhausted.
    #[must_use]
    pub fn with_timeout(mut self, phase: TimeoutPhase) -> Self {
        self.timed_out = Some(phase);
        self
    }

    /// Whether the tracker stopped observing this job on a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        self.timed_out.is_some()
    }

    /// Whether the timeout hit while the job was still queued.
    #[must_use]
    pub fn is_timeout_while_queued(&self) -> bool {
        self.timed_out == Some(TimeoutPhase::Queued)
    }

    /// Whether the timeout hit while the job was running.
    #[must_use]
    pub fn is_timeout_while_ongoing(&self) -> bool {
        self.timed_out == Some(TimeoutPhase::Ongoing)
    }
}
