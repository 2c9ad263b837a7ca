//! Job tracker
//!
//! Owns one job's lifecycle from trigger to terminal outcome. The tracker
//! polls the build server on a fixed cadence and feeds each snapshot through
//! the interpreter, counting how many ticks the job has spent queued and how
//! many running. Polling is self-paced: the next tick is scheduled only after
//! the previous poll's result has been processed, so there is never more than
//! one in-flight request per job.

use chrono::Utc;
use thiserror::Error;

use crate::cli::ProgressSink;
use crate::config::PollSettings;
use crate::jenkins::{BuildServer, ClientError};
use crate::track::info::{BuildInfo, TimeoutPhase};
use crate::track::interpret::interpret;

/// Terminal failure of a tracked job.
///
/// Every variant except `Client` carries the best-known [`BuildInfo`] for
/// diagnostics. Timeout variants carry the info with its phase marker already
/// attached.
#[derive(Debug, Error)]
pub enum TrackError {
    /// The build finished with a non-success result.
    #[error("job '{}' finished with result {:?}", .0.job_name, .0.result)]
    BuildFailed(BuildInfo),
    /// The job exhausted its queued-phase budget without ever starting.
    /// The remote job may still run later; we just stop observing it.
    #[error("job '{}' timed out while queued", .0.job_name)]
    QueuedTimeout(BuildInfo),
    /// The build exhausted its ongoing-phase budget without finishing.
    /// The remote build may still be running; we just stop observing it.
    #[error("job '{}' timed out while ongoing", .0.job_name)]
    OngoingTimeout(BuildInfo),
    /// A remote call failed. Not retried; aborts the job immediately.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl TrackError {
    /// The best-known build info at the point of failure, if any.
    #[must_use]
    pub const fn build_info(&self) -> Option<&BuildInfo> {
        match self {
            Self::BuildFailed(info) | Self::QueuedTimeout(info) | Self::OngoingTimeout(info) => {
                Some(info)
            }
            Self::Client(_) => None,
        }
    }
}

/// Phase of the tracked invocation, as far as polling has confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Triggered and accepted, but no poll has seen it running yet.
    Queued,
    /// A poll confirmed the invocation is running.
    Ongoing,
}

/// Tracks a single job from trigger to terminal outcome.
pub struct JobTracker<'a> {
    server: &'a dyn BuildServer,
    settings: PollSettings,
    sink: &'a dyn ProgressSink,
}

impl<'a> JobTracker<'a> {
    /// Create a tracker polling `server` with the given cadence and budgets.
    #[must_use]
    pub fn new(server: &'a dyn BuildServer, settings: PollSettings, sink: &'a dyn ProgressSink) -> Self {
        Self {
            server,
            settings,
            sink,
        }
    }

    /// Trigger `job` and poll until it reaches a terminal state.
    ///
    /// Resolves with the final [`BuildInfo`] when the build finishes
    /// successfully. Fails with [`TrackError::BuildFailed`] on a non-success
    /// result, or with a timeout variant when a phase budget runs out. A
    /// finished result observed on the same tick as a timeout boundary wins:
    /// the interpreter's verdict is checked before any timeout bookkeeping.
    pub async fn track(&self, job: &str) -> Result<BuildInfo, TrackError> {
        self.sink.job_started(job);
        let handle = self.server.trigger_job(job).await?;
        tracing::debug!(job, location = %handle.location, "queued");

        let interval = self.settings.polling_interval;
        let mut phase = Phase::Queued;
        let mut ticks_queued: u32 = 0;
        let mut ticks_ongoing: u32 = 0;

        loop {
            // First poll happens one interval after the trigger, giving
            // Jenkins time to record the new invocation.
            tokio::time::sleep(interval).await;

            let snapshot = self.server.fetch_latest_status(job).await?;
            let info = interpret(
                job,
                &snapshot,
                phase == Phase::Ongoing,
                Utc::now(),
                self.settings.not_started_threshold,
            );

            if info.is_finished {
                if info.is_success {
                    tracing::debug!(job, "finished and success");
                    self.sink.job_succeeded(&info);
                    return Ok(info);
                }
                tracing::debug!(job, result = ?info.result, "finished but failed");
                self.sink.job_failed(&info);
                return Err(TrackError::BuildFailed(info));
            }

            if info.is_ongoing {
                phase = Phase::Ongoing;
                ticks_ongoing += 1;
                tracing::debug!(job, ticks_ongoing, "still ongoing");

                // Budget spent once the ticks cover it; a budget that is not
                // a whole multiple of the interval rounds up to the next tick.
                if interval * ticks_ongoing >= self.settings.ongoing_timeout {
                    let info = info.with_timeout(TimeoutPhase::Ongoing);
                    self.sink.job_failed(&info);
                    return Err(TrackError::OngoingTimeout(info));
                }
            } else {
                ticks_queued += 1;
                tracing::debug!(job, ticks_queued, "not started yet");

                if interval * ticks_queued >= self.settings.queued_timeout {
                    let info = info.with_timeout(TimeoutPhase::Queued);
                    self.sink.job_failed(&info);
                    return Err(TrackError::QueuedTimeout(info));
                }
            }
        }
    }
}
