//! Snapshot interpreter
//!
//! Jenkins only ever reports the *latest* invocation's status by job name.
//! Right after triggering, a poll may therefore return a snapshot describing
//! the *previous* invocation — the new one may not have entered the job's
//! build history yet. This module decides, per poll, whether a snapshot
//! belongs to the current invocation or is a stale leftover.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::jenkins::StatusSnapshot;
use crate::track::info::BuildInfo;

/// Interpret one status snapshot for one job.
///
/// `known_ongoing` must be `true` once an earlier poll confirmed that the
/// current invocation is running; from then on every snapshot is trusted
/// unconditionally, because the latest build can only be ours. While it is
/// `false`, a snapshot whose start time lies more than `not_started_threshold`
/// before `now` is classified as stale and yields the not-started value.
///
/// The threshold must exceed the polling interval by a comfortable multiple
/// (the config layer enforces 3x) so that scheduler jitter between "trigger"
/// and "Jenkins records the new build" never misclassifies a fresh snapshot.
///
/// Pure function of its arguments: same snapshot, same flag, same `now` give
/// the same `BuildInfo`.
#[must_use]
pub fn interpret(
    job_name: &str,
    snapshot: &StatusSnapshot,
    known_ongoing: bool,
    now: DateTime<Utc>,
    not_started_threshold: Duration,
) -> BuildInfo {
    let diff_ms = now.timestamp_millis() - snapshot.timestamp;
    let diff_seconds = diff_ms as f64 / 1000.0;
    tracing::debug!(job = job_name, diff_seconds, known_ongoing, "interpreting snapshot");

    let about_previous_build =
        !known_ongoing && diff_seconds > not_started_threshold.as_secs_f64();

    if about_previous_build {
        tracing::debug!(job = job_name, "diff too big, assuming info is about previous build");
        BuildInfo::not_started(job_name)
    } else {
        BuildInfo::from_snapshot(job_name, snapshot)
    }
}
