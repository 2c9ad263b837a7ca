//! Jenkins JSON API wire types
//!
//! Shapes returned by the Jenkins REST API for the endpoints cascade uses.
//! Only the fields the tracker cares about are deserialized; the API returns
//! many more.

use serde::{Deserialize, Serialize};

/// Status of the most recent known invocation of a job, as reported by
/// `GET /job/{name}/lastBuild/api/json`.
///
/// Jenkins has no notion of "the build we just triggered" until it leaves the
/// queue — this snapshot always describes whatever build is *latest* for the
/// job name, which right after triggering may still be the previous one. The
/// snapshot interpreter in [`crate::track`] disambiguates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Terminal result string ("SUCCESS", "FAILURE", "ABORTED", ...).
    /// `None` while the build is still running.
    #[serde(default)]
    pub result: Option<String>,
    /// Start time of the build, in epoch milliseconds.
    pub timestamp: i64,
    /// Browser URL of the build.
    #[serde(default)]
    pub url: Option<String>,
    /// Build number, unique per job.
    #[serde(default)]
    pub number: Option<u32>,
}

/// Handle returned when a job is accepted onto the build queue.
///
/// The `Location` header of a successful `POST /job/{name}/build` points at
/// the queue item. Jenkins does not resolve it to a build number until the
/// build actually starts, so the handle is only useful for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedHandle {
    /// Queue item URL from the `Location` response header.
    pub location: String,
}
