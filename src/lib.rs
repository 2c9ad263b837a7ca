//! Cascade - Sequential Jenkins build-pipeline runner
//!
//! Cascade triggers named jobs on a Jenkins server and polls each one until
//! it finishes, chaining several jobs into a strict sequential pipeline that
//! aborts on the first failure. The heart of the crate is the build-tracking
//! state machine in [`track`], which tells fresh status snapshots apart from
//! stale leftovers of previous invocations.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

pub mod cli;
pub mod config;
pub mod jenkins;
pub mod log;
pub mod pipeline;
pub mod track;

#[cfg(test)]
mod testutil;

// Re-export commonly used types
pub use cli::{ConsoleDisplay, ProgressSink, SilentSink};
pub use config::{CascadeConfig, PollConfig, PollSettings};
pub use jenkins::{BuildServer, ClientError, Credentials, JenkinsClient, StatusSnapshot};
pub use log::{JobOutcome, JsonlLogger, OutcomeStatus};
pub use pipeline::{Pipeline, PipelineError};
pub use track::{interpret, BuildInfo, JobTracker, TimeoutPhase, TrackError};
