//! JSONL (JSON Lines) history of tracked builds
//!
//! Append-only audit log of job outcomes at `.cascade/history.jsonl`.
//! This records what happened, it is not resumable pipeline state.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use crate::track::{BuildInfo, TrackError};

/// How a tracked job ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeStatus {
    /// Build finished with SUCCESS.
    Success,
    /// Build finished with a non-success result.
    Failure,
    /// Gave up while the job was still queued.
    QueuedTimeout,
    /// Gave up while the build was running.
    OngoingTimeout,
}

/// One line of the history log: the terminal outcome of one tracked job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobOutcome {
    /// Name of the tracked job
    pub job: String,
    /// ISO 8601 timestamp of when tracking ended
    pub timestamp: DateTime<Utc>,
    /// How the job ended
    pub status: OutcomeStatus,
    /// Jenkins result string, if the build finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Build URL, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Build number, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_number: Option<u32>,
}

impl JobOutcome {
    /// Outcome for a successfully finished build.
    #[must_use]
    pub fn success(info: &BuildInfo) -> Self {
        Self::from_info(info, OutcomeStatus::Success)
    }

    /// Outcome for a failed or timed-out job, classified from the error.
    /// `None` for transport errors, which have no build to record.
    #[must_use]
    pub fn from_error(error: &TrackError) -> Option<Self> {
        let status = match error {
            TrackError::BuildFailed(_) => OutcomeStatus::Failure,
            TrackError::QueuedTimeout(_) => OutcomeStatus::QueuedTimeout,
            TrackError::OngoingTimeout(_) => OutcomeStatus::OngoingTimeout,
            TrackError::Client(_) => return None,
        };
        error.build_info().map(|info| Self::from_info(info, status))
    }

    fn from_info(info: &BuildInfo, status: OutcomeStatus) -> Self {
        Self {
            job: info.job_name.clone(),
            timestamp: Utc::now(),
            status,
            result: info.result.clone(),
            url: info.url.clone(),
            build_number: info.build_number,
        }
    }
}

/// Append-only JSONL logger for job outcomes.
///
/// Each line of `<log_dir>/history.jsonl` is one JSON-encoded [`JobOutcome`].
pub struct JsonlLogger {
    log_path: PathBuf,
}

impl JsonlLogger {
    /// Create a logger writing to `<log_dir>/history.jsonl`, creating the
    /// directory if needed.
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Result<Self> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        Ok(Self {
            log_path: log_dir.join("history.jsonl"),
        })
    }

    /// Append one outcome as a single JSON line.
    pub fn append(&self, outcome: &JobOutcome) -> Result<()> {
        let line = serde_json::to_string(outcome).context("Failed to serialize outcome")?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open log file: {}", self.log_path.display()))?;

        writeln!(file, "{line}")
            .with_context(|| format!("Failed to write to log file: {}", self.log_path.display()))?;
        Ok(())
    }

    /// Read all outcomes, oldest first. Empty when the file doesn't exist.
    pub fn read_all(&self) -> Result<Vec<JobOutcome>> {
        if !self.log_path.exists() {
            return Ok(vec![]);
        }

        let content = fs::read_to_string(&self.log_path)
            .with_context(|| format!("Failed to read log file: {}", self.log_path.display()))?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .with_context(|| format!("Failed to parse history line: {line}"))
            })
            .collect()
    }
}
