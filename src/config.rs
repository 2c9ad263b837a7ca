//! Configuration parser
//!
//! Parses `cascade.toml` into polling tunables and named pipeline
//! definitions. The file is optional; defaults are 15 s polling, a 3x
//! stale threshold, and 5 min queued / 30 min ongoing timeouts.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Polling tunables, in seconds, as written in `[poll]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollConfig {
    /// How often to poll Jenkins for build progress (default: 15)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Snapshot age beyond which it is attributed to the previous build.
    /// Must be at least 3x the polling interval (default: 45)
    #[serde(default = "default_not_started_diff_secs")]
    pub not_started_diff_secs: u64,
    /// Give up if a job stays queued longer than this (default: 300)
    #[serde(default = "default_queued_timeout_secs")]
    pub queued_timeout_secs: u64,
    /// Give up if a build runs longer than this (default: 1800).
    /// Raise it for jobs expected to take more than 30 minutes.
    #[serde(default = "default_ongoing_timeout_secs")]
    pub ongoing_timeout_secs: u64,
}

const fn default_interval_secs() -> u64 {
    15
}

const fn default_not_started_diff_secs() -> u64 {
    default_interval_secs() * 3
}

const fn default_queued_timeout_secs() -> u64 {
    5 * 60
}

const fn default_ongoing_timeout_secs() -> u64 {
    30 * 60
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            not_started_diff_secs: default_not_started_diff_secs(),
            queued_timeout_secs: default_queued_timeout_secs(),
            ongoing_timeout_secs: default_ongoing_timeout_secs(),
        }
    }
}

impl PollConfig {
    /// Convert to the duration-typed settings the tracker consumes.
    #[must_use]
    pub const fn settings(&self) -> PollSettings {
        PollSettings {
            polling_interval: Duration::from_secs(self.interval_secs),
            not_started_threshold: Duration::from_secs(self.not_started_diff_secs),
            queued_timeout: Duration::from_secs(self.queued_timeout_secs),
            ongoing_timeout: Duration::from_secs(self.ongoing_timeout_secs),
        }
    }
}

/// Duration-typed polling settings consumed by the job tracker.
///
/// Timeouts are enforced on tick counts — a phase fails on the first tick
/// whose accumulated interval time covers its budget — not on wall-clock
/// deadlines, so a suspended process does not accumulate elapsed time
/// against its budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Pause between one poll's outcome and the next poll.
    pub polling_interval: Duration,
    /// Snapshot age beyond which it describes the previous invocation.
    pub not_started_threshold: Duration,
    /// Total time budget for the queued phase.
    pub queued_timeout: Duration,
    /// Total time budget for the ongoing phase.
    pub ongoing_timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        PollConfig::default().settings()
    }
}

/// A named pipeline definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineDef {
    /// Unique name for this pipeline
    pub name: String,
    /// Jenkins job names, executed strictly in order
    pub jobs: Vec<String>,
}

/// Top-level configuration parsed from cascade.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CascadeConfig {
    /// Polling tunables
    #[serde(default)]
    pub poll: PollConfig,
    /// Named pipeline definitions
    #[serde(default, rename = "pipeline")]
    pub pipelines: Vec<PipelineDef>,
}

impl CascadeConfig {
    /// Parse a cascade.toml file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse cascade.toml content from a string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse cascade.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Find a named pipeline.
    #[must_use]
    pub fn get_pipeline(&self, name: &str) -> Option<&PipelineDef> {
        self.pipelines.iter().find(|p| p.name == name)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        let poll = &self.poll;

        if poll.interval_secs == 0 {
            bail!("poll.interval_secs must be greater than zero");
        }

        // The stale threshold must beat poll jitter with room to spare,
        // otherwise a fresh invocation gets misread as the previous build.
        if poll.not_started_diff_secs < poll.interval_secs * 3 {
            bail!(
                "poll.not_started_diff_secs ({}) must be at least 3x poll.interval_secs ({})",
                poll.not_started_diff_secs,
                poll.interval_secs
            );
        }

        if poll.queued_timeout_secs < poll.interval_secs {
            bail!(
                "poll.queued_timeout_secs ({}) must be at least one polling interval ({})",
                poll.queued_timeout_secs,
                poll.interval_secs
            );
        }

        if poll.ongoing_timeout_secs < poll.interval_secs {
            bail!(
                "poll.ongoing_timeout_secs ({}) must be at least one polling interval ({})",
                poll.ongoing_timeout_secs,
                poll.interval_secs
            );
        }

        let mut seen = HashSet::new();
        for pipeline in &self.pipelines {
            if pipeline.name.trim().is_empty() {
                bail!("Pipeline name cannot be empty");
            }
            if !seen.insert(&pipeline.name) {
                bail!("Duplicate pipeline name: '{}'", pipeline.name);
            }
            if pipeline.jobs.is_empty() {
                bail!("Pipeline '{}' has no jobs", pipeline.name);
            }
            if pipeline.jobs.iter().any(|j| j.trim().is_empty()) {
                bail!("Pipeline '{}' contains an empty job name", pipeline.name);
            }
        }

        Ok(())
    }
}
