//! Shared test utilities
//!
//! Scripted [`BuildServer`] fake and snapshot builders used across test
//! modules. Only compiled in test builds.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;

use crate::jenkins::{BuildServer, ClientError, QueuedHandle, StatusSnapshot};

/// A snapshot whose build started one second ago, well within any stale
/// threshold, so it reads as the current invocation.
#[must_use]
pub fn fresh_snapshot(result: Option<&str>, number: u32) -> StatusSnapshot {
    StatusSnapshot {
        result: result.map(ToString::to_string),
        timestamp: Utc::now().timestamp_millis() - 1000,
        url: Some(format!("https://ci.example.com/job/api/{number}/")),
        number: Some(number),
    }
}

/// A snapshot whose build started an hour ago — past any reasonable stale
/// threshold, so it reads as a leftover of the previous invocation.
#[must_use]
pub fn stale_snapshot(result: Option<&str>) -> StatusSnapshot {
    StatusSnapshot {
        result: result.map(ToString::to_string),
        timestamp: Utc::now().timestamp_millis() - 3_600_000,
        url: Some("https://ci.example.com/job/api/1/".to_string()),
        number: Some(1),
    }
}

enum FetchBehavior {
    /// Pop scripted snapshots in order; repeat the last one when exhausted.
    Scripted(Mutex<VecDeque<StatusSnapshot>>),
    /// Fail every fetch.
    Failing,
}

/// In-memory [`BuildServer`] that replays a scripted status sequence and
/// counts calls.
pub struct FakeServer {
    fetch: FetchBehavior,
    fail_trigger: bool,
    triggers: AtomicUsize,
    fetches: AtomicUsize,
}

impl FakeServer {
    /// Serve the given snapshots one per poll, repeating the last forever.
    #[must_use]
    pub fn scripted(snapshots: Vec<StatusSnapshot>) -> Self {
        Self {
            fetch: FetchBehavior::Scripted(Mutex::new(snapshots.into())),
            fail_trigger: false,
            triggers: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Serve the same snapshot on every poll.
    #[must_use]
    pub fn repeating(snapshot: StatusSnapshot) -> Self {
        Self::scripted(vec![snapshot])
    }

    /// Accept triggers but fail every status fetch.
    #[must_use]
    pub fn failing_fetch() -> Self {
        Self {
            fetch: FetchBehavior::Failing,
            fail_trigger: false,
            triggers: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Fail the trigger call itself.
    #[must_use]
    pub fn failing_trigger() -> Self {
        Self {
            fetch: FetchBehavior::Failing,
            fail_trigger: true,
            triggers: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Number of trigger calls seen.
    pub fn trigger_count(&self) -> usize {
        self.triggers.load(Ordering::SeqCst)
    }

    /// Number of status fetches seen.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BuildServer for FakeServer {
    async fn trigger_job(&self, job: &str) -> Result<QueuedHandle, ClientError> {
        self.triggers.fetch_add(1, Ordering::SeqCst);
        if self.fail_trigger {
            return Err(ClientError::UnexpectedStatus {
                job: job.to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            });
        }
        Ok(QueuedHandle {
            location: format!("https://ci.example.com/queue/item/{job}/"),
        })
    }

    async fn fetch_latest_status(&self, job: &str) -> Result<StatusSnapshot, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.fetch {
            FetchBehavior::Scripted(queue) => {
                let mut queue = queue.lock().unwrap();
                if queue.len() > 1 {
                    Ok(queue.pop_front().unwrap())
                } else {
                    queue
                        .front()
                        .cloned()
                        .ok_or_else(|| ClientError::UnexpectedStatus {
                            job: job.to_string(),
                            status: StatusCode::NOT_FOUND,
                        })
                }
            }
            FetchBehavior::Failing => Err(ClientError::UnexpectedStatus {
                job: job.to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
            }),
        }
    }
}
