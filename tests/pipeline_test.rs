#![allow(missing_docs)]

//! End-to-end pipeline runs over a scripted build server.
//!
//! Exercises the full data flow: trigger → poll → interpret → sequence,
//! with a fake server standing in for Jenkins.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use cascade::cli::SilentSink;
use cascade::config::PollSettings;
use cascade::jenkins::{BuildServer, ClientError, QueuedHandle, StatusSnapshot};
use cascade::pipeline::Pipeline;
use cascade::track::TrackError;

/// Per-job scripted server: each job name gets its own snapshot sequence,
/// and trigger order is recorded.
struct ScriptedServer {
    scripts: Mutex<Vec<(String, VecDeque<StatusSnapshot>)>>,
    triggered: Mutex<Vec<String>>,
    fetches: AtomicUsize,
}

impl ScriptedServer {
    fn new(scripts: Vec<(&str, Vec<StatusSnapshot>)>) -> Self {
        Self {
            scripts: Mutex::new(
                scripts
                    .into_iter()
                    .map(|(job, snaps)| (job.to_string(), snaps.into()))
                    .collect(),
            ),
            triggered: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    fn triggered(&self) -> Vec<String> {
        self.triggered.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildServer for ScriptedServer {
    async fn trigger_job(&self, job: &str) -> Result<QueuedHandle, ClientError> {
        self.triggered.lock().unwrap().push(job.to_string());
        Ok(QueuedHandle {
            location: format!("https://ci.example.com/queue/item/{job}/"),
        })
    }

    async fn fetch_latest_status(&self, job: &str) -> Result<StatusSnapshot, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts
            .iter_mut()
            .find(|(name, _)| name == job)
            .map(|(_, snaps)| snaps);

        match script {
            Some(snaps) if snaps.len() > 1 => Ok(snaps.pop_front().unwrap()),
            Some(snaps) => snaps.front().cloned().ok_or(ClientError::MissingLocation {
                job: job.to_string(),
            }),
            None => Err(ClientError::UnexpectedStatus {
                job: job.to_string(),
                status: reqwest::StatusCode::NOT_FOUND,
            }),
        }
    }
}

fn fresh(result: Option<&str>, number: u32) -> StatusSnapshot {
    StatusSnapshot {
        result: result.map(ToString::to_string),
        timestamp: Utc::now().timestamp_millis(),
        url: Some(format!("https://ci.example.com/job/x/{number}/")),
        number: Some(number),
    }
}

fn stale(result: Option<&str>) -> StatusSnapshot {
    StatusSnapshot {
        result: result.map(ToString::to_string),
        timestamp: Utc::now().timestamp_millis() - 3_600_000,
        url: Some("https://ci.example.com/job/x/1/".to_string()),
        number: Some(1),
    }
}

fn settings() -> PollSettings {
    PollSettings {
        polling_interval: Duration::from_secs(15),
        not_started_threshold: Duration::from_secs(45),
        queued_timeout: Duration::from_secs(300),
        ongoing_timeout: Duration::from_secs(1800),
    }
}

fn jobs(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

/// A three-stage pipeline where each job goes stale → ongoing → success,
/// mirroring a real Jenkins run complete with leftover snapshots.
#[tokio::test(start_paused = true)]
async fn test_three_stage_pipeline_end_to_end() {
    let server = ScriptedServer::new(vec![
        ("build", vec![stale(Some("SUCCESS")), fresh(None, 10), fresh(Some("SUCCESS"), 10)]),
        ("integration", vec![fresh(None, 20), fresh(Some("SUCCESS"), 20)]),
        ("deploy", vec![fresh(Some("SUCCESS"), 30)]),
    ]);
    let sink = SilentSink;
    let pipeline = Pipeline::new(&server, settings(), &sink);

    let completed = pipeline
        .run(&jobs(&["build", "integration", "deploy"]))
        .await
        .unwrap();

    assert_eq!(completed.len(), 3);
    assert!(completed.iter().all(|info| info.is_success));
    assert_eq!(completed[0].build_number, Some(10));
    assert_eq!(completed[2].build_number, Some(30));
    assert_eq!(server.triggered(), vec!["build", "integration", "deploy"]);
}

/// The middle stage fails; the pipeline aborts with that job's info and the
/// last stage is never triggered.
#[tokio::test(start_paused = true)]
async fn test_middle_stage_failure_skips_the_rest() {
    let server = ScriptedServer::new(vec![
        ("build", vec![fresh(Some("SUCCESS"), 10)]),
        ("integration", vec![fresh(None, 20), fresh(Some("UNSTABLE"), 20)]),
        ("deploy", vec![fresh(Some("SUCCESS"), 30)]),
    ]);
    let sink = SilentSink;
    let pipeline = Pipeline::new(&server, settings(), &sink);

    let failure = pipeline
        .run(&jobs(&["build", "integration", "deploy"]))
        .await
        .unwrap_err();

    match failure.error {
        TrackError::BuildFailed(info) => {
            assert_eq!(info.job_name, "integration");
            assert_eq!(info.result.as_deref(), Some("UNSTABLE"));
        }
        other => panic!("expected BuildFailed, got {other:?}"),
    }
    assert_eq!(failure.completed.len(), 1);
    assert_eq!(failure.completed[0].job_name, "build");
    assert!(failure.completed[0].is_success);
    assert_eq!(server.triggered(), vec!["build", "integration"]);
}

/// A job stuck on stale snapshots exhausts its queued budget: 300 s at 15 s
/// polling is 20 ticks.
#[tokio::test(start_paused = true)]
async fn test_stuck_in_queue_times_out() {
    let server = ScriptedServer::new(vec![("build", vec![stale(Some("SUCCESS"))])]);
    let sink = SilentSink;
    let pipeline = Pipeline::new(&server, settings(), &sink);

    let failure = pipeline.run(&jobs(&["build", "deploy"])).await.unwrap_err();

    assert!(failure.completed.is_empty());
    match failure.error {
        TrackError::QueuedTimeout(info) => {
            assert_eq!(info.job_name, "build");
            assert!(info.is_timeout_while_queued());
        }
        other => panic!("expected QueuedTimeout, got {other:?}"),
    }
    assert_eq!(server.fetches.load(Ordering::SeqCst), 20);
    assert_eq!(server.triggered(), vec!["build"]);
}

/// Fetching status for an unknown job is a transport-level error and aborts
/// without retries.
#[tokio::test(start_paused = true)]
async fn test_unknown_job_aborts_pipeline() {
    let server = ScriptedServer::new(vec![]);
    let sink = SilentSink;
    let pipeline = Pipeline::new(&server, settings(), &sink);

    let failure = pipeline.run(&jobs(&["ghost"])).await.unwrap_err();

    assert!(matches!(failure.error, TrackError::Client(_)));
    assert_eq!(server.fetches.load(Ordering::SeqCst), 1);
}
