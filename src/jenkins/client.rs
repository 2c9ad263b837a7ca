//! Jenkins build-server client
//!
//! Defines the [`BuildServer`] capability the tracker polls against, plus the
//! HTTP implementation backed by the Jenkins REST API with basic auth.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use super::api::{QueuedHandle, StatusSnapshot};

/// Environment variable holding the Jenkins username.
pub const ENV_USER: &str = "JENKINS_USER";
/// Environment variable holding the Jenkins API token or password.
pub const ENV_PASSWORD: &str = "JENKINS_PASSWORD";
/// Environment variable holding the Jenkins host (`host` or `host:port`).
pub const ENV_HOST: &str = "JENKINS_HOST";

/// Errors from talking to the build server.
///
/// Transport failures are not retried: the first error aborts the current job
/// and with it the whole pipeline.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP request itself failed (connection, TLS, timeout, decode).
    #[error("jenkins request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a status we don't know how to handle.
    #[error("unexpected status {status} from jenkins for job '{job}'")]
    UnexpectedStatus {
        /// Job the request was about.
        job: String,
        /// HTTP status returned.
        status: StatusCode,
    },
    /// A trigger response carried no `Location` header to the queue item.
    #[error("jenkins accepted job '{job}' but returned no queue location")]
    MissingLocation {
        /// Job the request was about.
        job: String,
    },
}

/// Capability the job tracker needs from a remote build server.
///
/// Implemented by [`JenkinsClient`] for real servers and by scripted fakes in
/// tests. One logical connection per client; callers never issue overlapping
/// requests for the same job.
#[async_trait]
pub trait BuildServer: Send + Sync {
    /// Trigger a job by name, returning a handle to the queued item.
    async fn trigger_job(&self, job: &str) -> Result<QueuedHandle, ClientError>;

    /// Fetch the status snapshot of the latest known invocation of a job.
    async fn fetch_latest_status(&self, job: &str) -> Result<StatusSnapshot, ClientError>;
}

/// Jenkins connection settings loaded from the environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Username for basic auth.
    pub user: String,
    /// API token or password for basic auth.
    pub password: String,
    /// Host (and optional port) of the Jenkins instance.
    pub host: String,
}

impl Credentials {
    /// Load credentials from `JENKINS_USER`, `JENKINS_PASSWORD` and
    /// `JENKINS_HOST`.
    ///
    /// All three are required; the error names every variable that is missing
    /// so the caller can abort with a single actionable diagnostic.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut missing = Vec::new();
        let mut read = |name: &'static str| match std::env::var(name) {
            Ok(value) if !value.is_empty() => Some(value),
            _ => {
                missing.push(name);
                None
            }
        };

        let user = read(ENV_USER);
        let password = read(ENV_PASSWORD);
        let host = read(ENV_HOST);

        if !missing.is_empty() {
            anyhow::bail!(
                "You need to pass {} env variable(s)",
                missing.join(", ")
            );
        }

        Ok(Self {
            // All three are Some when `missing` is empty
            user: user.unwrap_or_default(),
            password: password.unwrap_or_default(),
            host: host.unwrap_or_default(),
        })
    }

    /// Base URL of the Jenkins instance, with a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.host.trim_end_matches('/'))
    }
}

/// HTTP client for a Jenkins instance.
///
/// Thin wrapper over `reqwest` covering exactly the two endpoints cascade
/// needs: triggering a build and reading the latest build's status.
pub struct JenkinsClient {
    http: reqwest::Client,
    credentials: Credentials,
}

impl JenkinsClient {
    /// Create a client for the given credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
        }
    }

    fn job_url(&self, job: &str, tail: &str) -> String {
        format!("{}job/{job}/{tail}", self.credentials.base_url())
    }
}

#[async_trait]
impl BuildServer for JenkinsClient {
    async fn trigger_job(&self, job: &str) -> Result<QueuedHandle, ClientError> {
        let response = self
            .http
            .post(self.job_url(job, "build"))
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .send()
            .await?;

        let status = response.status();
        // Jenkins answers 201 Created with a Location header to the queue item
        if status != StatusCode::CREATED && status != StatusCode::FOUND {
            return Err(ClientError::UnexpectedStatus {
                job: job.to_string(),
                status,
            });
        }

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string)
            .ok_or_else(|| ClientError::MissingLocation {
                job: job.to_string(),
            })?;

        tracing::debug!(job, %location, "job queued");
        Ok(QueuedHandle { location })
    }

    async fn fetch_latest_status(&self, job: &str) -> Result<StatusSnapshot, ClientError> {
        let response = self
            .http
            .get(self.job_url(job, "lastBuild/api/json"))
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::UnexpectedStatus {
                job: job.to_string(),
                status,
            });
        }

        let snapshot: StatusSnapshot = response.json().await?;
        tracing::debug!(
            job,
            result = ?snapshot.result,
            timestamp = snapshot.timestamp,
            number = ?snapshot.number,
            "fetched latest status"
        );
        Ok(snapshot)
    }
}
