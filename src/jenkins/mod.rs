//! Jenkins integration
//!
//! Wire types for the Jenkins JSON API and the client capability the
//! tracker polls against.

pub mod api;
pub mod client;

pub use api::{QueuedHandle, StatusSnapshot};
pub use client::{BuildServer, ClientError, Credentials, JenkinsClient};
