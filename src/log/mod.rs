//! Logging and observability
//!
//! JSONL history of tracked build outcomes. Diagnostic logging goes through
//! `tracing` and is configured in the binary.

pub mod jsonl;

pub use jsonl::{JobOutcome, JsonlLogger, OutcomeStatus};
