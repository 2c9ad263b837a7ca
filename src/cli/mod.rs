//! CLI output formatting
//!
//! Human-readable terminal rendering for pipeline runs: progress lines while
//! jobs are tracked, and a final colored OK/KO verdict per job.

pub mod display;

pub use display::ConsoleDisplay;
pub use display::ProgressSink;
pub use display::SilentSink;
