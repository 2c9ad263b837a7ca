//! Build tracking
//!
//! The snapshot interpreter and the per-job polling state machine.

pub mod info;
pub mod interpret;
pub mod tracker;

pub use info::{BuildInfo, TimeoutPhase};
pub use interpret::interpret;
pub use tracker::{JobTracker, TrackError};
