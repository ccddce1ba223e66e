//! Capture recorder state machine
//!
//! Converts the device's asynchronous chunk stream into one immutable
//! binary artifact. The recorder itself is synchronous and deterministic;
//! the pipeline drives it from its event loop (chunk arrivals, 1-second
//! ticks, control commands).

mod recorder;

pub use recorder::{CaptureRecorder, RecorderState};
