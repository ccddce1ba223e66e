//! Recording pipeline
//!
//! One pipeline per recording screen: it drains the device's chunk stream
//! into the recorder, drives the 1-second elapsed clock, reacts to control
//! commands, and on stop executes the strict
//! `stop → concatenate → repair → upload → release → navigate` sequence.
//! Every exit path (success, error, user exit, teardown) converges on the
//! same device release.

mod pipeline;
mod stats;

pub use pipeline::{PipelineCommand, PipelineOutcome, RecordingPipeline};
pub use stats::PipelineStats;
