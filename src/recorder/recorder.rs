use tracing::{debug, info};

use crate::error::RecorderError;
use crate::media::MediaChunk;

/// Recorder lifecycle: `idle → recording → (paused ⇄ recording)* → stopped`.
///
/// `stopped` is terminal; a new instance is required to record again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    Paused,
    Stopped,
}

impl RecorderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecorderState::Idle => "idle",
            RecorderState::Recording => "recording",
            RecorderState::Paused => "paused",
            RecorderState::Stopped => "stopped",
        }
    }
}

/// Accumulates encoded chunks in arrival order and finalizes them into one
/// immutable artifact on stop.
///
/// Invalid transitions are rejected with [`RecorderError`] rather than
/// silently ignored, so the state machine stays deterministic under racing
/// UI events.
pub struct CaptureRecorder {
    state: RecorderState,
    has_stream: bool,
    chunks: Vec<Vec<u8>>,
    elapsed_secs: u64,
}

impl CaptureRecorder {
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            has_stream: true,
            chunks: Vec::new(),
            elapsed_secs: 0,
        }
    }

    /// A recorder constructed without a live stream; `start` fails.
    pub fn without_stream() -> Self {
        Self {
            has_stream: false,
            ..Self::new()
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total bytes accumulated so far.
    pub fn artifact_len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Begin receiving chunks. Valid only from `idle`.
    pub fn start(&mut self) -> Result<(), RecorderError> {
        if self.state != RecorderState::Idle {
            return Err(self.invalid("start"));
        }
        if !self.has_stream {
            return Err(RecorderError::NoStream);
        }
        self.state = RecorderState::Recording;
        info!("Recording started");
        Ok(())
    }

    /// Suspend chunk accumulation and the elapsed counter. Valid only from
    /// `recording`; pausing while already paused is an error.
    pub fn pause(&mut self) -> Result<(), RecorderError> {
        if self.state != RecorderState::Recording {
            return Err(self.invalid("pause"));
        }
        self.state = RecorderState::Paused;
        info!("Recording paused at {}s", self.elapsed_secs);
        Ok(())
    }

    /// Resume from `paused`; the elapsed counter continues, never resets.
    pub fn resume(&mut self) -> Result<(), RecorderError> {
        if self.state != RecorderState::Paused {
            return Err(self.invalid("resume"));
        }
        self.state = RecorderState::Recording;
        info!("Recording resumed at {}s", self.elapsed_secs);
        Ok(())
    }

    /// Finalize: concatenate accumulated chunks in arrival order into one
    /// immutable artifact. Valid from `recording` or `paused`; signals
    /// completion to the caller exactly once.
    pub fn stop(&mut self) -> Result<Vec<u8>, RecorderError> {
        match self.state {
            RecorderState::Recording | RecorderState::Paused => {}
            _ => return Err(self.invalid("stop")),
        }
        self.state = RecorderState::Stopped;

        let total: usize = self.artifact_len();
        let mut artifact = Vec::with_capacity(total);
        for chunk in self.chunks.drain(..) {
            artifact.extend_from_slice(&chunk);
        }

        info!(
            "Recording stopped: {} bytes after {}s",
            artifact.len(),
            self.elapsed_secs
        );
        Ok(artifact)
    }

    /// Append one delivered chunk. Only chunks arriving while `recording`
    /// are kept; zero-size deliveries are filtered out, never appended.
    pub fn ingest(&mut self, chunk: MediaChunk) {
        if self.state != RecorderState::Recording {
            debug!(
                "Dropping {}-byte chunk delivered while {}",
                chunk.data.len(),
                self.state.as_str()
            );
            return;
        }
        if chunk.is_empty() {
            return;
        }
        self.chunks.push(chunk.data);
    }

    /// Advance the 1-second elapsed counter. Counts only while `recording`;
    /// paused time does not accumulate.
    pub fn tick(&mut self) {
        if self.state == RecorderState::Recording {
            self.elapsed_secs += 1;
        }
    }

    fn invalid(&self, op: &'static str) -> RecorderError {
        RecorderError::InvalidTransition {
            op,
            state: self.state.as_str(),
        }
    }
}

impl Default for CaptureRecorder {
    fn default() -> Self {
        Self::new()
    }
}
