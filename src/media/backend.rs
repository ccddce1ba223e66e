use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::error::DeviceError;

/// One encoded container fragment as delivered by the capture hardware.
///
/// Chunks arrive in capture order on a single-producer channel; concatenating
/// them in arrival order yields the container byte stream. Zero-length
/// deliveries are legal on the wire and are filtered by the recorder, never
/// appended.
#[derive(Debug, Clone)]
pub struct MediaChunk {
    /// Encoded bytes for this fragment.
    pub data: Vec<u8>,
    /// Timestamp in milliseconds since capture started.
    pub timestamp_ms: u64,
}

impl MediaChunk {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Which tracks to request from the device.
#[derive(Debug, Clone, Copy)]
pub struct MediaConstraints {
    pub video: bool,
    pub audio: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            video: true,
            audio: true,
        }
    }
}

/// Capture backend trait
///
/// Implementations model the camera/microphone hardware boundary:
/// - File: replay a pre-encoded container file as timed chunks
/// - Scripted: emit a fixed chunk sequence (tests, demos)
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Open the device and start delivering encoded chunks.
    ///
    /// Returns a channel receiver that will receive chunks in capture order.
    async fn open(
        &mut self,
        constraints: &MediaConstraints,
    ) -> Result<mpsc::Receiver<MediaChunk>, DeviceError>;

    /// Stop delivering chunks and relinquish the hardware.
    async fn close(&mut self) -> Result<(), DeviceError>;

    /// Check if the device is currently open
    fn is_open(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Capture source type
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// Replay an already-encoded container file
    File(PathBuf),
    /// Emit a scripted chunk sequence
    Scripted(Vec<MediaChunk>),
}

/// Capture backend factory
pub struct BackendFactory;

impl BackendFactory {
    pub fn create(source: CaptureSource, chunk_millis: u64) -> Box<dyn CaptureBackend> {
        match source {
            CaptureSource::File(path) => {
                Box::new(super::file::FileBackend::new(path, chunk_millis))
            }
            CaptureSource::Scripted(chunks) => Box::new(super::scripted::ScriptedBackend::new(
                chunks,
                std::time::Duration::from_millis(chunk_millis),
            )),
        }
    }
}
