use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::backend::{CaptureBackend, MediaChunk, MediaConstraints};
use crate::error::DeviceError;

/// Chunk size used when slicing the file into deliveries.
const CHUNK_BYTES: usize = 64 * 1024;

/// Replays a pre-encoded container file as a stream of timed chunks.
///
/// Stands in for live hardware in batch runs and the CLI: the file is sliced
/// into fixed-size fragments delivered at the configured cadence, the same
/// shape a live encoder produces.
pub struct FileBackend {
    path: PathBuf,
    chunk_millis: u64,
    feeder: Option<JoinHandle<()>>,
}

impl FileBackend {
    pub fn new(path: PathBuf, chunk_millis: u64) -> Self {
        Self {
            path,
            chunk_millis,
            feeder: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for FileBackend {
    async fn open(
        &mut self,
        _constraints: &MediaConstraints,
    ) -> Result<mpsc::Receiver<MediaChunk>, DeviceError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DeviceError::NotFound
            } else if e.kind() == std::io::ErrorKind::PermissionDenied {
                DeviceError::PermissionDenied
            } else {
                DeviceError::Backend(e.to_string())
            }
        })?;

        info!(
            "File backend open: {:?} ({} bytes, {}ms cadence)",
            self.path,
            bytes.len(),
            self.chunk_millis
        );

        let (tx, rx) = mpsc::channel(100);
        let chunk_millis = self.chunk_millis;

        let feeder = tokio::spawn(async move {
            let mut timestamp_ms = 0u64;
            for slice in bytes.chunks(CHUNK_BYTES) {
                tokio::time::sleep(Duration::from_millis(chunk_millis)).await;
                timestamp_ms += chunk_millis;
                let chunk = MediaChunk {
                    data: slice.to_vec(),
                    timestamp_ms,
                };
                if tx.send(chunk).await.is_err() {
                    // Receiver dropped, device released.
                    break;
                }
            }
        });

        self.feeder = Some(feeder);
        Ok(rx)
    }

    async fn close(&mut self) -> Result<(), DeviceError> {
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
            if let Err(e) = feeder.await {
                if !e.is_cancelled() {
                    warn!("File feeder task failed on close: {}", e);
                }
            }
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.feeder.is_some()
    }

    fn name(&self) -> &str {
        "file"
    }
}
