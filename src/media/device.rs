use tokio::sync::mpsc;
use tracing::{info, warn};

use super::backend::{CaptureBackend, MediaChunk, MediaConstraints};
use crate::error::DeviceError;

/// Exclusive owner of one open capture device for the lifetime of a
/// recording screen.
///
/// Every exit path of a screen (successful upload, user exit, upload error,
/// teardown) converges on the same [`DeviceSession::release`] call; release
/// is idempotent so racing paths are harmless.
pub struct DeviceSession {
    backend: Box<dyn CaptureBackend>,
    active: bool,
}

impl DeviceSession {
    /// Acquire the device and begin consuming hardware resources.
    ///
    /// Returns the session plus the chunk receiver the recorder will drain.
    /// Failure (permission denied, no device) leaves the screen in a
    /// non-recording state; it is not retried automatically.
    pub async fn acquire(
        mut backend: Box<dyn CaptureBackend>,
        constraints: MediaConstraints,
    ) -> Result<(Self, mpsc::Receiver<MediaChunk>), DeviceError> {
        let rx = backend.open(&constraints).await?;
        info!("Device session acquired ({} backend)", backend.name());

        Ok((
            Self {
                backend,
                active: true,
            },
            rx,
        ))
    }

    /// Stop every track and clear the handle. Safe to call any number of
    /// times; calls after the first are no-ops.
    pub async fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        if let Err(e) = self.backend.close().await {
            warn!("Capture backend failed to close cleanly: {}", e);
        }
        info!("Device session released ({} backend)", self.backend.name());
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
