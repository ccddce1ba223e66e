use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use super::backend::{CaptureBackend, MediaChunk, MediaConstraints};
use crate::error::DeviceError;

/// Emits a fixed, pre-scripted chunk sequence at a steady cadence.
///
/// Used by tests and demos to simulate the hardware's asynchronous chunk
/// delivery, including zero-size deliveries.
pub struct ScriptedBackend {
    script: Vec<MediaChunk>,
    cadence: Duration,
    open: bool,
}

impl ScriptedBackend {
    pub fn new(script: Vec<MediaChunk>, cadence: Duration) -> Self {
        Self {
            script,
            cadence,
            open: false,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for ScriptedBackend {
    async fn open(
        &mut self,
        _constraints: &MediaConstraints,
    ) -> Result<mpsc::Receiver<MediaChunk>, DeviceError> {
        let (tx, rx) = mpsc::channel(100);
        let script = std::mem::take(&mut self.script);
        let cadence = self.cadence;

        info!("Scripted backend open: {} chunks queued", script.len());

        tokio::spawn(async move {
            for chunk in script {
                tokio::time::sleep(cadence).await;
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
        });

        self.open = true;
        Ok(rx)
    }

    async fn close(&mut self) -> Result<(), DeviceError> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
