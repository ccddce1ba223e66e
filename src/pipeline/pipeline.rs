use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::stats::PipelineStats;
use crate::error::CaptureError;
use crate::media::{DeviceSession, MediaChunk};
use crate::recorder::{CaptureRecorder, RecorderState};
use crate::repair;
use crate::stage::{RoutingMetadata, Screen, Stage};
use crate::upload::{UploadRequest, UploadResponse, Uploader};

/// Control commands the screen feeds into a running pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineCommand {
    Start,
    Pause,
    Resume,
    Stop,
}

/// Terminal outcome of one pipeline run.
///
/// Errors (device, recorder, repair, upload) are returned as `Err` from
/// [`RecordingPipeline::run`]; in every such case the device has already
/// been released and the screen stays put so the user can retry by
/// re-entering.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// Upload accepted; navigate to `screen`, forwarding `metadata`
    /// unchanged plus the backend's response body.
    Completed {
        screen: Screen,
        metadata: RoutingMetadata,
        response: UploadResponse,
        stats: PipelineStats,
    },
    /// User exit or teardown before a recording was finalized, or during
    /// the upload. Hardware released; `screen` is the exit destination.
    Cancelled { screen: Screen },
}

/// One instantiation of the capture lifecycle for one recording screen.
pub struct RecordingPipeline {
    session: DeviceSession,
    stream: mpsc::Receiver<MediaChunk>,
    stage: Stage,
    metadata: RoutingMetadata,
    uploader: Arc<dyn Uploader>,
    endpoint: String,
    field_name: String,
}

impl RecordingPipeline {
    pub fn new(
        session: DeviceSession,
        stream: mpsc::Receiver<MediaChunk>,
        stage: Stage,
        metadata: RoutingMetadata,
        uploader: Arc<dyn Uploader>,
        base_url: &str,
        field_override: Option<&str>,
    ) -> Self {
        let endpoint = format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            stage.upload_path(&metadata.entity_id)
        );
        let field_name = field_override.unwrap_or_else(|| stage.field_name()).to_string();

        Self {
            session,
            stream,
            stage,
            metadata,
            uploader,
            endpoint,
            field_name,
        }
    }

    /// Drive the screen's capture lifecycle to completion.
    ///
    /// The loop multiplexes chunk arrivals, 1-second clock ticks, control
    /// commands, and cancellation on one task. Returning — on any path —
    /// implies the device session has been released.
    pub async fn run(
        self,
        mut control: mpsc::Receiver<PipelineCommand>,
        cancel: CancellationToken,
    ) -> Result<PipelineOutcome, CaptureError> {
        let RecordingPipeline {
            mut session,
            mut stream,
            stage,
            metadata,
            uploader,
            endpoint,
            field_name,
        } = self;

        let started_at = Utc::now();
        let mut recorder = CaptureRecorder::new();
        let mut stream_open = true;

        let mut ticker = interval_at(
            Instant::now() + Duration::from_secs(1),
            Duration::from_secs(1),
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Pipeline started: stage {} -> {} (field \"{}\")",
            stage, endpoint, field_name
        );

        let stop_reason = loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("User exit: abandoning recording for stage {}", stage);
                    session.release().await;
                    return Ok(PipelineOutcome::Cancelled { screen: Screen::Home });
                }

                chunk = stream.recv(), if stream_open => match chunk {
                    Some(chunk) => recorder.ingest(chunk),
                    None => stream_open = false,
                },

                _ = ticker.tick() => recorder.tick(),

                cmd = control.recv() => match cmd {
                    Some(PipelineCommand::Start) => {
                        if let Err(e) = recorder.start() {
                            session.release().await;
                            return Err(e.into());
                        }
                    }
                    Some(PipelineCommand::Pause) => {
                        if let Err(e) = recorder.pause() {
                            session.release().await;
                            return Err(e.into());
                        }
                    }
                    Some(PipelineCommand::Resume) => {
                        if let Err(e) = recorder.resume() {
                            session.release().await;
                            return Err(e.into());
                        }
                    }
                    Some(PipelineCommand::Stop) => break "stop",
                    // Control channel dropped: the screen tore down.
                    None => break "teardown",
                },
            }
        };

        // The ticker is dropped with the loop; no elapsed-time mutation can
        // occur past this point.

        match recorder.state() {
            RecorderState::Recording | RecorderState::Paused => {}
            _ => {
                // Teardown before any recording began.
                info!("Pipeline closed ({}) with nothing recorded", stop_reason);
                session.release().await;
                return Ok(PipelineOutcome::Cancelled { screen: Screen::Home });
            }
        }

        // Chunks the backend delivered before the stop command can still be
        // queued in the stream; fold them in before finalizing so the
        // artifact is never cut mid-element.
        while let Ok(chunk) = stream.try_recv() {
            recorder.ingest(chunk);
        }

        info!("Finalizing recording ({})", stop_reason);
        let chunk_count = recorder.chunk_count();
        let artifact = match recorder.stop() {
            Ok(artifact) => artifact,
            Err(e) => {
                session.release().await;
                return Err(e.into());
            }
        };
        let stats = PipelineStats {
            started_at,
            elapsed_secs: recorder.elapsed_secs(),
            chunk_count,
            artifact_bytes: artifact.len(),
        };

        let repaired = match repair::repair(&artifact) {
            Ok(repaired) => repaired,
            Err(e) => {
                error!("Duration repair failed, aborting upload: {}", e);
                session.release().await;
                return Err(e.into());
            }
        };

        // The artifact is fully owned in memory before any release can
        // happen; consuming the request by value makes a second submit of
        // the same recording unrepresentable.
        let request = UploadRequest {
            endpoint,
            field_name,
            file_name: stage.file_name().to_string(),
            payload: repaired,
        };

        let response = tokio::select! {
            _ = cancel.cancelled() => {
                warn!("User exit during upload; response will not navigate");
                session.release().await;
                return Ok(PipelineOutcome::Cancelled { screen: Screen::Home });
            }
            result = uploader.submit(request) => match result {
                Ok(response) => response,
                Err(e) => {
                    error!("Upload failed for stage {}: {}", stage, e);
                    session.release().await;
                    return Err(e.into());
                }
            }
        };

        session.release().await;

        if cancel.is_cancelled() {
            warn!("User exit raced upload completion; suppressing navigation");
            return Ok(PipelineOutcome::Cancelled { screen: Screen::Home });
        }

        let screen = stage.next_screen();
        info!(
            "Upload complete for stage {} ({} bytes); navigating to {}",
            stage, stats.artifact_bytes, screen.route()
        );

        Ok(PipelineOutcome::Completed {
            screen,
            metadata,
            response,
            stats,
        })
    }
}
