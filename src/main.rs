use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use veriview_capture::{
    AuthContext, BackendFactory, CaptureSource, Config, DeviceSession, HttpUploader,
    MediaConstraints, PipelineCommand, PipelineOutcome, RecordingPipeline, RoutingMetadata, Stage,
};

#[derive(Parser)]
#[command(name = "veriview-capture", about = "Capture/upload pipeline for VeriView coaching flows")]
struct Cli {
    /// Config file (without extension), loaded via the config crate.
    #[arg(long, default_value = "config/veriview-capture")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a recorded container file through the full pipeline.
    Record {
        /// Stage to upload as (e.g. debate-opening, interview-tech).
        #[arg(long)]
        stage: Stage,

        /// Debate or interview id the upload is routed to.
        #[arg(long)]
        id: String,

        /// Pre-encoded WebM file to replay as the capture stream.
        #[arg(long)]
        input: PathBuf,

        /// Seconds to keep the simulated recording running.
        #[arg(long, default_value_t = 3)]
        record_secs: u64,

        /// Bearer token for the backend, if it requires auth.
        #[arg(long)]
        token: Option<String>,
    },

    /// List the known stages and their upload endpoints.
    Stages,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config).context("Failed to load configuration")?;

    info!("{} starting", cfg.service.name);

    match cli.command {
        Command::Stages => {
            for stage in Stage::ALL {
                println!(
                    "{:<26} POST {}  field={}",
                    stage.to_string(),
                    stage.upload_path("{id}"),
                    cfg.field_override(stage).unwrap_or_else(|| stage.field_name()),
                );
            }
            Ok(())
        }

        Command::Record {
            stage,
            id,
            input,
            record_secs,
            token,
        } => run_record(&cfg, stage, id, input, record_secs, token).await,
    }
}

async fn run_record(
    cfg: &Config,
    stage: Stage,
    id: String,
    input: PathBuf,
    record_secs: u64,
    token: Option<String>,
) -> Result<()> {
    let auth = AuthContext {
        user_id: "cli".to_string(),
        token,
    };

    let backend = BackendFactory::create(CaptureSource::File(input), cfg.capture.chunk_millis);
    let (session, stream) = DeviceSession::acquire(backend, MediaConstraints::default())
        .await
        .context("Failed to acquire capture device")?;

    let uploader = Arc::new(HttpUploader::new(auth, cfg.upload_timeout()));
    let metadata = RoutingMetadata::new(id);
    let pipeline = RecordingPipeline::new(
        session,
        stream,
        stage,
        metadata,
        uploader,
        &cfg.api.base_url,
        cfg.field_override(stage),
    );

    let (control_tx, control_rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();

    // Drive the screen's button presses: start, wait, stop.
    tokio::spawn(async move {
        let _ = control_tx.send(PipelineCommand::Start).await;
        tokio::time::sleep(Duration::from_secs(record_secs)).await;
        let _ = control_tx.send(PipelineCommand::Stop).await;
    });

    match pipeline.run(control_rx, cancel).await? {
        PipelineOutcome::Completed {
            screen,
            metadata,
            response,
            stats,
        } => {
            info!(
                "Recording uploaded: {} chunks, {} bytes, {}s -> next screen {}",
                stats.chunk_count,
                stats.artifact_bytes,
                stats.elapsed_secs,
                screen.route()
            );
            info!("Routing metadata forwarded: entity {}", metadata.entity_id);
            if let Some(body) = response.body {
                info!("Backend response: {}", body);
            }
        }
        PipelineOutcome::Cancelled { screen } => {
            info!("Pipeline cancelled; exit screen {}", screen.route());
        }
    }

    Ok(())
}
