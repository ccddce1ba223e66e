pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod recorder;
pub mod repair;
pub mod stage;
pub mod upload;

pub use config::Config;
pub use error::{CaptureError, DeviceError, RecorderError, RepairError, UploadError};
pub use media::{
    BackendFactory, CaptureBackend, CaptureSource, DeviceSession, FileBackend, MediaChunk,
    MediaConstraints, ScriptedBackend,
};
pub use pipeline::{PipelineCommand, PipelineOutcome, PipelineStats, RecordingPipeline};
pub use recorder::{CaptureRecorder, RecorderState};
pub use stage::{AuthContext, RoutingMetadata, Screen, Stage};
pub use upload::{ApiClient, HttpUploader, UploadRequest, UploadResponse, Uploader};
