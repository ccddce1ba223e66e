use thiserror::Error;

/// Camera/microphone acquisition failures.
///
/// Surfaced to the user as a blocking message; acquisition is not retried
/// automatically. The screen stays in a non-recording state.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("camera/microphone permission denied")]
    PermissionDenied,

    #[error("no capture device available")]
    NotFound,

    #[error("capture backend failed: {0}")]
    Backend(String),
}

/// Invalid recorder state transitions or recording without a live stream.
///
/// These are invariant violations in correct usage; when one occurs the
/// current recording is aborted and hardware released.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecorderError {
    #[error("invalid transition: {op} while {state}")]
    InvalidTransition {
        op: &'static str,
        state: &'static str,
    },

    #[error("recording attempted without a live stream")]
    NoStream,
}

/// Malformed captured container during duration repair.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepairError {
    #[error("container truncated at offset {0}")]
    Truncated(usize),

    #[error("not an EBML container")]
    BadMagic,

    #[error("element size overruns the container at offset {0}")]
    Oversize(usize),

    #[error("container has no segment info")]
    NoInfo,

    #[error("container has no clusters to derive a duration from")]
    NoClusters,
}

/// Network failure, timeout, or non-2xx response while uploading.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upload rejected with status {0}")]
    Status(u16),
}

/// Umbrella error for one pipeline run.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Recorder(#[from] RecorderError),

    #[error(transparent)]
    Repair(#[from] RepairError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}
