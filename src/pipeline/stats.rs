use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of one pipeline run, reported with the final outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStats {
    /// When the pipeline started driving the screen.
    pub started_at: DateTime<Utc>,

    /// Recorded time in whole seconds; paused time excluded.
    pub elapsed_secs: u64,

    /// Number of non-empty chunks accumulated.
    pub chunk_count: usize,

    /// Size of the finalized artifact before repair, in bytes.
    pub artifact_bytes: usize,
}
