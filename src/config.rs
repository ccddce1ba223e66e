use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::stage::Stage;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the coaching backend.
    pub base_url: String,
    /// Upload timeout; expiry is treated as an upload failure.
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct CaptureConfig {
    /// Delivery cadence of the file-replay backend, in milliseconds.
    pub chunk_millis: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { chunk_millis: 100 }
    }
}

/// Per-stage multipart field-name overrides, keyed by stage name
/// (e.g. `debate-opening = "video"`), for backends that still expect the
/// legacy field.
#[derive(Debug, Default, Deserialize)]
pub struct UploadConfig {
    #[serde(default)]
    pub field_overrides: HashMap<String, String>,
}

fn default_upload_timeout_secs() -> u64 {
    30
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.api.upload_timeout_secs)
    }

    pub fn field_override(&self, stage: Stage) -> Option<&str> {
        self.upload
            .field_overrides
            .get(stage.as_str())
            .map(String::as_str)
    }
}
