//! Upload coordinator and the read-only API collaborators.
//!
//! One multipart POST per finalized recording, routed by stage; GET helpers
//! for the AI counterpart text/video and feedback summaries the screens
//! render.

mod api;
mod client;

pub use api::{ApiClient, DebateStart, Feedback, Question};
pub use client::{HttpUploader, UploadRequest, UploadResponse, Uploader};
