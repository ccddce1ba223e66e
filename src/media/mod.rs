pub mod backend;
pub mod device;
pub mod file;
pub mod scripted;

pub use backend::{BackendFactory, CaptureBackend, CaptureSource, MediaChunk, MediaConstraints};
pub use device::DeviceSession;
pub use file::FileBackend;
pub use scripted::ScriptedBackend;
