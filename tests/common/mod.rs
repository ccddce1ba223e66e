// Shared test support: a synthetic chunked-WebM builder, a capture backend
// with an observable open/closed flag, and an uploader double that records
// every submit call.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use veriview_capture::repair::ebml;
use veriview_capture::{
    CaptureBackend, DeviceError, MediaChunk, MediaConstraints, UploadError, UploadRequest,
    UploadResponse, Uploader,
};

/// Build a minimal streaming-style WebM: EBML header, unknown-size Segment,
/// Info with only a TimestampScale (no Duration — the defect under repair),
/// and one cluster at `cluster_ts` ms containing a SimpleBlock per entry in
/// `block_rels` (relative ms, `payload_len` filler bytes each).
pub fn synth_webm(cluster_ts: u64, block_rels: &[i16], payload_len: usize) -> Vec<u8> {
    let mut out = Vec::new();

    // EBML header with a DocType, copied verbatim by the repair.
    let mut header = Vec::new();
    ebml::write_element(&mut header, 0x4282, b"webm");
    ebml::write_element(&mut out, ebml::EBML_HEADER, &header);

    // Unknown-size segment, as streaming muxers emit.
    ebml::write_id(&mut out, ebml::SEGMENT);
    out.push(0xFF);

    let mut info = Vec::new();
    ebml::write_element(
        &mut info,
        ebml::TIMESTAMP_SCALE,
        &ebml::DEFAULT_TIMESTAMP_SCALE.to_be_bytes()[5..],
    );
    ebml::write_element(&mut out, ebml::INFO, &info);

    let mut cluster = Vec::new();
    ebml::write_element(
        &mut cluster,
        ebml::CLUSTER_TIMESTAMP,
        &cluster_ts.to_be_bytes()[6..],
    );
    for &rel in block_rels {
        let mut block = Vec::new();
        block.push(0x81); // track 1
        block.extend_from_slice(&rel.to_be_bytes());
        block.push(0x00); // flags
        block.extend_from_slice(&vec![0xAB; payload_len]);
        ebml::write_element(&mut cluster, ebml::SIMPLE_BLOCK, &block);
    }
    ebml::write_element(&mut out, ebml::CLUSTER, &cluster);

    out
}

/// Capture backend that delivers a fixed chunk script with a paced cadence
/// and exposes its open/closed state through a shared flag, so tests can
/// observe device release after the session has been moved into a pipeline.
pub struct ProbeBackend {
    script: Vec<MediaChunk>,
    pacing: Duration,
    open: Arc<AtomicBool>,
    fail_with: Option<DeviceError>,
}

impl ProbeBackend {
    pub fn new(script: Vec<MediaChunk>, pacing: Duration) -> (Self, Arc<AtomicBool>) {
        let open = Arc::new(AtomicBool::new(false));
        (
            Self {
                script,
                pacing,
                open: Arc::clone(&open),
                fail_with: None,
            },
            open,
        )
    }

    pub fn failing(err: DeviceError) -> Self {
        Self {
            script: Vec::new(),
            pacing: Duration::ZERO,
            open: Arc::new(AtomicBool::new(false)),
            fail_with: Some(err),
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for ProbeBackend {
    async fn open(
        &mut self,
        _constraints: &MediaConstraints,
    ) -> Result<mpsc::Receiver<MediaChunk>, DeviceError> {
        if let Some(err) = self.fail_with.take() {
            return Err(err);
        }

        let (tx, rx) = mpsc::channel(100);
        let script = std::mem::take(&mut self.script);
        let pacing = self.pacing;

        tokio::spawn(async move {
            for chunk in script {
                tokio::time::sleep(pacing).await;
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
        });

        self.open.store(true, Ordering::SeqCst);
        Ok(rx)
    }

    async fn close(&mut self) -> Result<(), DeviceError> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "probe"
    }
}

/// Backend whose chunk stream is fed directly by the test, for exact
/// control over what sits in the channel when a command lands.
pub struct ManualBackend {
    rx: Option<mpsc::Receiver<MediaChunk>>,
    open: Arc<AtomicBool>,
}

impl ManualBackend {
    pub fn new() -> (Self, mpsc::Sender<MediaChunk>, Arc<AtomicBool>) {
        let (tx, rx) = mpsc::channel(16);
        let open = Arc::new(AtomicBool::new(false));
        (
            Self {
                rx: Some(rx),
                open: Arc::clone(&open),
            },
            tx,
            open,
        )
    }
}

#[async_trait::async_trait]
impl CaptureBackend for ManualBackend {
    async fn open(
        &mut self,
        _constraints: &MediaConstraints,
    ) -> Result<mpsc::Receiver<MediaChunk>, DeviceError> {
        self.open.store(true, Ordering::SeqCst);
        self.rx
            .take()
            .ok_or_else(|| DeviceError::Backend("already opened".to_string()))
    }

    async fn close(&mut self) -> Result<(), DeviceError> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "manual"
    }
}

/// Uploader double: records every submit and optionally fails with a status.
pub struct RecordingUploader {
    pub calls: Mutex<Vec<UploadRequest>>,
    fail_status: Option<u16>,
}

impl RecordingUploader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_status: None,
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_status: Some(status),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Uploader for RecordingUploader {
    async fn submit(&self, request: UploadRequest) -> Result<UploadResponse, UploadError> {
        self.calls.lock().unwrap().push(request);
        match self.fail_status {
            Some(status) => Err(UploadError::Status(status)),
            None => Ok(UploadResponse {
                status: 200,
                body: Some(serde_json::json!({ "status": "stored" })),
            }),
        }
    }
}

/// Split a byte buffer into MediaChunks of the given sizes, in order.
/// A zero size produces a zero-size delivery at that position.
pub fn chunks_of(bytes: &[u8], sizes: &[usize]) -> Vec<MediaChunk> {
    let mut chunks = Vec::new();
    let mut offset = 0;
    for (i, &size) in sizes.iter().enumerate() {
        chunks.push(MediaChunk {
            data: bytes[offset..offset + size].to_vec(),
            timestamp_ms: (i as u64) * 100,
        });
        offset += size;
    }
    assert_eq!(offset, bytes.len(), "sizes must cover the whole buffer");
    chunks
}
