//! WebM duration repair
//!
//! Containers assembled from streamed encoder chunks carry no `Duration`
//! element in `Segment > Info`, so players report an unknown or zero
//! duration. `repair` walks the EBML structure, derives the real duration
//! from the cluster/block timestamps, and rewrites the Info element with a
//! correct float64 `Duration`. Pure transformation; malformed input fails
//! with [`RepairError`] and the pipeline aborts the upload rather than
//! shipping a broken artifact.

pub mod ebml;

use tracing::debug;

use crate::error::RepairError;
use ebml::{read_header, read_size, read_uint, write_element, write_id, write_size};

/// A segment-level child element located in the raw buffer.
struct Child {
    id: u32,
    /// Full extent including the header.
    span: std::ops::Range<usize>,
    /// Payload extent.
    payload: std::ops::Range<usize>,
}

/// Rewrite `raw` so that `Segment > Info` carries the duration actually
/// covered by the stream's blocks.
pub fn repair(raw: &[u8]) -> Result<Vec<u8>, RepairError> {
    // EBML header, copied through verbatim.
    let header = read_header(raw, 0)?;
    if header.id != ebml::EBML_HEADER {
        return Err(RepairError::BadMagic);
    }
    let header_size = header.known_size(0)?;
    let seg_pos = header.header_len + header_size;
    if seg_pos > raw.len() {
        return Err(RepairError::Oversize(0));
    }

    let segment = read_header(raw, seg_pos)?;
    if segment.id != ebml::SEGMENT {
        return Err(RepairError::BadMagic);
    }
    let seg_data_start = seg_pos + segment.header_len;
    let seg_data_end = match segment.size {
        // Streaming muxers leave the segment unknown-size; it runs to EOF.
        None => raw.len(),
        Some(size) => {
            let end = seg_data_start + size as usize;
            if end > raw.len() {
                return Err(RepairError::Oversize(seg_pos));
            }
            end
        }
    };

    let children = walk_segment(raw, seg_data_start, seg_data_end)?;

    let duration_ms = scan_duration_ms(raw, &children)?;
    let info = children
        .iter()
        .find(|c| c.id == ebml::INFO)
        .ok_or(RepairError::NoInfo)?;
    let new_info = patch_info(&raw[info.payload.clone()], duration_ms)?;

    debug!(
        "Repairing container duration: {} ms over {} segment children",
        duration_ms,
        children.len()
    );

    // Reassemble: header verbatim, then the segment with the patched Info.
    let mut out = Vec::with_capacity(raw.len() + 16);
    out.extend_from_slice(&raw[..seg_pos]);

    let mut seg_payload = Vec::with_capacity(seg_data_end - seg_data_start + 16);
    for child in &children {
        if child.id == ebml::INFO {
            write_element(&mut seg_payload, ebml::INFO, &new_info);
        } else {
            seg_payload.extend_from_slice(&raw[child.span.clone()]);
        }
    }

    write_id(&mut out, ebml::SEGMENT);
    match segment.size {
        // Keep the unknown-size encoding exactly as captured.
        None => {
            let (id_len_probe, id_len) = ebml::read_id(raw, seg_pos)?;
            debug_assert_eq!(id_len_probe, ebml::SEGMENT);
            out.extend_from_slice(&raw[seg_pos + id_len..seg_data_start]);
        }
        Some(_) => write_size(&mut out, seg_payload.len() as u64),
    }
    out.extend_from_slice(&seg_payload);

    Ok(out)
}

/// Locate every segment-level child, bounding unknown-size clusters by the
/// next segment-level ID (or end of data).
fn walk_segment(raw: &[u8], start: usize, end: usize) -> Result<Vec<Child>, RepairError> {
    let mut children = Vec::new();
    let mut pos = start;

    while pos < end {
        let h = read_header(raw, pos)?;
        let payload_start = pos + h.header_len;

        let payload_end = match h.size {
            Some(size) => {
                let e = payload_start + size as usize;
                if e > end {
                    return Err(RepairError::Oversize(pos));
                }
                e
            }
            None if h.id == ebml::CLUSTER => bound_unknown_cluster(raw, payload_start, end)?,
            None => return Err(RepairError::Oversize(pos)),
        };

        children.push(Child {
            id: h.id,
            span: pos..payload_end,
            payload: payload_start..payload_end,
        });
        pos = payload_end;
    }

    Ok(children)
}

/// An unknown-size cluster ends at the next segment-level element.
fn bound_unknown_cluster(raw: &[u8], start: usize, end: usize) -> Result<usize, RepairError> {
    let mut pos = start;
    while pos < end {
        let (id, _) = ebml::read_id(raw, pos)?;
        if ebml::is_segment_level(id) {
            return Ok(pos);
        }
        let h = read_header(raw, pos)?;
        let size = h.known_size(pos)?;
        let next = pos + h.header_len + size;
        if next > end {
            return Err(RepairError::Oversize(pos));
        }
        pos = next;
    }
    Ok(end)
}

/// Derive the stream duration in milliseconds of timestamp ticks: the
/// maximum of (cluster timestamp + block relative timestamp) over every
/// block in every cluster.
fn scan_duration_ms(raw: &[u8], children: &[Child]) -> Result<u64, RepairError> {
    let mut saw_cluster = false;
    let mut max_end: i64 = -1;

    for cluster in children.iter().filter(|c| c.id == ebml::CLUSTER) {
        saw_cluster = true;
        let mut cluster_ts: i64 = 0;
        let mut pos = cluster.payload.start;

        while pos < cluster.payload.end {
            let h = read_header(raw, pos)?;
            let size = h.known_size(pos)?;
            let payload = pos + h.header_len..pos + h.header_len + size;
            if payload.end > cluster.payload.end {
                return Err(RepairError::Oversize(pos));
            }

            match h.id {
                ebml::CLUSTER_TIMESTAMP => {
                    cluster_ts = read_uint(&raw[payload.clone()]) as i64;
                    max_end = max_end.max(cluster_ts);
                }
                ebml::SIMPLE_BLOCK => {
                    let rel = block_relative_ts(&raw[payload.clone()], pos)?;
                    max_end = max_end.max(cluster_ts + rel as i64);
                }
                ebml::BLOCK_GROUP => {
                    let mut inner = payload.start;
                    while inner < payload.end {
                        let bh = read_header(raw, inner)?;
                        let bsize = bh.known_size(inner)?;
                        let bpayload = inner + bh.header_len..inner + bh.header_len + bsize;
                        if bpayload.end > payload.end {
                            return Err(RepairError::Oversize(inner));
                        }
                        if bh.id == ebml::BLOCK {
                            let rel = block_relative_ts(&raw[bpayload.clone()], inner)?;
                            max_end = max_end.max(cluster_ts + rel as i64);
                        }
                        inner = bpayload.end;
                    }
                }
                _ => {}
            }
            pos = payload.end;
        }
    }

    if !saw_cluster || max_end < 0 {
        return Err(RepairError::NoClusters);
    }
    Ok(max_end as u64)
}

/// Relative timestamp of a (Simple)Block: track-number VINT, then a signed
/// 16-bit big-endian offset from the cluster timestamp.
fn block_relative_ts(payload: &[u8], at: usize) -> Result<i16, RepairError> {
    let (track, track_len) = read_size(payload, 0)?;
    if track.is_none() {
        return Err(RepairError::Truncated(at));
    }
    let ts = payload
        .get(track_len..track_len + 2)
        .ok_or(RepairError::Truncated(at))?;
    Ok(i16::from_be_bytes([ts[0], ts[1]]))
}

/// Rebuild the Info payload with a correct float64 Duration, dropping any
/// stale Duration element already present.
fn patch_info(info: &[u8], duration_ms: u64) -> Result<Vec<u8>, RepairError> {
    let mut timestamp_scale = ebml::DEFAULT_TIMESTAMP_SCALE;
    let mut out = Vec::with_capacity(info.len() + 16);
    let mut pos = 0;

    while pos < info.len() {
        let h = read_header(info, pos)?;
        let size = h.known_size(pos)?;
        let end = pos + h.header_len + size;
        if end > info.len() {
            return Err(RepairError::Oversize(pos));
        }

        match h.id {
            ebml::DURATION => {} // dropped, rewritten below
            ebml::TIMESTAMP_SCALE => {
                timestamp_scale = read_uint(&info[pos + h.header_len..end]).max(1);
                out.extend_from_slice(&info[pos..end]);
            }
            _ => out.extend_from_slice(&info[pos..end]),
        }
        pos = end;
    }

    // Duration is expressed in timestamp-scale ticks; block timestamps are
    // milliseconds under the default 1ms scale.
    let duration_ticks =
        (duration_ms as f64) * 1_000_000.0 / (timestamp_scale as f64);
    write_element(&mut out, ebml::DURATION, &duration_ticks.to_be_bytes());

    Ok(out)
}

/// Read back the Duration recorded in a container, in timestamp ticks.
/// Test/diagnostic helper for verifying a repaired artifact.
pub fn read_duration_ticks(raw: &[u8]) -> Result<Option<f64>, RepairError> {
    let header = read_header(raw, 0)?;
    if header.id != ebml::EBML_HEADER {
        return Err(RepairError::BadMagic);
    }
    let seg_pos = header.header_len + header.known_size(0)?;
    let segment = read_header(raw, seg_pos)?;
    if segment.id != ebml::SEGMENT {
        return Err(RepairError::BadMagic);
    }
    let start = seg_pos + segment.header_len;
    let end = match segment.size {
        None => raw.len(),
        Some(size) => start + size as usize,
    };

    for child in walk_segment(raw, start, end.min(raw.len()))? {
        if child.id != ebml::INFO {
            continue;
        }
        let info = &raw[child.payload.clone()];
        let mut pos = 0;
        while pos < info.len() {
            let h = read_header(info, pos)?;
            let size = h.known_size(pos)?;
            let payload = &info[pos + h.header_len..pos + h.header_len + size];
            if h.id == ebml::DURATION {
                return Ok(ebml::read_float(payload));
            }
            pos += h.header_len + size;
        }
    }
    Ok(None)
}
