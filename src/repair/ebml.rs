//! Minimal EBML primitives: element IDs, variable-length integers, and the
//! element header walk used by the duration repair.

use crate::error::RepairError;

// Element IDs, stored with their marker bits as they appear on the wire.
pub const EBML_HEADER: u32 = 0x1A45_DFA3;
pub const SEGMENT: u32 = 0x1853_8067;
pub const SEEK_HEAD: u32 = 0x114D_9B74;
pub const INFO: u32 = 0x1549_A966;
pub const TIMESTAMP_SCALE: u32 = 0x2A_D7B1;
pub const DURATION: u32 = 0x4489;
pub const TRACKS: u32 = 0x1654_AE6B;
pub const CLUSTER: u32 = 0x1F43_B675;
pub const CLUSTER_TIMESTAMP: u32 = 0xE7;
pub const SIMPLE_BLOCK: u32 = 0xA3;
pub const BLOCK_GROUP: u32 = 0xA0;
pub const BLOCK: u32 = 0xA1;
pub const CUES: u32 = 0x1C53_BB6B;
pub const CHAPTERS: u32 = 0x1043_A770;
pub const TAGS: u32 = 0x1254_C367;
pub const ATTACHMENTS: u32 = 0x1941_A469;

/// Nanoseconds per timestamp tick when the Info carries no TimestampScale.
pub const DEFAULT_TIMESTAMP_SCALE: u64 = 1_000_000;

/// Parsed element header: id, declared size (`None` = unknown-size), and the
/// number of header bytes consumed.
#[derive(Debug, Clone, Copy)]
pub struct ElementHeader {
    pub id: u32,
    pub size: Option<u64>,
    pub header_len: usize,
}

impl ElementHeader {
    /// Known payload size, or an error for unknown-size elements that the
    /// caller cannot bound.
    pub fn known_size(&self, at: usize) -> Result<usize, RepairError> {
        self.size
            .map(|s| s as usize)
            .ok_or(RepairError::Oversize(at))
    }
}

/// Read an element ID at `pos`. IDs keep their marker bits.
pub fn read_id(buf: &[u8], pos: usize) -> Result<(u32, usize), RepairError> {
    let first = *buf.get(pos).ok_or(RepairError::Truncated(pos))?;
    let len = (first.leading_zeros() as usize) + 1;
    if len > 4 {
        return Err(RepairError::Truncated(pos));
    }
    if pos + len > buf.len() {
        return Err(RepairError::Truncated(pos));
    }
    let mut id = 0u32;
    for &b in &buf[pos..pos + len] {
        id = (id << 8) | b as u32;
    }
    Ok((id, len))
}

/// Read a size VINT at `pos`. Returns `None` for the reserved all-ones
/// (unknown size) encoding.
pub fn read_size(buf: &[u8], pos: usize) -> Result<(Option<u64>, usize), RepairError> {
    let first = *buf.get(pos).ok_or(RepairError::Truncated(pos))?;
    if first == 0 {
        return Err(RepairError::Truncated(pos));
    }
    let len = (first.leading_zeros() as usize) + 1;
    if pos + len > buf.len() {
        return Err(RepairError::Truncated(pos));
    }
    let mut value = (first as u64) & (0xFF_u64 >> len);
    for &b in &buf[pos + 1..pos + len] {
        value = (value << 8) | b as u64;
    }
    // All value bits set means "unknown size".
    let max = if len == 8 {
        u64::MAX >> 8
    } else {
        (1u64 << (7 * len)) - 1
    };
    if value == max {
        Ok((None, len))
    } else {
        Ok((Some(value), len))
    }
}

/// Read an element header (id + size) at `pos`.
pub fn read_header(buf: &[u8], pos: usize) -> Result<ElementHeader, RepairError> {
    let (id, id_len) = read_id(buf, pos)?;
    let (size, size_len) = read_size(buf, pos + id_len)?;
    Ok(ElementHeader {
        id,
        size,
        header_len: id_len + size_len,
    })
}

/// Append an element ID in its wire form.
pub fn write_id(out: &mut Vec<u8>, id: u32) {
    let len = if id <= 0xFF {
        1
    } else if id <= 0xFFFF {
        2
    } else if id <= 0xFF_FFFF {
        3
    } else {
        4
    };
    out.extend_from_slice(&id.to_be_bytes()[4 - len..]);
}

/// Append a size as a minimal-length VINT.
pub fn write_size(out: &mut Vec<u8>, size: u64) {
    let mut len = 1usize;
    // The all-ones pattern is reserved, hence the strict comparison.
    while len < 8 && size >= (1u64 << (7 * len)) - 1 {
        len += 1;
    }
    let marked = size | (1u64 << (7 * len));
    out.extend_from_slice(&marked.to_be_bytes()[8 - len..]);
}

/// Append a complete element (id, size, payload).
pub fn write_element(out: &mut Vec<u8>, id: u32, payload: &[u8]) {
    write_id(out, id);
    write_size(out, payload.len() as u64);
    out.extend_from_slice(payload);
}

/// Interpret a payload as a big-endian unsigned integer.
pub fn read_uint(payload: &[u8]) -> u64 {
    payload.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

/// Interpret a payload as an EBML float (4 or 8 bytes; 0 bytes = 0.0).
pub fn read_float(payload: &[u8]) -> Option<f64> {
    match payload.len() {
        0 => Some(0.0),
        4 => Some(f32::from_be_bytes(payload.try_into().ok()?) as f64),
        8 => Some(f64::from_be_bytes(payload.try_into().ok()?)),
        _ => None,
    }
}

/// True for IDs that only occur at segment level; used to bound
/// unknown-size clusters produced by streaming muxers.
pub fn is_segment_level(id: u32) -> bool {
    matches!(
        id,
        SEEK_HEAD | INFO | TRACKS | CLUSTER | CUES | CHAPTERS | TAGS | ATTACHMENTS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_vint_round_trips() {
        for size in [0u64, 1, 126, 127, 128, 16_382, 16_383, 1 << 20, (1 << 35) + 17] {
            let mut buf = Vec::new();
            write_size(&mut buf, size);
            let (parsed, len) = read_size(&buf, 0).unwrap();
            assert_eq!(parsed, Some(size), "size {}", size);
            assert_eq!(len, buf.len());
        }
    }

    #[test]
    fn boundary_sizes_avoid_reserved_pattern() {
        // 127 needs two bytes: 0xFF would read back as unknown size.
        let mut buf = Vec::new();
        write_size(&mut buf, 127);
        assert_eq!(buf.len(), 2);
        assert_eq!(read_size(&buf, 0).unwrap().0, Some(127));
    }

    #[test]
    fn unknown_size_is_detected() {
        assert_eq!(read_size(&[0xFF], 0).unwrap(), (None, 1));
        assert_eq!(
            read_size(&[0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF], 0).unwrap(),
            (None, 8)
        );
    }

    #[test]
    fn ids_round_trip() {
        for id in [CLUSTER_TIMESTAMP, DURATION, TIMESTAMP_SCALE, SEGMENT] {
            let mut buf = Vec::new();
            write_id(&mut buf, id);
            let (parsed, len) = read_id(&buf, 0).unwrap();
            assert_eq!(parsed, id);
            assert_eq!(len, buf.len());
        }
    }

    #[test]
    fn truncated_header_is_an_error() {
        // 4-byte ID with only 2 bytes present.
        assert_eq!(read_id(&[0x1A, 0x45], 0), Err(RepairError::Truncated(0)));
        assert_eq!(read_size(&[], 0), Err(RepairError::Truncated(0)));
    }

    #[test]
    fn uint_payloads() {
        assert_eq!(read_uint(&[0x03, 0xE8]), 1000);
        assert_eq!(read_uint(&[]), 0);
    }
}
