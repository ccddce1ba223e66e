// Tests for the WebM duration repair
//
// A container assembled from streamed chunks carries no Duration element;
// repair must derive the real extent from the cluster/block timestamps and
// rewrite Segment > Info, and must reject malformed input instead of
// letting it through to an upload.

mod common;

use common::synth_webm;
use veriview_capture::repair::{ebml, read_duration_ticks, repair};
use veriview_capture::RepairError;

#[test]
fn raw_capture_has_no_duration() {
    let raw = synth_webm(4000, &[0, 250, 500], 16);
    assert_eq!(read_duration_ticks(&raw).unwrap(), None);
}

#[test]
fn repair_writes_the_scanned_block_extent() {
    // Last block ends at 4000 + 500 ms; default scale is 1ms per tick.
    let raw = synth_webm(4000, &[0, 250, 500], 16);

    let fixed = repair(&raw).unwrap();
    assert_eq!(read_duration_ticks(&fixed).unwrap(), Some(4500.0));

    // The payload bytes survive untouched; only Info grew.
    assert!(fixed.len() > raw.len());
    assert!(fixed.ends_with(&raw[raw.len() - 32..]));
}

#[test]
fn repair_is_deterministic_and_idempotent_on_duration() {
    let raw = synth_webm(1000, &[100], 4);

    let once = repair(&raw).unwrap();
    assert_eq!(once, repair(&raw).unwrap());

    // Repairing an already-repaired container replaces the stale Duration
    // rather than stacking a second one.
    let twice = repair(&once).unwrap();
    assert_eq!(read_duration_ticks(&twice).unwrap(), Some(1100.0));
    assert_eq!(twice.len(), once.len());
}

#[test]
fn negative_block_offsets_do_not_extend_the_duration() {
    let raw = synth_webm(2000, &[-500, 0], 4);
    let fixed = repair(&raw).unwrap();
    assert_eq!(read_duration_ticks(&fixed).unwrap(), Some(2000.0));
}

#[test]
fn garbage_input_is_rejected() {
    assert_eq!(repair(b"not a webm at all"), Err(RepairError::BadMagic));
    assert!(matches!(
        repair(&[0x1A]),
        Err(RepairError::Truncated(_))
    ));
}

#[test]
fn truncated_capture_is_rejected() {
    let raw = synth_webm(1000, &[0, 40], 64);
    // Cut into the middle of the cluster.
    let cut = &raw[..raw.len() - 20];
    assert!(repair(cut).is_err());
}

#[test]
fn capture_without_clusters_is_rejected() {
    let mut raw = Vec::new();
    let mut header = Vec::new();
    ebml::write_element(&mut header, 0x4282, b"webm");
    ebml::write_element(&mut raw, ebml::EBML_HEADER, &header);
    ebml::write_id(&mut raw, ebml::SEGMENT);
    raw.push(0xFF);
    ebml::write_element(&mut raw, ebml::INFO, &[]);

    assert_eq!(repair(&raw), Err(RepairError::NoClusters));
}

#[test]
fn capture_without_info_is_rejected() {
    let mut raw = Vec::new();
    ebml::write_element(&mut raw, ebml::EBML_HEADER, &[]);
    ebml::write_id(&mut raw, ebml::SEGMENT);
    raw.push(0xFF);

    let mut cluster = Vec::new();
    ebml::write_element(&mut cluster, ebml::CLUSTER_TIMESTAMP, &[0x10]);
    ebml::write_element(&mut raw, ebml::CLUSTER, &cluster);

    assert_eq!(repair(&raw), Err(RepairError::NoInfo));
}

#[test]
fn unknown_size_cluster_is_bounded_by_the_next_segment_child() {
    // Streaming muxers can leave clusters unknown-size too: the cluster
    // runs until the next segment-level element.
    let mut raw = Vec::new();
    let mut header = Vec::new();
    ebml::write_element(&mut header, 0x4282, b"webm");
    ebml::write_element(&mut raw, ebml::EBML_HEADER, &header);
    ebml::write_id(&mut raw, ebml::SEGMENT);
    raw.push(0xFF);

    let mut info = Vec::new();
    ebml::write_element(
        &mut info,
        ebml::TIMESTAMP_SCALE,
        &ebml::DEFAULT_TIMESTAMP_SCALE.to_be_bytes()[5..],
    );
    ebml::write_element(&mut raw, ebml::INFO, &info);

    // First cluster: unknown size, ended by the second (sized) cluster.
    ebml::write_id(&mut raw, ebml::CLUSTER);
    raw.push(0xFF);
    ebml::write_element(&mut raw, ebml::CLUSTER_TIMESTAMP, &1000u64.to_be_bytes()[6..]);

    let mut second = Vec::new();
    ebml::write_element(&mut second, ebml::CLUSTER_TIMESTAMP, &3000u64.to_be_bytes()[6..]);
    let mut block = vec![0x81, 0x00, 0x64, 0x00]; // track 1, +100ms, flags
    block.extend_from_slice(&[0xAB; 8]);
    ebml::write_element(&mut second, ebml::SIMPLE_BLOCK, &block);
    ebml::write_element(&mut raw, ebml::CLUSTER, &second);

    let fixed = repair(&raw).unwrap();
    assert_eq!(read_duration_ticks(&fixed).unwrap(), Some(3100.0));
}
