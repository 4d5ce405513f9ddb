//! Tests for WAL Reader
//!
//! These tests verify:
//! - Reading entries from in-memory and on-disk logs
//! - Header rejection before any entry is yielded
//! - Partial trailing frame handling
//! - Malformed entries ending the sequence

#[path = "../common/mod.rs"]
mod common;

use std::fs;

use common::{build_log, setup_temp_wal};
use pnwal::wal::{decode_all, BincodeCodec, BytesCodec, FormatVersion, Timestamp, WalEntry, WalReader, MAGIC};
use pnwal::WalError;

fn strings() -> BincodeCodec<String> {
    BincodeCodec::new()
}

fn entry(secs: u32, payload: &str) -> WalEntry<String> {
    WalEntry::new(Timestamp::from_secs(secs), payload.to_string())
}

// =============================================================================
// Basic Reading Tests
// =============================================================================

#[test]
fn test_read_single_entry() {
    let bytes = build_log(&[(42, "doc")]);

    let mut reader = WalReader::new(&bytes[..], strings()).unwrap();
    assert_eq!(reader.version(), FormatVersion::V1);
    assert_eq!(reader.next_entry().unwrap(), Some(entry(42, "doc")));
    assert_eq!(reader.next_entry().unwrap(), None);
    assert!(!reader.was_truncated());
    assert_eq!(reader.position(), bytes.len() as u64);
}

#[test]
fn test_read_entries_in_append_order() {
    // clock went backwards between appends; order follows the file
    let bytes = build_log(&[(100, "a"), (90, "b"), (95, "c")]);

    let entries = decode_all(&bytes, strings()).unwrap();
    assert_eq!(entries, vec![entry(100, "a"), entry(90, "b"), entry(95, "c")]);
}

#[test]
fn test_read_from_file() {
    let (_temp, wal_path) = setup_temp_wal();
    fs::write(&wal_path, build_log(&[(1, "x"), (2, "y")])).unwrap();

    let entries: Vec<_> = WalReader::open(&wal_path, strings())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(entries, vec![entry(1, "x"), entry(2, "y")]);
}

#[test]
fn test_open_missing_file() {
    let (_temp, wal_path) = setup_temp_wal();
    assert!(matches!(
        WalReader::open(&wal_path, strings()),
        Err(WalError::Io { .. })
    ));
}

#[test]
fn test_reader_is_lazy() {
    let mut bytes = build_log(&[(1, "ok")]);
    // garbage after the first entry is only seen when pulled
    bytes.extend_from_slice(&[0, 0, 0, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFF, 0xFF]);

    let mut reader = WalReader::new(&bytes[..], strings()).unwrap();
    assert_eq!(reader.next().unwrap().unwrap(), entry(1, "ok"));
    assert!(matches!(reader.next(), Some(Err(WalError::MalformedPayload(_)))));
    assert!(reader.next().is_none());
}

// =============================================================================
// Header Rejection Tests
// =============================================================================

#[test]
fn test_empty_source_fails() {
    let result = WalReader::new(&[][..], strings());
    assert!(matches!(result, Err(WalError::InvalidMagic { .. })));
}

#[test]
fn test_invalid_magic_fails() {
    let mut bytes = build_log(&[(1, "doc")]);
    bytes[0] = b'X';
    assert!(matches!(
        WalReader::new(&bytes[..], strings()),
        Err(WalError::InvalidMagic { .. })
    ));
}

#[test]
fn test_version_two_rejected() {
    let mut bytes = MAGIC.to_vec();
    bytes.extend_from_slice(&2u16.to_be_bytes());
    // a well-formed v1 frame after the header must not be read
    bytes.extend_from_slice(&build_log(&[(1, "doc")])[7..]);

    match WalReader::new(&bytes[..], strings()) {
        Err(WalError::UnknownVersion(2)) => {}
        Err(other) => panic!("expected UnknownVersion(2), got {other:?}"),
        Ok(_) => panic!("expected UnknownVersion(2), got a reader"),
    }
}

// =============================================================================
// Truncation Tests
// =============================================================================

#[test]
fn test_every_truncation_of_last_entry_is_clean() {
    let full = build_log(&[(10, "doc-v0"), (11, "edit-1"), (12, "edit-2")]);
    let two_entries = build_log(&[(10, "doc-v0"), (11, "edit-1")]);
    let last_frame_len = full.len() - two_entries.len();

    for k in 1..last_frame_len {
        let cut = &full[..full.len() - k];
        let mut reader = WalReader::new(cut, strings()).unwrap();
        let entries: Vec<_> = reader.by_ref().collect::<Result<_, _>>().unwrap();

        assert_eq!(entries, vec![entry(10, "doc-v0"), entry(11, "edit-1")], "cut {k} bytes");
        assert!(reader.was_truncated(), "cut {k} bytes");
    }
}

#[test]
fn test_cut_at_entry_boundary_is_not_truncated() {
    let full = build_log(&[(10, "a"), (11, "b")]);
    let first = build_log(&[(10, "a")]);

    let mut reader = WalReader::new(&full[..first.len()], strings()).unwrap();
    assert_eq!(reader.next_entry().unwrap(), Some(entry(10, "a")));
    assert_eq!(reader.next_entry().unwrap(), None);
    assert!(!reader.was_truncated());
}

#[test]
fn test_header_only_log() {
    let full = build_log(&[(10, "a")]);
    let mut reader = WalReader::new(&full[..7], strings()).unwrap();
    assert!(reader.next().is_none());
}

// =============================================================================
// Raw Bytes Codec Tests
// =============================================================================

#[test]
fn test_bytes_codec_log() {
    let mut bytes = MAGIC.to_vec();
    bytes.extend_from_slice(&[0, 1]);
    for (secs, payload) in [(5u32, &b"\x00\x01"[..]), (6, &b""[..])] {
        bytes.extend_from_slice(&secs.to_be_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        bytes.extend_from_slice(payload);
    }

    let entries = decode_all(&bytes, BytesCodec).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].payload, vec![0, 1]);
    assert_eq!(entries[1].timestamp.as_secs(), 6);
    assert!(entries[1].payload.is_empty());
}
