//! Tests for the WAL file header
//!
//! These tests verify:
//! - Header layout and constants
//! - Magic validation
//! - Version dispatch and rejection

use pnwal::wal::{decode_header, encode_header, FormatVersion, FORMAT_VERSION, HEADER_SIZE, MAGIC};
use pnwal::WalError;

// =============================================================================
// Constant Tests
// =============================================================================

#[test]
fn test_magic_is_pnwal() {
    assert_eq!(MAGIC, [0x50, 0x4E, 0x57, 0x41, 0x4C]);
    assert_eq!(HEADER_SIZE, 7);
    assert_eq!(FORMAT_VERSION, 1);
    assert_eq!(FormatVersion::CURRENT.as_u16(), FORMAT_VERSION);
}

#[test]
fn test_header_round_trip() {
    let header = encode_header();
    let mut source: &[u8] = &header;
    assert_eq!(decode_header(&mut source).unwrap(), FormatVersion::V1);
    assert!(source.is_empty());
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[test]
fn test_empty_source_is_invalid_magic() {
    let mut source: &[u8] = &[];
    let err = decode_header(&mut source).unwrap_err();
    assert!(matches!(err, WalError::InvalidMagic { ref found } if found.is_empty()));
    assert!(err.is_header_error());
}

#[test]
fn test_short_magic_is_invalid_magic() {
    let mut source: &[u8] = b"PNW";
    assert!(matches!(
        decode_header(&mut source),
        Err(WalError::InvalidMagic { .. })
    ));
}

#[test]
fn test_wrong_magic() {
    let mut source: &[u8] = b"SQLite format 3\0";
    assert!(matches!(
        decode_header(&mut source),
        Err(WalError::InvalidMagic { .. })
    ));
}

#[test]
fn test_missing_version_is_header_error() {
    let mut source: &[u8] = b"PNWAL\x00";
    let err = decode_header(&mut source).unwrap_err();
    assert!(matches!(err, WalError::TruncatedHeader(6)));
    assert!(err.is_header_error());
    assert!(!err.is_truncation());
}

#[test]
fn test_unknown_versions() {
    for version in [0u16, 2, 0x0100, u16::MAX] {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&version.to_be_bytes());
        let mut source: &[u8] = &bytes;

        match decode_header(&mut source) {
            Err(WalError::UnknownVersion(v)) => assert_eq!(v, version),
            other => panic!("expected UnknownVersion({version}), got {other:?}"),
        }
    }
}

#[test]
fn test_version_is_big_endian() {
    // 0x0100 little-endian would read as 1
    let mut source: &[u8] = b"PNWAL\x01\x00";
    assert!(matches!(
        decode_header(&mut source),
        Err(WalError::UnknownVersion(256))
    ));
}
