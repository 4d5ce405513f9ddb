//! WAL Recovery
//!
//! Replays a log file from disk for state reconstruction.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

use super::format::{encode_header, FormatVersion, HEADER_SIZE};
use super::payload::PayloadCodec;
use super::reader::{WalEntry, WalReader};
use crate::error::{IoOp, Result, WalError};

/// Handles replay of a WAL file
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Default)]
pub struct RecoveryResult {
    /// Whether a log with a complete header existed
    pub log_present: bool,

    /// Format version from the header
    pub version: Option<FormatVersion>,

    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Bytes covered by the header and the recovered entries
    pub bytes_consumed: u64,

    /// Size of the file on disk
    pub file_size: u64,

    /// Whether an incomplete trailing frame was dropped
    pub was_truncated: bool,

    /// Entry-level decode error that stopped replay early, if any
    pub entry_error: Option<WalError>,
}

impl RecoveryResult {
    /// True when every byte of the file was accounted for
    pub fn is_clean(&self) -> bool {
        !self.was_truncated && self.entry_error.is_none()
    }
}

impl WalRecovery {
    /// Recover entries from a WAL file
    ///
    /// This will:
    /// 1. Treat a missing or empty file, or a torn prefix of the header,
    ///    as "no log yet"
    /// 2. Validate the header (errors here are returned)
    /// 3. Collect entries until the end of the log, a partial trailing
    ///    frame, or the first undecodable entry
    /// 4. Return the entries in append order
    ///
    /// The file is never modified.
    pub fn recover<C: PayloadCodec>(
        path: &Path,
        codec: C,
    ) -> Result<(Vec<WalEntry<C::Payload>>, RecoveryResult)> {
        let mut entries = Vec::new();
        let result = Self::replay(path, codec, |entry| entries.push(entry))?;
        Ok((entries, result))
    }

    /// Verify integrity of a WAL file without keeping its entries
    pub fn verify<C: PayloadCodec>(path: &Path, codec: C) -> Result<RecoveryResult> {
        Self::replay(path, codec, |_| {})
    }

    fn replay<C, F>(path: &Path, codec: C, mut on_entry: F) -> Result<RecoveryResult>
    where
        C: PayloadCodec,
        F: FnMut(WalEntry<C::Payload>),
    {
        let file_size = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RecoveryResult::default()),
            Err(e) => return Err(WalError::io(IoOp::Open, e)),
        };
        if file_size == 0 {
            return Ok(RecoveryResult::default());
        }
        if file_size < HEADER_SIZE as u64 {
            let bytes = fs::read(path).map_err(|e| WalError::io(IoOp::Read, e))?;
            if encode_header().starts_with(&bytes) {
                warn!(path = ?path, bytes = bytes.len(), "WAL header was never completed");
                return Ok(RecoveryResult {
                    file_size,
                    was_truncated: true,
                    ..RecoveryResult::default()
                });
            }
        }

        let mut reader = WalReader::open(path, codec)?;
        let mut result = RecoveryResult {
            log_present: true,
            version: Some(reader.version()),
            file_size,
            ..RecoveryResult::default()
        };

        result.bytes_consumed = reader.position();
        while let Some(item) = reader.next() {
            match item {
                Ok(entry) => {
                    result.entries_recovered += 1;
                    result.bytes_consumed = reader.position();
                    on_entry(entry);
                }
                Err(e @ WalError::Io { .. }) => return Err(e),
                Err(e) => {
                    warn!(
                        path = ?path,
                        entries = result.entries_recovered,
                        error = %e,
                        "stopping WAL replay at undecodable entry"
                    );
                    result.entry_error = Some(e);
                }
            }
        }
        result.was_truncated = reader.was_truncated();

        info!(
            path = ?path,
            entries = result.entries_recovered,
            truncated = result.was_truncated,
            "WAL replay finished"
        );
        Ok(result)
    }
}
