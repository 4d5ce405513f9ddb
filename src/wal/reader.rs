//! WAL Reader
//!
//! Streams `(timestamp, payload)` entries out of a log. The header is
//! validated when the reader is constructed; entries are decoded lazily as
//! the iterator is pulled.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use tracing::{debug, warn};

use super::format::{decode_header, read_up_to, FormatVersion};
use super::payload::PayloadCodec;
use super::timestamp::{Timestamp, TIMESTAMP_SIZE};
use crate::error::{IoOp, Result, WalError};

/// A single decoded log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalEntry<P> {
    /// Append time, truncated to whole seconds
    pub timestamp: Timestamp,

    pub payload: P,
}

impl<P> WalEntry<P> {
    pub fn new(timestamp: Timestamp, payload: P) -> Self {
        Self { timestamp, payload }
    }
}

/// Read adapter that tracks how many bytes were consumed
struct Tracked<R> {
    inner: R,
    position: u64,
}

impl<R: Read> Read for Tracked<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

/// Forward-only, non-restartable iterator over log entries.
///
/// - A partial frame at the end of the source ends iteration cleanly
///   (`was_truncated` reports it)
/// - A frame that is present but undecodable yields one error
/// - After an error or the end of the log, `next` keeps returning `None`
pub struct WalReader<R, C> {
    source: Tracked<R>,
    codec: C,
    version: FormatVersion,
    finished: bool,
    truncated: bool,
}

impl<C: PayloadCodec> WalReader<BufReader<File>, C> {
    /// Open a log file for reading
    pub fn open(path: &Path, codec: C) -> Result<Self> {
        let file = File::open(path).map_err(|e| WalError::io(IoOp::Open, e))?;
        Self::new(BufReader::new(file), codec)
    }
}

impl<R: Read, C: PayloadCodec> WalReader<R, C> {
    /// Validate the header of `source` and prepare to stream entries.
    ///
    /// Fails with `InvalidMagic` (including for an empty source) or
    /// `UnknownVersion` without yielding any entry.
    pub fn new(source: R, codec: C) -> Result<Self> {
        let mut source = Tracked {
            inner: source,
            position: 0,
        };
        let version = decode_header(&mut source)?;
        debug!(version = %version, "WAL header validated");

        Ok(Self {
            source,
            codec,
            version,
            finished: false,
            truncated: false,
        })
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Bytes consumed from the source so far, header included
    pub fn position(&self) -> u64 {
        self.source.position
    }

    /// True once iteration stopped on a partial trailing frame
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    /// Read the next entry from the WAL
    ///
    /// Returns `Ok(None)` at the end of the log, including when the last
    /// frame is incomplete.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry<C::Payload>>> {
        if self.finished {
            return Ok(None);
        }

        let frame_start = self.source.position;
        let result = match self.version {
            FormatVersion::V1 => self.next_v1(),
        };

        match result {
            Ok(Some(entry)) => Ok(Some(entry)),
            Ok(None) => {
                self.finished = true;
                debug!(offset = frame_start, "reached end of WAL");
                Ok(None)
            }
            Err(e) if e.is_truncation() => {
                self.finished = true;
                self.truncated = true;
                warn!(
                    offset = frame_start,
                    error = %e,
                    "dropping partial frame at end of WAL"
                );
                Ok(None)
            }
            Err(e) => {
                self.finished = true;
                Err(e)
            }
        }
    }

    /// `timestamp (4) | payload`
    fn next_v1(&mut self) -> Result<Option<WalEntry<C::Payload>>> {
        let mut field = [0u8; TIMESTAMP_SIZE];
        let got = read_up_to(&mut self.source, &mut field).map_err(|e| WalError::io(IoOp::Read, e))?;
        match got {
            0 => return Ok(None),
            n if n < TIMESTAMP_SIZE => return Err(WalError::Truncated("timestamp")),
            _ => {}
        }
        let timestamp = Timestamp::decode(&field)?;

        let payload = self.codec.decode(&mut self.source)?;
        Ok(Some(WalEntry { timestamp, payload }))
    }
}

impl<R: Read, C: PayloadCodec> Iterator for WalReader<R, C> {
    type Item = Result<WalEntry<C::Payload>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

impl<R: Read, C: PayloadCodec> std::iter::FusedIterator for WalReader<R, C> {}

/// Decode every entry of an in-memory log, stopping at the first error
pub fn decode_all<C: PayloadCodec>(bytes: &[u8], codec: C) -> Result<Vec<WalEntry<C::Payload>>> {
    WalReader::new(bytes, codec)?.collect()
}
