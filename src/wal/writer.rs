//! WAL Writer
//!
//! Handles writing the header and appending entries to a sink.
//!
//! ## Lifecycle
//! ```text
//! Unopened ──write_header──▶ HeaderWritten ──append_message──┐
//!     │                           │   ▲                      │
//!     │                           │   └──────────────────────┘
//!     │                           │
//!     │                    append I/O error ──▶ Failed
//!     │                           │                │
//!     └──────────close────────────┴──────close─────┴──▶ Closed
//! ```
//!
//! `Failed` is also reached when the header append itself fails. In that
//! state `sync` still flushes the intact prefix, but no frame is written.
//!
//! Calls on one writer must be serialized by the caller; there is no
//! internal locking.

use std::marker::PhantomData;

use bytes::{BufMut, BytesMut};
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::format::encode_header;
use super::payload::{PayloadCodec, Snapshot};
use super::sink::{FileSink, Sink};
use super::timestamp::Timestamp;
use crate::config::{Config, SyncStrategy};
use crate::error::{IoOp, Result, WalError};

/// Where a writer is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Unopened,
    HeaderWritten,
    /// An append reached the sink only partly or not at all. Further frames
    /// would land after a torn one, so the writer accepts no more.
    Failed,
    Closed,
}

impl WriterState {
    fn ensure_can_write_header(self) -> Result<()> {
        match self {
            WriterState::Unopened => Ok(()),
            WriterState::HeaderWritten => Err(WalError::HeaderAlreadyWritten),
            WriterState::Failed => Err(WalError::WriterFailed),
            WriterState::Closed => Err(WalError::Closed),
        }
    }

    fn ensure_can_append(self) -> Result<()> {
        match self {
            WriterState::Unopened => Err(WalError::NotInitialized),
            WriterState::HeaderWritten => Ok(()),
            WriterState::Failed => Err(WalError::WriterFailed),
            WriterState::Closed => Err(WalError::Closed),
        }
    }
}

/// Capability shared by the durable writer and the no-op writer
pub trait LogWriter<P> {
    /// Write magic, version and the structural snapshot of `initial` as the
    /// first entry. Only valid once, before anything else.
    fn write_header(&mut self, initial: &P) -> Result<()>;

    /// Append one `(now, message)` frame
    fn append_message(&mut self, message: &P) -> Result<()>;

    /// Force buffered frames to durable storage
    fn sync(&mut self) -> Result<()>;

    /// Release the sink. Idempotent.
    fn close(&mut self) -> Result<()>;

    fn state(&self) -> WriterState;
}

// =============================================================================
// Durable Writer
// =============================================================================

/// Writes framed entries to a sink
pub struct WalWriter<S, C, K = SystemClock> {
    sink: S,
    codec: C,
    clock: K,
    sync_strategy: SyncStrategy,
    state: WriterState,
    entries_written: u64,
    uncommitted: usize,
    frame: BytesMut,
}

impl<C: PayloadCodec> WalWriter<FileSink, C, SystemClock> {
    /// Create the log file named by `config`. An existing file is never reused.
    pub fn create(config: &Config, codec: C) -> Result<Self> {
        config.validate()?;
        let sink = FileSink::create(&config.wal_path, config.write_buffer_size)
            .map_err(|e| WalError::io(IoOp::Open, e))?;
        info!(path = ?config.wal_path, "created WAL file");
        Ok(Self::new(sink, codec, SystemClock, config.sync_strategy))
    }
}

impl<S: Sink, C: PayloadCodec, K: Clock> WalWriter<S, C, K> {
    pub fn new(sink: S, codec: C, clock: K, sync_strategy: SyncStrategy) -> Self {
        Self {
            sink,
            codec,
            clock,
            sync_strategy,
            state: WriterState::Unopened,
            entries_written: 0,
            uncommitted: 0,
            frame: BytesMut::new(),
        }
    }

    /// Entries appended so far, the header snapshot included
    pub fn entries_written(&self) -> u64 {
        self.entries_written
    }

    /// Frames appended since the last sync
    pub fn uncommitted_count(&self) -> usize {
        self.uncommitted
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Encode `timestamp | payload` after whatever is already in `frame`
    fn encode_entry(&mut self, timestamp: Timestamp, payload: &C::Payload) -> Result<()> {
        self.frame.put_slice(&timestamp.encode());
        self.codec.encode(payload, &mut self.frame)
    }

    /// Hand the assembled frame to the sink in a single append.
    ///
    /// A failed append may have left part of the frame behind, so the writer
    /// moves to `Failed` and refuses every later frame.
    fn append_frame(&mut self, timestamp: Timestamp) -> Result<()> {
        let result = self.sink.append(&self.frame);
        let len = self.frame.len();
        self.frame.clear();
        if let Err(e) = result {
            self.state = WriterState::Failed;
            warn!(timestamp = %timestamp, error = %e, "WAL append failed, writer disabled");
            return Err(WalError::io(IoOp::Append, e));
        }

        self.entries_written += 1;
        self.uncommitted += 1;
        debug!(timestamp = %timestamp, bytes = len, "appended WAL frame");
        Ok(())
    }

    fn sync_per_strategy(&mut self) -> Result<()> {
        match self.sync_strategy {
            SyncStrategy::EveryWrite => self.sync_sink(),
            SyncStrategy::EveryNEntries { count } if self.uncommitted >= count => self.sync_sink(),
            _ => Ok(()),
        }
    }

    fn sync_sink(&mut self) -> Result<()> {
        self.sink.flush().map_err(|e| WalError::io(IoOp::Flush, e))?;
        debug!(frames = self.uncommitted, "synced WAL");
        self.uncommitted = 0;
        Ok(())
    }

    fn now(&self) -> Result<Timestamp> {
        Timestamp::from_system_time(self.clock.now())
    }
}

impl<S, C, K> LogWriter<C::Payload> for WalWriter<S, C, K>
where
    S: Sink,
    C: PayloadCodec,
    C::Payload: Snapshot,
    K: Clock,
{
    fn write_header(&mut self, initial: &C::Payload) -> Result<()> {
        self.state.ensure_can_write_header()?;
        let timestamp = self.now()?;

        self.frame.clear();
        self.frame.put_slice(&encode_header());
        let snapshot = initial.structural_snapshot();
        if let Err(e) = self.encode_entry(timestamp, &snapshot) {
            self.frame.clear();
            return Err(e);
        }

        self.append_frame(timestamp)?;
        self.state = WriterState::HeaderWritten;
        info!(timestamp = %timestamp, "WAL header written");
        self.sync_per_strategy()
    }

    fn append_message(&mut self, message: &C::Payload) -> Result<()> {
        self.state.ensure_can_append()?;
        let timestamp = self.now()?;

        self.frame.clear();
        if let Err(e) = self.encode_entry(timestamp, message) {
            self.frame.clear();
            return Err(e);
        }
        self.append_frame(timestamp)?;
        self.sync_per_strategy()
    }

    fn sync(&mut self) -> Result<()> {
        match self.state {
            WriterState::Closed => Ok(()),
            _ => self.sync_sink(),
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.state == WriterState::Closed {
            return Ok(());
        }
        // The sink is released even when the final flush fails.
        self.state = WriterState::Closed;
        self.sink.close().map_err(|e| WalError::io(IoOp::Close, e))?;
        self.uncommitted = 0;
        info!(entries = self.entries_written, "closed WAL");
        Ok(())
    }

    fn state(&self) -> WriterState {
        self.state
    }
}

// =============================================================================
// No-op Writer
// =============================================================================

/// Writer used when logging is disabled. Follows the same state machine as
/// `WalWriter` but persists nothing.
#[derive(Debug)]
pub struct NoopWriter<P> {
    state: WriterState,
    _payload: PhantomData<fn(&P)>,
}

impl<P> NoopWriter<P> {
    pub fn new() -> Self {
        Self {
            state: WriterState::Unopened,
            _payload: PhantomData,
        }
    }
}

impl<P> Default for NoopWriter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> LogWriter<P> for NoopWriter<P> {
    fn write_header(&mut self, _initial: &P) -> Result<()> {
        self.state.ensure_can_write_header()?;
        self.state = WriterState::HeaderWritten;
        Ok(())
    }

    fn append_message(&mut self, _message: &P) -> Result<()> {
        self.state.ensure_can_append()
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.state = WriterState::Closed;
        Ok(())
    }

    fn state(&self) -> WriterState {
        self.state
    }
}

/// Pick the writer implementation for `config`: a file-backed log when
/// logging is enabled, otherwise a `NoopWriter`.
pub fn open_writer<C>(config: &Config, codec: C) -> Result<Box<dyn LogWriter<C::Payload>>>
where
    C: PayloadCodec + 'static,
    C::Payload: Snapshot + 'static,
{
    config.validate()?;
    if !config.logging_enabled {
        debug!("WAL logging disabled, using no-op writer");
        return Ok(Box::new(NoopWriter::<C::Payload>::new()));
    }
    Ok(Box::new(WalWriter::create(config, codec)?))
}
