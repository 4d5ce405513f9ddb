//! Write-Ahead Log (WAL) Module
//!
//! Durable, append-only record of updates applied to a document. Replaying
//! the log from its first entry reconstructs the document.
//!
//! ## Responsibilities
//! - Identify the file and its format version with a fixed header
//! - Frame each update with the wall-clock second it was appended
//! - Stream entries back lazily, tolerating a partial final frame
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ Header                                   │
//! │ ┌───────────────┬──────────────────────┐ │
//! │ │ "PNWAL" (5)   │ Version (2, BE)      │ │
//! │ └───────────────┴──────────────────────┘ │
//! ├──────────────────────────────────────────┤
//! │ Entry 1 (snapshot of the document)       │
//! │ ┌───────────────┬──────────────────────┐ │
//! │ │ Secs (4, BE)  │ Payload (codec)      │ │
//! │ └───────────────┴──────────────────────┘ │
//! ├──────────────────────────────────────────┤
//! │ Entry 2..N (one per update)              │
//! │ ┌───────────────┬──────────────────────┐ │
//! │ │ Secs (4, BE)  │ Payload (codec)      │ │
//! │ └───────────────┴──────────────────────┘ │
//! └──────────────────────────────────────────┘
//! ```
//!
//! There is no per-frame length or checksum: payloads are self-delimiting
//! and a frame cut short by end of file is treated as the end of the log.

mod clock;
mod format;
mod payload;
mod reader;
mod recovery;
mod sink;
mod timestamp;
mod writer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use format::{decode_header, encode_header, FormatVersion, FORMAT_VERSION, HEADER_SIZE, MAGIC};
pub use payload::{BincodeCodec, BytesCodec, PayloadCodec, Snapshot, MAX_PAYLOAD_SIZE};
pub use reader::{decode_all, WalEntry, WalReader};
pub use recovery::{RecoveryResult, WalRecovery};
pub use sink::{FileSink, MemorySink, Sink};
pub use timestamp::{Timestamp, TIMESTAMP_SIZE};
pub use writer::{open_writer, LogWriter, NoopWriter, WalWriter, WriterState};
