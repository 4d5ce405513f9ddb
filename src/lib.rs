//! # pnwal
//!
//! A write-ahead log for document edits:
//! - Fixed magic + version header selecting the entry layout
//! - One timestamped frame per update, appended in call order
//! - Lazy streaming decoder tolerant of a partial final frame
//! - Pluggable payload codec, sink and clock
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Document owner (caller)                     │
//! └──────────────┬──────────────────────────────┬───────────────┘
//!                │ snapshot + updates           │ replay
//!                ▼                              ▼
//!   ┌─────────────────────────┐      ┌─────────────────────────┐
//!   │  LogWriter              │      │  WalReader / Recovery   │
//!   │  (WalWriter | Noop)     │      │  (lazy iterator)        │
//!   └──────┬─────────┬────────┘      └──────┬──────────────────┘
//!          │         │                      │
//!          ▼         ▼                      ▼
//!   ┌──────────┐ ┌──────────┐        ┌──────────────┐
//!   │  Clock   │ │  Codec   │◀───────│ Codec        │
//!   └──────────┘ └────┬─────┘        └──────────────┘
//!                     ▼
//!              ┌─────────────┐
//!              │    Sink     │
//!              │ (file/mem)  │
//!              └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{IoOp, Result, WalError};
pub use config::{Config, SyncStrategy};
pub use wal::{open_writer, LogWriter, WalEntry, WalReader, WalRecovery, WalWriter};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of pnwal
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
