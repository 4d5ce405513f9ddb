//! Timestamp codec
//!
//! Entries carry their append time as whole seconds since the Unix epoch in
//! an unsigned 32-bit big-endian field. Sub-second precision is truncated.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{Result, WalError};

/// Encoded timestamp width (bytes)
pub const TIMESTAMP_SIZE: usize = 4;

/// Seconds since the Unix epoch, limited to the `u32` range (1970..=2106)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u32);

impl Timestamp {
    pub const MIN: Timestamp = Timestamp(0);
    pub const MAX: Timestamp = Timestamp(u32::MAX);

    pub const fn from_secs(secs: u32) -> Self {
        Timestamp(secs)
    }

    /// Build from a wider second count, failing past `u32::MAX`
    pub fn try_from_secs(secs: u64) -> Result<Self> {
        u32::try_from(secs)
            .map(Timestamp)
            .map_err(|_| WalError::EncodingRange(format!("{secs}s since epoch exceeds u32")))
    }

    /// Truncate a wall-clock time to whole seconds
    pub fn from_system_time(time: SystemTime) -> Result<Self> {
        let since_epoch = time
            .duration_since(UNIX_EPOCH)
            .map_err(|e| WalError::EncodingRange(format!("{:?} before epoch", e.duration())))?;
        Self::try_from_secs(since_epoch.as_secs())
    }

    pub fn as_secs(self) -> u32 {
        self.0
    }

    pub fn to_system_time(self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(u64::from(self.0))
    }

    pub fn encode(self) -> [u8; TIMESTAMP_SIZE] {
        self.0.to_be_bytes()
    }

    /// Decode a big-endian field; anything other than exactly four bytes is malformed
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let field: [u8; TIMESTAMP_SIZE] = bytes.try_into().map_err(|_| {
            WalError::MalformedTimestamp(format!(
                "expected {} bytes, got {}",
                TIMESTAMP_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Timestamp(u32::from_be_bytes(field)))
    }
}

impl From<Timestamp> for SystemTime {
    fn from(ts: Timestamp) -> Self {
        ts.to_system_time()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
