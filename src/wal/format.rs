//! WAL file header
//!
//! `magic (5) | version (2, big-endian)`. The header carries no length or
//! checksum; corruption surfaces as codec decode failures.

use std::fmt;
use std::io::{self, Read};

use crate::error::{IoOp, Result, WalError};

/// Bytes identifying a pnwal file ("PNWAL")
pub const MAGIC: [u8; 5] = *b"PNWAL";

/// Version written by this crate
pub const FORMAT_VERSION: u16 = 1;

/// magic (5) + version (2) = 7 bytes
pub const HEADER_SIZE: usize = MAGIC.len() + 2;

/// Supported on-disk layouts. Each variant has its own entry decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    /// `timestamp (4) | payload (self-delimiting)` repeated to end of file
    V1,
}

impl FormatVersion {
    pub const CURRENT: FormatVersion = FormatVersion::V1;

    pub fn as_u16(self) -> u16 {
        match self {
            FormatVersion::V1 => 1,
        }
    }
}

impl TryFrom<u16> for FormatVersion {
    type Error = WalError;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            1 => Ok(FormatVersion::V1),
            other => Err(WalError::UnknownVersion(other)),
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.as_u16())
    }
}

/// Encode the file header for the current version
pub fn encode_header() -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[..MAGIC.len()].copy_from_slice(&MAGIC);
    header[MAGIC.len()..].copy_from_slice(&FORMAT_VERSION.to_be_bytes());
    header
}

/// Read and validate the header, returning the version it selects.
///
/// Nothing past the magic is read when the magic does not match.
pub fn decode_header<R: Read + ?Sized>(source: &mut R) -> Result<FormatVersion> {
    let mut magic = [0u8; MAGIC.len()];
    let got = read_up_to(source, &mut magic).map_err(|e| WalError::io(IoOp::Read, e))?;
    if got < MAGIC.len() || magic != MAGIC {
        return Err(WalError::InvalidMagic {
            found: magic[..got].to_vec(),
        });
    }

    let mut version = [0u8; 2];
    let got = read_up_to(source, &mut version).map_err(|e| WalError::io(IoOp::Read, e))?;
    if got < version.len() {
        return Err(WalError::TruncatedHeader(MAGIC.len() + got));
    }

    FormatVersion::try_from(u16::from_be_bytes(version))
}

/// Fill `buf` from `source`, stopping early only at end of stream.
///
/// Returns the number of bytes read.
pub(crate) fn read_up_to<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
