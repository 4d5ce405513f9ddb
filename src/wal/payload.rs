//! Payload codecs
//!
//! The log treats payloads as opaque values. A codec turns a value into a
//! self-delimiting byte sequence and reads exactly that many bytes back, so
//! entries need no outer length prefix.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Read};
use std::marker::PhantomData;

use bincode::Options;
use bytes::{BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::format::read_up_to;
use crate::error::{IoOp, Result, WalError};

/// Maximum encoded payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u64 = 16 * 1024 * 1024;

/// Encode/decode contract for logged values.
///
/// `decode` must return `WalError::Truncated` when the source ends before
/// the payload is complete, and `WalError::MalformedPayload` when the bytes
/// are present but do not form a valid value.
pub trait PayloadCodec {
    type Payload;

    fn encode(&self, payload: &Self::Payload, out: &mut BytesMut) -> Result<()>;

    fn decode(&self, source: &mut dyn Read) -> Result<Self::Payload>;
}

/// The structural part of a value, as persisted in the first log entry.
///
/// Values holding cached or derived data override this to strip it.
pub trait Snapshot: Clone {
    fn structural_snapshot(&self) -> Cow<'_, Self> {
        Cow::Borrowed(self)
    }
}

impl Snapshot for String {}
impl Snapshot for Vec<u8> {}

// =============================================================================
// Bincode Codec
// =============================================================================

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_PAYLOAD_SIZE)
}

/// Serde codec backed by bincode's length-prefixed encoding
pub struct BincodeCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> BincodeCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for BincodeCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BincodeCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BincodeCodec<T> {}

impl<T> fmt::Debug for BincodeCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BincodeCodec")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: Serialize + DeserializeOwned> PayloadCodec for BincodeCodec<T> {
    type Payload = T;

    fn encode(&self, payload: &T, out: &mut BytesMut) -> Result<()> {
        bincode_options()
            .serialize_into((&mut *out).writer(), payload)
            .map_err(|e| WalError::Serialization(e.to_string()))
    }

    fn decode(&self, source: &mut dyn Read) -> Result<T> {
        bincode_options()
            .deserialize_from(source)
            .map_err(|e| match *e {
                bincode::ErrorKind::Io(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                    WalError::Truncated("payload")
                }
                bincode::ErrorKind::Io(err) => WalError::io(IoOp::Read, err),
                other => WalError::MalformedPayload(other.to_string()),
            })
    }
}

// =============================================================================
// Raw Bytes Codec
// =============================================================================

/// Raw byte payloads framed as `len (4, big-endian) | bytes`
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl PayloadCodec for BytesCodec {
    type Payload = Vec<u8>;

    fn encode(&self, payload: &Vec<u8>, out: &mut BytesMut) -> Result<()> {
        let len = u32::try_from(payload.len())
            .ok()
            .filter(|len| u64::from(*len) <= MAX_PAYLOAD_SIZE)
            .ok_or_else(|| {
                WalError::Serialization(format!("payload of {} bytes is too large", payload.len()))
            })?;
        out.reserve(4 + payload.len());
        out.put_u32(len);
        out.put_slice(payload);
        Ok(())
    }

    fn decode(&self, source: &mut dyn Read) -> Result<Vec<u8>> {
        let mut len = [0u8; 4];
        read_exact_or_truncated(source, &mut len, "payload length")?;
        let len = u32::from_be_bytes(len);
        if u64::from(len) > MAX_PAYLOAD_SIZE {
            return Err(WalError::MalformedPayload(format!(
                "length {len} exceeds limit {MAX_PAYLOAD_SIZE}"
            )));
        }

        let mut data = vec![0u8; len as usize];
        read_exact_or_truncated(source, &mut data, "payload")?;
        Ok(data)
    }
}

fn read_exact_or_truncated(source: &mut dyn Read, buf: &mut [u8], what: &'static str) -> Result<()> {
    let got = read_up_to(source, buf).map_err(|e| WalError::io(IoOp::Read, e))?;
    if got < buf.len() {
        return Err(WalError::Truncated(what));
    }
    Ok(())
}
