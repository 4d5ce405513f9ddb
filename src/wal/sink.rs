//! Append-only byte sinks the writer persists frames to.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

/// Destination for log bytes.
///
/// A sink is owned by exactly one writer for its whole open lifetime.
pub trait Sink: Send {
    /// Append bytes at the end of the sink
    fn append(&mut self, data: &[u8]) -> io::Result<()>;

    /// Force appended bytes to durable storage
    fn flush(&mut self) -> io::Result<()>;

    /// Flush and release the underlying handle
    fn close(&mut self) -> io::Result<()>;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn append(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).append(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "sink is closed")
}

// =============================================================================
// File Sink
// =============================================================================

/// Buffered file sink; `flush` reaches the disk via `sync_data`
#[derive(Debug)]
pub struct FileSink {
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    /// Create a new log file. Fails if the path already exists.
    pub fn create(path: &Path, buffer_size: usize) -> io::Result<Self> {
        let file = OpenOptions::new().write(true).create_new(true).open(path)?;
        Ok(Self::from_file(file, buffer_size))
    }

    pub fn from_file(file: File, buffer_size: usize) -> Self {
        Self {
            writer: Some(BufWriter::with_capacity(buffer_size, file)),
        }
    }
}

impl Sink for FileSink {
    fn append(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.as_mut().ok_or_else(closed_error)?.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        let writer = self.writer.as_mut().ok_or_else(closed_error)?;
        writer.flush()?;
        writer.get_ref().sync_data()
    }

    fn close(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut writer) => {
                writer.flush()?;
                writer.get_ref().sync_all()
            }
            None => Ok(()),
        }
    }
}

// =============================================================================
// Memory Sink
// =============================================================================

/// In-memory sink for tests and ephemeral logs.
///
/// Clones share the same buffer, so a test can keep one handle and read
/// back what the writer appended through another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    data: Arc<Mutex<Vec<u8>>>,
    flushes: Arc<Mutex<usize>>,
    closed: Arc<Mutex<bool>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all bytes appended so far
    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful `flush` calls
    pub fn flush_count(&self) -> usize {
        *self.flushes.lock()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock()
    }
}

impl Sink for MemorySink {
    fn append(&mut self, data: &[u8]) -> io::Result<()> {
        if self.is_closed() {
            return Err(closed_error());
        }
        self.data.lock().extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.is_closed() {
            return Err(closed_error());
        }
        *self.flushes.lock() += 1;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        *self.closed.lock() = true;
        Ok(())
    }
}
