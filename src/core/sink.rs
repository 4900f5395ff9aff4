//! Primary output destinations
//!
//! A [`Sink`] wraps any `io::Write` behind a lock so a whole encoded record is
//! written in one critical section and concurrent records never interleave.

use super::error::{LoggerError, Result};
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

pub type BoxedWriter = Box<dyn Write + Send>;

/// Shared, lock-protected primary sink
#[derive(Clone)]
pub struct Sink {
    writer: Arc<Mutex<BoxedWriter>>,
}

impl Sink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self::from_boxed(Box::new(writer))
    }

    pub fn from_boxed(writer: BoxedWriter) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    /// Process standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Write one encoded record and flush it
    pub fn write_record(&self, bytes: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock();
        writer
            .write_all(bytes)
            .and_then(|()| writer.flush())
            .map_err(|e| LoggerError::io_operation("writing record", "primary sink rejected write", e))
    }

    pub fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").finish_non_exhaustive()
    }
}

/// Writer that duplicates every write to all of its children
pub struct MultiWriter {
    writers: Vec<BoxedWriter>,
}

impl MultiWriter {
    pub fn new() -> Self {
        Self {
            writers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.writers.push(Box::new(writer));
        self
    }

    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }
}

impl Default for MultiWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MultiWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for writer in self.writers.iter_mut() {
            writer.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for writer in self.writers.iter_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

/// In-memory writer whose contents stay readable after it is handed to a sink
#[derive(Clone, Default)]
pub struct BufferWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl BufferWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        self.buf.lock().clear();
    }
}

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
