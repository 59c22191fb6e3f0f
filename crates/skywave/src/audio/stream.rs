//! Buffered network stream reader
//!
//! Radio streams arrive over plain HTTP and are not seekable, but the audio
//! decoder wants `Read + Seek` so it can probe the container and skip back
//! over tag data. `StreamReader` buffers everything consumed from the inner
//! reader and serves seeks within the retained window; data far behind the
//! read cursor is compacted away to bound memory on long-running streams.

use std::io::{self, Read, Seek, SeekFrom};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::buffer::{COMPACTION_SAFETY_MARGIN, COMPACTION_THRESHOLD, FILL_CHUNK_SIZE};
use crate::config::network::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, USER_AGENT};
use crate::error::Result;

/// Open an HTTP audio stream and wrap it for decoding.
///
/// `bytes_received` is incremented as data is pulled from the network, so
/// the engine can detect stalls.
pub fn open_stream(url: &str, bytes_received: Arc<AtomicU64>) -> Result<StreamReader> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .build()?;

    let response = client.get(url).send()?.error_for_status()?;
    Ok(StreamReader::new(Box::new(response), bytes_received))
}

/// Read+Seek adapter over a non-seekable reader.
pub struct StreamReader {
    inner: Box<dyn Read + Send>,
    /// Buffered bytes, starting at absolute stream offset `base_offset`
    buf: Vec<u8>,
    base_offset: u64,
    /// Absolute read position
    pos: u64,
    eof: bool,
    bytes_received: Arc<AtomicU64>,
    compaction_threshold: usize,
    compaction_margin: usize,
}

impl StreamReader {
    pub fn new(inner: Box<dyn Read + Send>, bytes_received: Arc<AtomicU64>) -> Self {
        Self::with_limits(inner, bytes_received, COMPACTION_THRESHOLD, COMPACTION_SAFETY_MARGIN)
    }

    /// Create with custom compaction limits (for testing)
    pub fn with_limits(
        inner: Box<dyn Read + Send>,
        bytes_received: Arc<AtomicU64>,
        compaction_threshold: usize,
        compaction_margin: usize,
    ) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            base_offset: 0,
            pos: 0,
            eof: false,
            bytes_received,
            compaction_threshold,
            compaction_margin,
        }
    }

    /// Absolute offset one past the last buffered byte
    fn buffered_end(&self) -> u64 {
        self.base_offset + self.buf.len() as u64
    }

    /// Pull one chunk from the inner reader into the buffer.
    /// Returns the number of bytes appended (0 at EOF).
    fn fill(&mut self) -> io::Result<usize> {
        let mut chunk = [0u8; FILL_CHUNK_SIZE];
        let n = self.inner.read(&mut chunk)?;
        if n == 0 {
            self.eof = true;
        } else {
            self.buf.extend_from_slice(&chunk[..n]);
            self.bytes_received.fetch_add(n as u64, Ordering::Relaxed);
        }
        Ok(n)
    }

    /// Drop consumed data well behind the read cursor, keeping a safety
    /// margin so the decoder can still seek back a little.
    fn maybe_compact(&mut self) {
        let local_pos = (self.pos - self.base_offset) as usize;
        if local_pos > self.compaction_threshold {
            let keep_from = local_pos.saturating_sub(self.compaction_margin);
            if keep_from > 0 {
                self.buf.drain(..keep_from);
                self.base_offset += keep_from as u64;
            }
        }
    }
}

impl Read for StreamReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        loop {
            let local_pos = (self.pos - self.base_offset) as usize;
            let available = self.buf.len() - local_pos;

            if available > 0 {
                let n = available.min(out.len());
                out[..n].copy_from_slice(&self.buf[local_pos..local_pos + n]);
                self.pos += n as u64;
                self.maybe_compact();
                return Ok(n);
            }

            if self.eof {
                return Ok(0);
            }

            self.fill()?;
        }
    }
}

impl Seek for StreamReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => offset as i64,
            // "End" of a live stream means the end of what has been
            // buffered so far; we do not pull more data to satisfy it.
            SeekFrom::End(offset) => self.buffered_end() as i64 + offset,
            SeekFrom::Current(offset) => self.pos as i64 + offset,
        };

        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Seek to negative position",
            ));
        }
        let target = target as u64;

        if target < self.base_offset {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "Cannot seek to position {} — data before {} has been compacted",
                    target, self.base_offset
                ),
            ));
        }

        // Forward seeks beyond the buffered window pull data until the
        // target is reachable (or the stream ends, in which case we clamp).
        if !matches!(pos, SeekFrom::End(_)) {
            while target > self.buffered_end() && !self.eof {
                self.fill()?;
            }
        }

        self.pos = target.min(self.buffered_end());
        Ok(self.pos)
    }
}

// StreamReader is only ever driven from the decoder's single thread; the
// Sync bound comes from the decoder's type signature, not shared access.
unsafe impl Sync for StreamReader {}
