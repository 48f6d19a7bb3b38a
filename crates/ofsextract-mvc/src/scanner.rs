//! Bounded-memory marker search over a byte stream.
//!
//! [`StreamScanner`] wraps any [`Read`] source (a file, a pipe, stdin) and
//! finds byte patterns without ever holding the whole stream in memory.
//! Two strategies share the same interface:
//!
//! - [`ScanStrategy::SlidingWindow`] keeps a fixed-size window. When a window
//!   holds no match, everything except the last `pattern.len() - 1` bytes is
//!   discarded and the window is refilled, so a match straddling a refill
//!   boundary is still found. Memory use is constant.
//! - [`ScanStrategy::BoundedGrowth`] never discards unmatched data; it grows
//!   the buffer by one `buffer_size` increment per miss and gives up with
//!   [`Error::BoundedMemoryExceeded`] once the buffer reaches
//!   `max_buffer_size`. Only meant for seekable inputs.
//!
//! After [`StreamScanner::find_next`] returns `Some(offset)`, the scanner is
//! positioned AT the match: the next [`peek`](StreamScanner::peek) starts
//! with the pattern bytes.

use std::io::{self, Read};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Default window size and growth increment (128 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Default cap for the growing buffer (512 MiB).
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 512 * 1024 * 1024;

/// How the scanner behaves when the current buffer holds no match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanStrategy {
    /// Discard searched bytes and refill a fixed-size window.
    #[default]
    SlidingWindow,
    /// Append to a growing buffer, up to a hard cap.
    BoundedGrowth,
}

/// Scanner settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Window size, and the growth increment in bounded-growth mode.
    pub buffer_size: usize,
    /// Buffer size at which bounded-growth mode gives up.
    pub max_buffer_size: usize,
    /// Strategy used on a miss.
    pub strategy: ScanStrategy,
    /// Wall-clock budget for a single `find_next` call.
    pub timeout: Option<Duration>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            strategy: ScanStrategy::SlidingWindow,
            timeout: None,
        }
    }
}

impl ScannerConfig {
    /// Set the window size.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Set the growth cap.
    pub fn max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    /// Set the miss strategy.
    pub fn strategy(mut self, strategy: ScanStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the per-search timeout.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check that the settings can be used.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::invalid_config("buffer_size must be greater than 0"));
        }
        if self.max_buffer_size < self.buffer_size {
            return Err(Error::invalid_config(format!(
                "max_buffer_size ({}) is smaller than buffer_size ({})",
                self.max_buffer_size, self.buffer_size
            )));
        }
        Ok(())
    }
}

/// Find the first occurrence of `needle` in `haystack`.
///
/// Scans for the needle's first byte, then compares the full needle at each
/// candidate. Works on raw bytes with explicit lengths.
pub fn find_pattern(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }

    let first = needle[0];
    let mut start = 0;

    while haystack.len() - start >= needle.len() {
        let last_start = haystack.len() - needle.len();
        let rel = haystack[start..=last_start]
            .iter()
            .position(|&b| b == first)?;
        let at = start + rel;
        if &haystack[at..at + needle.len()] == needle {
            return Some(at);
        }
        start = at + 1;
    }

    None
}

/// Buffered pattern scanner over a byte stream.
pub struct StreamScanner<R> {
    reader: R,
    buf: Vec<u8>,
    /// Read cursor within `buf`.
    pos: usize,
    /// End of valid data within `buf`.
    end: usize,
    /// Absolute stream offset of `buf[0]`.
    base: u64,
    eof: bool,
    config: ScannerConfig,
}

impl<R: Read> StreamScanner<R> {
    /// Create a scanner over `reader`.
    pub fn new(reader: R, config: ScannerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            reader,
            buf: vec![0; config.buffer_size],
            pos: 0,
            end: 0,
            base: 0,
            eof: false,
            config,
        })
    }

    /// Scanner settings.
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Absolute offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.base + self.pos as u64
    }

    /// Current buffer allocation in bytes.
    pub fn buffer_capacity(&self) -> usize {
        self.buf.len()
    }

    /// True once the source hit end-of-stream and every byte was consumed.
    pub fn is_exhausted(&self) -> bool {
        self.eof && self.pos == self.end
    }

    /// Give back the underlying reader. Buffered bytes are lost.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Advance to the next occurrence of `pattern` at or after the current
    /// position and return its absolute offset.
    ///
    /// Returns `Ok(None)` at end-of-stream, with every remaining byte
    /// consumed. The lowest matching offset always wins.
    pub fn find_next(&mut self, pattern: &[u8]) -> Result<Option<u64>> {
        if pattern.is_empty() {
            return Ok(Some(self.position()));
        }
        if pattern.len() > self.config.buffer_size {
            return Err(Error::invalid_config(format!(
                "pattern of {} bytes does not fit a {} byte window",
                pattern.len(),
                self.config.buffer_size
            )));
        }

        if self.config.strategy == ScanStrategy::BoundedGrowth {
            self.compact();
            self.shrink();
        }

        let started = Instant::now();
        let keep = pattern.len() - 1;
        let mut from = self.pos;

        loop {
            if let Some(i) = find_pattern(&self.buf[from..self.end], pattern) {
                self.pos = from + i;
                return Ok(Some(self.position()));
            }

            // A match straddling the refill boundary starts in the tail.
            from = self.end.saturating_sub(keep).max(from);

            if self.eof {
                self.pos = self.end;
                return Ok(None);
            }

            if let Some(timeout) = self.config.timeout {
                let elapsed = started.elapsed();
                if elapsed >= timeout {
                    self.pos = from;
                    return Err(Error::PatternTimeout { elapsed });
                }
            }

            match self.config.strategy {
                ScanStrategy::SlidingWindow => {
                    self.pos = from;
                    self.compact();
                    from = self.pos;
                }
                ScanStrategy::BoundedGrowth => {
                    if self.end == self.buf.len() {
                        let grown = self.buf.len() + self.config.buffer_size;
                        if grown >= self.config.max_buffer_size {
                            tracing::warn!(
                                buffered = grown,
                                limit = self.config.max_buffer_size,
                                "search buffer hit its memory limit"
                            );
                            return Err(Error::BoundedMemoryExceeded {
                                limit: self.config.max_buffer_size,
                                buffered: grown,
                            });
                        }
                        self.buf.resize(grown, 0);
                    }
                }
            }

            self.fill()?;
        }
    }

    /// Look at up to `n` bytes from the current position without consuming
    /// them. Fewer than `n` bytes are returned only at end-of-stream.
    ///
    /// The buffer never grows past `max_buffer_size` to satisfy a peek.
    pub fn peek(&mut self, n: usize) -> Result<&[u8]> {
        if self.end - self.pos < n && !self.eof {
            self.compact();
            if self.buf.len() < n {
                if n > self.config.max_buffer_size {
                    return Err(Error::BoundedMemoryExceeded {
                        limit: self.config.max_buffer_size,
                        buffered: n,
                    });
                }
                self.buf.resize(n, 0);
            }
            while self.end < n && !self.eof {
                self.fill()?;
            }
        }

        let len = (self.end - self.pos).min(n);
        Ok(&self.buf[self.pos..self.pos + len])
    }

    /// Skip `n` bytes, reading through the source as needed. Returns the
    /// number of bytes actually skipped, which is short only at
    /// end-of-stream.
    pub fn consume(&mut self, n: usize) -> Result<u64> {
        let mut remaining = n;
        let mut skipped = 0u64;

        while remaining > 0 {
            if self.pos == self.end {
                if self.eof {
                    break;
                }
                self.base += self.end as u64;
                self.pos = 0;
                self.end = 0;
                self.fill()?;
                continue;
            }

            let take = remaining.min(self.end - self.pos);
            self.pos += take;
            remaining -= take;
            skipped += take as u64;
        }

        Ok(skipped)
    }

    /// Move unread bytes to the front of the buffer.
    fn compact(&mut self) {
        if self.pos == 0 {
            return;
        }
        self.buf.copy_within(self.pos..self.end, 0);
        self.base += self.pos as u64;
        self.end -= self.pos;
        self.pos = 0;
    }

    /// Return a grown buffer to its base size once the data fits again.
    fn shrink(&mut self) {
        let size = self.config.buffer_size;
        if self.buf.len() > size && self.end <= size {
            self.buf.truncate(size);
            self.buf.shrink_to_fit();
        }
    }

    /// Read once into the free tail of the buffer.
    fn fill(&mut self) -> Result<usize> {
        debug_assert!(self.end < self.buf.len(), "fill called on a full buffer");

        loop {
            match self.reader.read(&mut self.buf[self.end..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(0);
                }
                Ok(n) => {
                    self.end += n;
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
