//! OFMD record discovery.
//!
//! The decoder walks the stream SEI marker by SEI marker. After each marker
//! it looks for `"OFMD"` inside a short lookahead window; a hit is captured
//! as a fixed-size record and validated. Records come out in stream order.

use std::io::Read;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::ofmd::{
    OfmdRecord, DEFAULT_LOOKAHEAD, DEFAULT_STORE_SIZE, DEPTH_OFFSET, OFMD_MARKER, SEI_MARKER,
};
use crate::scanner::{find_pattern, ScannerConfig, StreamScanner};
use crate::source::InputSource;

/// Decoder settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Bytes captured per record, starting at `"OFMD"`.
    pub store_size: usize,
    /// Window after an SEI marker that must contain `"OFMD"`.
    pub lookahead: usize,
    /// Give up if no valid record turns up within this long.
    pub ofmd_timeout: Option<Duration>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            store_size: DEFAULT_STORE_SIZE,
            lookahead: DEFAULT_LOOKAHEAD,
            ofmd_timeout: None,
        }
    }
}

impl DecoderConfig {
    /// Check that the settings can be used.
    pub fn validate(&self) -> Result<()> {
        if self.store_size < DEPTH_OFFSET {
            return Err(Error::invalid_config(format!(
                "store_size must be at least {} bytes",
                DEPTH_OFFSET
            )));
        }
        let min_lookahead = SEI_MARKER.len() + OFMD_MARKER.len();
        if self.lookahead < min_lookahead {
            return Err(Error::invalid_config(format!(
                "lookahead must be at least {} bytes",
                min_lookahead
            )));
        }
        Ok(())
    }
}

/// Counters collected while decoding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStats {
    /// SEI markers seen.
    pub sei_markers: u64,
    /// SEI markers without a nearby `"OFMD"`.
    pub unrelated_sei: u64,
    /// Records dropped by validation.
    pub discarded: u64,
    /// Records handed out.
    pub accepted: u64,
}

/// `position` as a rounded-up percentage of `total_size`, capped at 100.
pub fn progress_percent(position: u64, total_size: Option<u64>) -> Option<u8> {
    let total = total_size.filter(|&t| t > 0)?;
    let percent = (position as f64 / total as f64 * 100.0).ceil();
    Some(percent.min(100.0) as u8)
}

/// Lazy, stream-ordered OFMD record iterator.
///
/// Yields `Err(Error::NoOfmdRecords)` if the stream ends before any valid
/// record was found. Any error ends iteration.
pub struct OfmdDecoder<R> {
    scanner: StreamScanner<R>,
    config: DecoderConfig,
    total_size: Option<u64>,
    started: Instant,
    stats: DecodeStats,
    finished: bool,
}

impl OfmdDecoder<Box<dyn Read + Send>> {
    /// Build a decoder over an opened input source.
    pub fn from_source(
        source: InputSource,
        scanner: ScannerConfig,
        config: DecoderConfig,
    ) -> Result<Self> {
        let total_size = source.total_size();
        Ok(Self::new(source.into_reader(), scanner, config)?.with_total_size(total_size))
    }
}

impl<R: Read> OfmdDecoder<R> {
    /// Build a decoder over any byte reader.
    pub fn new(reader: R, scanner: ScannerConfig, config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        let window = config.store_size.max(config.lookahead);
        if window > scanner.max_buffer_size {
            return Err(Error::invalid_config(format!(
                "store_size and lookahead must fit max_buffer_size ({} > {})",
                window, scanner.max_buffer_size
            )));
        }

        Ok(Self {
            scanner: StreamScanner::new(reader, scanner)?,
            config,
            total_size: None,
            started: Instant::now(),
            stats: DecodeStats::default(),
            finished: false,
        })
    }

    /// Record the stream length so progress can be reported.
    pub fn with_total_size(mut self, total_size: Option<u64>) -> Self {
        self.total_size = total_size;
        self
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.scanner.position()
    }

    /// Stream length, when known.
    pub fn total_size(&self) -> Option<u64> {
        self.total_size
    }

    /// Scan progress as a rounded-up percentage, when the length is known.
    pub fn progress_percent(&self) -> Option<u8> {
        progress_percent(self.position(), self.total_size)
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Drain the stream into a vector of records.
    pub fn decode_all(self) -> Result<Vec<OfmdRecord>> {
        self.collect()
    }

    fn next_record(&mut self) -> Result<Option<OfmdRecord>> {
        loop {
            if self.stats.accepted == 0 {
                if let Some(timeout) = self.config.ofmd_timeout {
                    let elapsed = self.started.elapsed();
                    if elapsed >= timeout {
                        return Err(Error::OfmdTimeout { elapsed });
                    }
                }
            }

            let Some(sei_offset) = self.scanner.find_next(SEI_MARKER)? else {
                return Ok(None);
            };
            self.stats.sei_markers += 1;

            let window = self.scanner.peek(self.config.lookahead)?;
            let window_len = window.len();
            let Some(marker_at) = find_pattern(window, OFMD_MARKER) else {
                tracing::trace!(offset = sei_offset, "SEI without OFMD");
                self.stats.unrelated_sei += 1;
                self.scanner.consume(window_len)?;
                continue;
            };

            self.scanner.consume(marker_at)?;
            let offset = self.scanner.position();
            let data = self.scanner.peek(self.config.store_size)?.to_vec();
            // The next record's SEI may sit inside this capture.
            self.scanner.consume(OFMD_MARKER.len())?;

            match OfmdRecord::parse(data, offset) {
                Ok(record) => {
                    self.stats.accepted += 1;
                    tracing::debug!(
                        offset,
                        frame_rate = %record.frame_rate(),
                        planes = record.plane_count(),
                        frames = record.frame_count(),
                        "OFMD record"
                    );
                    return Ok(Some(record));
                }
                Err(e) => {
                    self.stats.discarded += 1;
                    tracing::trace!(offset, error = %e, "discarding OFMD record");
                }
            }
        }
    }
}

impl<R: Read> Iterator for OfmdDecoder<R> {
    type Item = Result<OfmdRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                if self.stats.accepted == 0 {
                    Some(Err(Error::NoOfmdRecords))
                } else {
                    None
                }
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
