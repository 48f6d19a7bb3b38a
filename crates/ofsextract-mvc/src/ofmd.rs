//! OFMD (offset metadata) record view
//!
//! An OFMD record is a fixed-size capture starting at the ASCII marker
//! `"OFMD"`. Only a handful of header bytes are interpreted:
//!
//! | Offset | Field                                   |
//! |--------|-----------------------------------------|
//! | 0..4   | `"OFMD"`                                |
//! | 4      | frame rate code (low 4 bits)            |
//! | 10     | number of planes (low 7 bits)           |
//! | 11     | number of frames (low 7 bits)           |
//! | 14..   | depth bytes, one block of `frames` per plane |

use crate::error::{Error, Result};
use crate::types::FrameRate;

/// ASCII marker that starts every record.
pub const OFMD_MARKER: &[u8; 4] = b"OFMD";

/// SEI start code prefix that carries OFMD records in MVC streams.
pub const SEI_MARKER: &[u8; 4] = &[0x00, 0x01, 0x06, 0x25];

/// Offset of the first depth byte.
pub const DEPTH_OFFSET: usize = 14;

/// Default number of bytes captured per record.
pub const DEFAULT_STORE_SIZE: usize = 4096;

/// Default distance after an SEI marker within which `"OFMD"` must start.
pub const DEFAULT_LOOKAHEAD: usize = 200;

const FRAME_RATE_OFFSET: usize = 4;
const PLANE_COUNT_OFFSET: usize = 10;
const FRAME_COUNT_OFFSET: usize = 11;

/// A validated OFMD record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfmdRecord {
    data: Vec<u8>,
    offset: u64,
    frame_rate: FrameRate,
    plane_count: u8,
    frame_count: u8,
}

impl OfmdRecord {
    /// Validate a captured buffer found at stream `offset`.
    ///
    /// Rejects buffers that do not start with the marker, carry an undefined
    /// frame rate code, or are too short for their own depth blocks.
    pub fn parse(data: Vec<u8>, offset: u64) -> Result<Self> {
        if !data.starts_with(OFMD_MARKER) {
            return Err(Error::invalid_record("missing OFMD marker"));
        }
        if data.len() < DEPTH_OFFSET {
            return Err(Error::invalid_record(format!(
                "{} bytes is too short for a record header",
                data.len()
            )));
        }

        let frame_rate = FrameRate::try_from(data[FRAME_RATE_OFFSET] & 0x0F)?;
        let plane_count = data[PLANE_COUNT_OFFSET] & 0x7F;
        let frame_count = data[FRAME_COUNT_OFFSET] & 0x7F;

        let needed = depth_len(plane_count as usize, frame_count as usize);
        if data.len() < needed {
            return Err(Error::invalid_record(format!(
                "{} planes x {} frames needs {} bytes, record has {}",
                plane_count,
                frame_count,
                needed,
                data.len()
            )));
        }

        Ok(Self {
            data,
            offset,
            frame_rate,
            plane_count,
            frame_count,
        })
    }

    /// Absolute stream offset of the `"OFMD"` marker.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    pub fn plane_count(&self) -> u8 {
        self.plane_count
    }

    pub fn frame_count(&self) -> u8 {
        self.frame_count
    }

    /// Raw captured bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Whether the capture holds depth blocks for `planes` planes.
    pub fn covers_planes(&self, planes: usize) -> bool {
        self.data.len() >= depth_len(planes, self.frame_count as usize)
    }

    /// Depth bytes of `plane` for this record's frames.
    ///
    /// Returns `None` when the block lies outside the captured buffer.
    pub fn plane_segment(&self, plane: usize) -> Option<&[u8]> {
        let frames = self.frame_count as usize;
        let start = DEPTH_OFFSET + plane * frames;
        self.data.get(start..start + frames)
    }
}

/// Bytes needed to hold `planes` blocks of `frames` depth bytes.
fn depth_len(planes: usize, frames: usize) -> usize {
    DEPTH_OFFSET + planes * frames
}
