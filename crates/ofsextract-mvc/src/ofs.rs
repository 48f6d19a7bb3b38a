//! OFS sidecar serialization.
//!
//! An OFS file is a 41-byte header followed by one depth byte per frame:
//!
//! | Offset | Size | Field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 8    | signature `89 4F 46 53 0D 0A 1A 0A`     |
//! | 8      | 4    | version `"0100"`                        |
//! | 12     | 16   | GUID, last byte is the plane index      |
//! | 28     | 1    | frame rate code * 16 + drop-frame flag  |
//! | 29     | 4    | number of rolls, reserved, marker bits  |
//! | 33     | 4    | start timecode                          |
//! | 37     | 4    | number of frames (big-endian)           |
//! | 41     | n    | depth bytes                             |

use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::planes::{DepthPlane, ExtractionContext};
use crate::types::FrameRate;

/// File signature.
pub const OFS_SIGNATURE: [u8; 8] = [0x89, 0x4F, 0x46, 0x53, 0x0D, 0x0A, 0x1A, 0x0A];

/// Format version string.
pub const OFS_VERSION: &[u8; 4] = b"0100";

/// Header length in bytes.
pub const OFS_HEADER_LEN: usize = 41;

// number_of_rolls = 1, reserved and marker bits zero
const ROLLS_AND_MARKERS: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// GUID bytes shared by every plane written in one run.
///
/// The 16th byte is not stored; it is the plane index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfsGuid([u8; 15]);

impl OfsGuid {
    /// Draw 15 random bytes.
    pub fn generate() -> Self {
        let random = Uuid::new_v4().into_bytes();
        let mut prefix = [0u8; 15];
        prefix.copy_from_slice(&random[..15]);
        Self(prefix)
    }

    pub fn from_prefix(prefix: [u8; 15]) -> Self {
        Self(prefix)
    }

    pub fn prefix(&self) -> &[u8; 15] {
        &self.0
    }

    /// Full 16-byte GUID for a plane.
    pub fn for_plane(&self, index: usize) -> [u8; 16] {
        let mut guid = [0u8; 16];
        guid[..15].copy_from_slice(&self.0);
        guid[15] = index as u8;
        guid
    }
}

/// Sidecar file name for a plane.
pub fn ofs_file_name(index: usize) -> String {
    format!("3D-Plane-{:02}.ofs", index)
}

/// Writes OFS files for the planes of one extraction run.
#[derive(Debug, Clone)]
pub struct OfsEncoder {
    guid: OfsGuid,
    drop_frame: bool,
}

impl OfsEncoder {
    /// Encoder with a freshly generated GUID.
    pub fn new(drop_frame: bool) -> Self {
        Self::with_guid(OfsGuid::generate(), drop_frame)
    }

    pub fn with_guid(guid: OfsGuid, drop_frame: bool) -> Self {
        Self { guid, drop_frame }
    }

    pub fn guid(&self) -> &OfsGuid {
        &self.guid
    }

    pub fn drop_frame(&self) -> bool {
        self.drop_frame
    }

    /// Frame rate byte for the header.
    pub fn frame_rate_byte(&self, frame_rate: FrameRate) -> u8 {
        frame_rate.code() * 16 + u8::from(self.drop_frame)
    }

    /// Serialize one plane.
    pub fn encode(&self, context: &ExtractionContext, plane: &DepthPlane) -> Result<Bytes> {
        let frames = context.total_frames();
        if plane.len() != frames {
            return Err(Error::invalid_ofs(format!(
                "plane {} has {} frames, expected {}",
                plane.index(),
                plane.len(),
                frames
            )));
        }
        let frame_count = u32::try_from(frames).map_err(|_| {
            Error::invalid_ofs(format!("{} frames do not fit a 32-bit count", frames))
        })?;

        let mut buf = BytesMut::with_capacity(OFS_HEADER_LEN + frames);
        buf.put_slice(&OFS_SIGNATURE);
        buf.put_slice(OFS_VERSION);
        buf.put_slice(&self.guid.for_plane(plane.index()));
        buf.put_u8(self.frame_rate_byte(context.frame_rate()));
        buf.put_slice(&ROLLS_AND_MARKERS);
        buf.put_u32(0); // start timecode
        buf.put_u32(frame_count);
        buf.put_slice(plane.depths());

        Ok(buf.freeze())
    }

    /// Serialize one plane into `output_dir`, which must already exist.
    pub fn write(
        &self,
        context: &ExtractionContext,
        plane: &DepthPlane,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let data = self.encode(context, plane)?;
        let path = output_dir.join(ofs_file_name(plane.index()));

        std::fs::write(&path, &data).map_err(|source| Error::WriteFailed {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), bytes = data.len(), "wrote OFS file");
        Ok(path)
    }
}

/// A parsed OFS file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfsFile {
    pub guid: [u8; 16],
    pub frame_rate: FrameRate,
    pub drop_frame: bool,
    pub start_timecode: u32,
    pub depths: Vec<u8>,
}

impl OfsFile {
    /// Parse OFS bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < OFS_HEADER_LEN {
            return Err(Error::invalid_ofs(format!(
                "{} bytes is shorter than the header",
                data.len()
            )));
        }

        let mut buf = data;
        if buf[..8] != OFS_SIGNATURE {
            return Err(Error::invalid_ofs("bad signature"));
        }
        buf.advance(8);
        if &buf[..4] != OFS_VERSION {
            return Err(Error::invalid_ofs("unsupported version"));
        }
        buf.advance(4);

        let mut guid = [0u8; 16];
        buf.copy_to_slice(&mut guid);

        let rate_byte = buf.get_u8();
        let frame_rate = FrameRate::from_code(rate_byte >> 4).ok_or_else(|| {
            Error::invalid_ofs(format!("undefined frame rate code {}", rate_byte >> 4))
        })?;
        let drop_frame = rate_byte & 0x0F == 1;

        buf.advance(ROLLS_AND_MARKERS.len());
        let start_timecode = buf.get_u32();
        let frames = buf.get_u32() as usize;

        if buf.remaining() < frames {
            return Err(Error::invalid_ofs(format!(
                "header declares {} frames, file has {}",
                frames,
                buf.remaining()
            )));
        }

        Ok(Self {
            guid,
            frame_rate,
            drop_frame,
            start_timecode,
            depths: buf[..frames].to_vec(),
        })
    }

    /// Read and parse an OFS file from disk.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    /// Plane index stored in the last GUID byte.
    pub fn plane_index(&self) -> u8 {
        self.guid[15]
    }

    pub fn frame_count(&self) -> usize {
        self.depths.len()
    }
}
