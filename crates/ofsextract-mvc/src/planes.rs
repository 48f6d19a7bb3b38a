//! Depth plane reconstruction from interleaved OFMD records.
//!
//! Each record carries `frame_count` frames for every plane, laid out as
//! one contiguous block per plane starting at byte 14. Walking the records
//! in stream order and appending each plane's block rebuilds one depth
//! time series per plane.

use crate::error::{Error, Result};
use crate::ofmd::OfmdRecord;
use crate::types::FrameRate;

/// Depth byte meaning "no depth defined for this frame".
pub const UNDEFINED_DEPTH: u8 = 0x80;

/// Stream-wide format, inferred once from the first record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractionContext {
    frame_rate: FrameRate,
    num_planes: usize,
    total_frames: usize,
}

impl ExtractionContext {
    pub fn new(frame_rate: FrameRate, num_planes: usize, total_frames: usize) -> Self {
        Self {
            frame_rate,
            num_planes,
            total_frames,
        }
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    pub fn num_planes(&self) -> usize {
        self.num_planes
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// Same context with the frame rate replaced.
    pub fn with_frame_rate(self, frame_rate: FrameRate) -> Self {
        Self { frame_rate, ..self }
    }
}

/// One plane's depth bytes, one per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthPlane {
    index: usize,
    depths: Vec<u8>,
}

impl DepthPlane {
    pub fn new(index: usize, depths: Vec<u8>) -> Self {
        Self { index, depths }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn depths(&self) -> &[u8] {
        &self.depths
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// A plane is valid when at least one frame has a defined depth.
    pub fn is_valid(&self) -> bool {
        self.depths.iter().any(|&d| d != UNDEFINED_DEPTH)
    }
}

/// Output of [`reconstruct`].
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub context: ExtractionContext,
    pub planes: Vec<DepthPlane>,
    /// Records left out because they were too short for the plane count.
    pub skipped_records: usize,
    /// Records whose header disagreed with the context.
    pub divergent_records: usize,
}

/// Rebuild per-plane depth series from records in stream order.
///
/// Frame rate and plane count come from the first record. Records that
/// disagree are still used, with a warning; records too short to hold a
/// block for every plane are skipped and contribute no frames.
pub fn reconstruct(records: Vec<OfmdRecord>) -> Result<Reconstruction> {
    let first = records.first().ok_or(Error::EmptyInput)?;
    let frame_rate = first.frame_rate();
    let num_planes = first.plane_count() as usize;

    let mut divergent_records = 0;
    let mut skipped_records = 0;
    let mut usable = Vec::with_capacity(records.len());
    for record in records {
        if record.frame_rate() != frame_rate || record.plane_count() as usize != num_planes {
            divergent_records += 1;
            tracing::warn!(
                offset = record.offset(),
                frame_rate = %record.frame_rate(),
                planes = record.plane_count(),
                expected_frame_rate = %frame_rate,
                expected_planes = num_planes,
                "OFMD record disagrees with the first record"
            );
        }

        if !record.covers_planes(num_planes) {
            tracing::warn!(
                offset = record.offset(),
                frames = record.frame_count(),
                planes = num_planes,
                "OFMD record too short for every plane, skipping"
            );
            skipped_records += 1;
            continue;
        }
        usable.push(record);
    }

    let total_frames: usize = usable.iter().map(|r| r.frame_count() as usize).sum();

    let mut depths: Vec<Vec<u8>> = (0..num_planes)
        .map(|_| Vec::with_capacity(total_frames))
        .collect();

    for record in &usable {
        for (plane, series) in depths.iter_mut().enumerate() {
            if let Some(segment) = record.plane_segment(plane) {
                series.extend_from_slice(segment);
            }
        }
    }

    let planes = depths
        .into_iter()
        .enumerate()
        .map(|(index, series)| DepthPlane::new(index, series))
        .collect();

    tracing::info!(
        records = usable.len(),
        planes = num_planes,
        frames = total_frames,
        frame_rate = %frame_rate,
        "reconstructed 3D-Planes"
    );

    Ok(Reconstruction {
        context: ExtractionContext::new(frame_rate, num_planes, total_frames),
        planes,
        skipped_records,
        divergent_records,
    })
}
