//! Plane classification and depth statistics.

use crate::planes::{DepthPlane, ExtractionContext, UNDEFINED_DEPTH};

/// Whether validation examines every plane or stops at the first empty one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TruncationRule {
    /// Examine every plane.
    #[default]
    ExamineAll,
    /// Stop at the first empty plane. Used for M2TS input.
    StopAtFirstEmpty,
}

impl TruncationRule {
    /// Pick the rule for an input file extension.
    pub fn for_extension(ext: &str) -> Self {
        if ext.eq_ignore_ascii_case("m2ts") {
            TruncationRule::StopAtFirstEmpty
        } else {
            TruncationRule::ExamineAll
        }
    }
}

/// Signed depth of a raw byte, or `None` for an undefined frame.
///
/// Bytes above 128 encode negative depths: 129 is -1, 255 is -127.
pub fn depth_magnitude(raw: u8) -> Option<i16> {
    match raw {
        UNDEFINED_DEPTH => None,
        v if v > UNDEFINED_DEPTH => Some(128 - v as i16),
        v => Some(v as i16),
    }
}

/// Diagnostics for one plane.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaneStats {
    pub frames: usize,
    pub min_depth: i16,
    pub max_depth: i16,
    /// Mean over defined frames only.
    pub average_depth: f64,
    /// Number of times the raw byte changes from one frame to the next,
    /// counting from an implicit 0 before the first frame.
    pub cuts: usize,
    pub first_defined_frame: Option<usize>,
    pub last_defined_frame: Option<usize>,
    pub undefined_frames: usize,
    /// Other planes with a byte-identical depth series.
    pub duplicates: Vec<usize>,
}

impl PlaneStats {
    /// Compute statistics over a depth series. `duplicates` is left empty.
    pub fn compute(depths: &[u8]) -> Self {
        let mut min_depth = i16::MAX;
        let mut max_depth = i16::MIN;
        let mut total: i64 = 0;
        let mut defined = 0usize;
        let mut first_defined_frame = None;
        let mut last_defined_frame = None;
        // The series starts from an implicit depth byte of 0.
        let mut last_raw = 0u8;
        let mut cuts = 0usize;

        for (frame, &raw) in depths.iter().enumerate() {
            if raw != last_raw {
                cuts += 1;
                last_raw = raw;
            }
            let Some(depth) = depth_magnitude(raw) else {
                continue;
            };
            first_defined_frame.get_or_insert(frame);
            last_defined_frame = Some(frame);
            min_depth = min_depth.min(depth);
            max_depth = max_depth.max(depth);
            total += depth as i64;
            defined += 1;
        }

        let (min_depth, max_depth, average_depth) = if defined == 0 {
            (0, 0, 0.0)
        } else {
            (min_depth, max_depth, total as f64 / defined as f64)
        };

        Self {
            frames: depths.len(),
            min_depth,
            max_depth,
            average_depth,
            cuts,
            first_defined_frame,
            last_defined_frame,
            undefined_frames: depths.len() - defined,
            duplicates: Vec::new(),
        }
    }

    /// The plane never changes depth.
    pub fn is_fixed_depth(&self) -> bool {
        self.min_depth == self.max_depth
    }
}

/// Verdict for one examined plane.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaneReport {
    pub index: usize,
    pub valid: bool,
    /// Present for valid planes only.
    pub stats: Option<PlaneStats>,
}

/// Result of [`validate`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationReport {
    pub context: ExtractionContext,
    /// Examined planes in index order. With [`TruncationRule::StopAtFirstEmpty`]
    /// the last entry is the empty plane that stopped validation.
    pub planes: Vec<PlaneReport>,
    pub stopped_early: bool,
}

impl ValidationReport {
    /// One flag per plane in the context; unexamined planes are invalid.
    pub fn valid_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.context.num_planes()];
        for report in &self.planes {
            if let Some(slot) = mask.get_mut(report.index) {
                *slot = report.valid;
            }
        }
        mask
    }

    /// Whether plane `index` was examined and found valid.
    pub fn is_valid(&self, index: usize) -> bool {
        self.planes.iter().any(|r| r.index == index && r.valid)
    }

    pub fn valid_count(&self) -> usize {
        self.planes.iter().filter(|r| r.valid).count()
    }

    /// Planes counted as present in the stream: every examined plane except
    /// the empty one that stopped validation early.
    pub fn planes_in_stream(&self) -> usize {
        self.planes.len() - usize::from(self.stopped_early)
    }
}

/// Indices of planes whose depth series equals plane `index`'s, excluding
/// `index` itself.
pub fn find_duplicates(planes: &[DepthPlane], index: usize) -> Vec<usize> {
    let Some(target) = planes.iter().find(|p| p.index() == index) else {
        return Vec::new();
    };

    planes
        .iter()
        .filter(|p| p.index() != index && p.depths() == target.depths())
        .map(|p| p.index())
        .collect()
}

/// Classify planes and compute statistics for the valid ones.
pub fn validate(
    context: ExtractionContext,
    planes: &[DepthPlane],
    rule: TruncationRule,
) -> ValidationReport {
    let mut reports = Vec::with_capacity(planes.len());
    let mut stopped_early = false;

    for plane in planes {
        if !plane.is_valid() {
            tracing::debug!(plane = plane.index(), "3D-Plane is empty");
            reports.push(PlaneReport {
                index: plane.index(),
                valid: false,
                stats: None,
            });
            if rule == TruncationRule::StopAtFirstEmpty {
                stopped_early = true;
                break;
            }
            continue;
        }

        let mut stats = PlaneStats::compute(plane.depths());
        stats.duplicates = find_duplicates(planes, plane.index());
        reports.push(PlaneReport {
            index: plane.index(),
            valid: true,
            stats: Some(stats),
        });
    }

    ValidationReport {
        context,
        planes: reports,
        stopped_early,
    }
}
