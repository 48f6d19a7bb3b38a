//! # ofsextract-mvc
//!
//! Extraction of 3D-Plane depth metadata from MVC elementary streams and
//! serialization to OFS sidecar files.
//!
//! Stereoscopic Blu-ray streams carry subtitle and menu depth ("3D-Planes")
//! in SEI messages that hold an `"OFMD"` record. This crate finds those
//! records with a bounded-memory scanner, rebuilds one depth series per
//! plane, validates each plane and writes the valid ones as OFS files.
//!
//! ## Features
//!
//! - Streaming search over files, pipes and standard input
//! - Sliding-window or bounded-growth buffering with wall-clock timeouts
//! - Per-plane statistics and duplicate detection
//! - OFS writer and reader
//!
//! ## Example
//!
//! ```no_run
//! use ofsextract_mvc::{
//!     reconstruct, validate, DecoderConfig, InputSource, OfmdDecoder, OfsEncoder,
//!     ScannerConfig, TruncationRule,
//! };
//! use std::path::Path;
//!
//! let source = InputSource::open("movie.mvc").unwrap();
//! let records = OfmdDecoder::from_source(source, ScannerConfig::default(), DecoderConfig::default())
//!     .unwrap()
//!     .decode_all()
//!     .unwrap();
//!
//! let planes = reconstruct(records).unwrap();
//! let report = validate(planes.context, &planes.planes, TruncationRule::ExamineAll);
//!
//! let encoder = OfsEncoder::new(false);
//! for plane in planes.planes.iter().filter(|p| report.is_valid(p.index())) {
//!     let path = encoder.write(&planes.context, plane, Path::new(".")).unwrap();
//!     println!("wrote {}", path.display());
//! }
//! ```

pub mod decoder;
pub mod error;
pub mod ofmd;
pub mod ofs;
pub mod planes;
pub mod scanner;
pub mod source;
pub mod types;
pub mod validate;

#[cfg(test)]
mod fixtures;

pub use decoder::{DecodeStats, DecoderConfig, OfmdDecoder};
pub use error::{Error, Result};
pub use ofmd::OfmdRecord;
pub use ofs::{ofs_file_name, OfsEncoder, OfsFile, OfsGuid};
pub use planes::{reconstruct, DepthPlane, ExtractionContext, Reconstruction, UNDEFINED_DEPTH};
pub use scanner::{ScanStrategy, ScannerConfig, StreamScanner};
pub use source::{InputSource, SourceKind, STDIN_PATH};
pub use types::FrameRate;
pub use validate::{
    depth_magnitude, find_duplicates, validate, PlaneReport, PlaneStats, TruncationRule,
    ValidationReport,
};
