//! Extraction run: find OFMD records, rebuild the planes, validate them and
//! write one OFS file per valid plane.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ofsextract_mvc::decoder::progress_percent;
use ofsextract_mvc::{
    reconstruct, validate, ExtractionContext, FrameRate, InputSource, OfmdDecoder, OfsEncoder,
    TruncationRule, ValidationReport, STDIN_PATH,
};
use serde::Serialize;

use crate::config::Config;

/// Input extensions accepted on the command line, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["mvc", "h264", "264", "m2ts"];

/// Lowercase extension of `input`, or an empty string.
pub fn input_extension(input: &Path) -> String {
    input
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Whether `input` names standard input or a supported stream file.
pub fn is_supported_input(input: &Path) -> bool {
    input.as_os_str() == STDIN_PATH
        || SUPPORTED_EXTENSIONS.contains(&input_extension(input).as_str())
}

/// Plane validation rule for an input path.
pub fn truncation_rule(input: &Path) -> TruncationRule {
    TruncationRule::for_extension(&input_extension(input))
}

/// What to extract and where to put it.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Replaces the frame rate found in the stream.
    pub frame_rate: Option<FrameRate>,
    pub drop_frame: bool,
    pub show_progress: bool,
}

impl ExtractOptions {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            frame_rate: None,
            drop_frame: false,
            show_progress: false,
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// OFMD records accepted by the decoder.
    pub records: u64,
    /// Records dropped by reconstruction for being too short.
    pub skipped_records: usize,
    pub drop_frame: bool,
    pub report: ValidationReport,
    /// OFS files in plane order.
    pub written: Vec<PathBuf>,
}

impl Extraction {
    pub fn context(&self) -> &ExtractionContext {
        &self.report.context
    }
}

/// `\rProgress N%` on stderr, redrawn only when the value changes.
struct Progress {
    enabled: bool,
    last: Option<u8>,
}

impl Progress {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last: None,
        }
    }

    fn update(&mut self, percent: Option<u8>) {
        let Some(percent) = percent.filter(|_| self.enabled) else {
            return;
        };
        if self.last != Some(percent) {
            self.last = Some(percent);
            let mut stderr = std::io::stderr().lock();
            let _ = write!(stderr, "\rProgress {}%", percent);
            let _ = stderr.flush();
        }
    }

    fn finish(&mut self) {
        if self.last.is_some() {
            eprintln!();
        }
    }
}

/// Run one extraction.
pub fn run(config: &Config, options: &ExtractOptions) -> Result<Extraction> {
    let input = &options.input;
    let source =
        InputSource::open(input).with_context(|| format!("Failed to open {:?}", input))?;
    tracing::info!("Scanning {:?} for 3D-Planes", input);

    let scanner = config.scanner_config(source.kind());
    let mut decoder = OfmdDecoder::from_source(source, scanner, config.decoder_config())?;

    let total_size = decoder.total_size();
    let mut progress = Progress::new(options.show_progress);
    let mut records = Vec::new();
    for record in decoder.by_ref() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                progress.finish();
                return Err(e.into());
            }
        };
        progress.update(progress_percent(record.offset(), total_size));
        records.push(record);
    }
    progress.update(decoder.progress_percent());
    progress.finish();

    let stats = decoder.stats();
    tracing::info!(
        records = stats.accepted,
        sei = stats.sei_markers,
        discarded = stats.discarded,
        "Scan complete"
    );

    let reconstruction = reconstruct(records)?;
    let mut context = reconstruction.context;
    if let Some(frame_rate) = options.frame_rate {
        tracing::info!("Frame rate overridden to {} fps", frame_rate);
        context = context.with_frame_rate(frame_rate);
    }

    let report = validate(context, &reconstruction.planes, truncation_rule(input));

    std::fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("Failed to create output folder {:?}", options.output_dir))?;

    let encoder = OfsEncoder::new(options.drop_frame);
    let mut written = Vec::with_capacity(report.valid_count());
    for plane in reconstruction
        .planes
        .iter()
        .filter(|p| report.is_valid(p.index()))
    {
        let path = encoder.write(&context, plane, &options.output_dir)?;
        tracing::info!("Wrote {:?}", path);
        written.push(path);
    }

    Ok(Extraction {
        input: input.clone(),
        output_dir: options.output_dir.clone(),
        records: stats.accepted,
        skipped_records: reconstruction.skipped_records,
        drop_frame: options.drop_frame,
        report,
        written,
    })
}
