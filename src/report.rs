//! Human-readable and JSON rendering of an extraction.

use std::fmt::Write;

use anyhow::Result;
use ofsextract_mvc::{PlaneReport, PlaneStats};

use crate::extract::Extraction;

fn push_stats(out: &mut String, stats: &PlaneStats) {
    let _ = writeln!(out, "NumFrames: {}", stats.frames);
    let _ = writeln!(out, "Minimum depth: {}", stats.min_depth);
    let _ = writeln!(out, "Maximum depth: {}", stats.max_depth);
    let _ = writeln!(out, "Average depth: {:.2}", stats.average_depth);
    let _ = writeln!(out, "Number of changes of depth value: {}", stats.cuts);
    if let Some(first) = stats.first_defined_frame {
        let _ = writeln!(out, "First frame with a defined depth: {}", first);
    }
    if let Some(last) = stats.last_defined_frame {
        let _ = writeln!(out, "Last frame with a defined depth: {}", last);
    }
    let _ = writeln!(
        out,
        "Number of frames with undefined depth: {}",
        stats.undefined_frames
    );

    if stats.duplicates.is_empty() {
        let _ = writeln!(out, "Identical Planes: None");
    } else {
        let list: Vec<String> = stats
            .duplicates
            .iter()
            .map(|d| format!("#{:02}", d))
            .collect();
        let _ = writeln!(out, "Identical Planes: {}", list.join(" "));
    }

    if stats.is_fixed_depth() {
        let _ = writeln!(
            out,
            "*** Warning This 3D-Plane has a fixed depth of {}! ***",
            stats.min_depth
        );
    }
}

fn push_plane(out: &mut String, plane: &PlaneReport) {
    out.push('\n');
    match &plane.stats {
        Some(stats) if plane.valid => {
            let _ = writeln!(out, "3D-Plane #{:02}", plane.index);
            push_stats(out, stats);
        }
        _ => {
            let _ = writeln!(out, "3D-Plane #{:02} is empty.", plane.index);
        }
    }
}

/// Per-plane diagnostics followed by a summary.
pub fn render_text(extraction: &Extraction) -> String {
    let report = &extraction.report;
    let mut out = String::new();

    for plane in &report.planes {
        push_plane(&mut out, plane);
    }
    if report.stopped_early {
        out.push_str("Stopping here because input file is M2TS.\n");
    }

    let context = extraction.context();
    out.push('\n');
    let _ = writeln!(out, "3D-Planes in stream: {}", report.planes_in_stream());
    let _ = writeln!(out, "3D-Planes written: {}", extraction.written.len());
    let _ = writeln!(out, "Frames: {}", context.total_frames());
    let _ = writeln!(out, "Frame rate: {}", context.frame_rate().name());
    if extraction.drop_frame {
        let _ = writeln!(out, "drop_frame_flag set");
    }

    out
}

/// The whole extraction as pretty-printed JSON.
pub fn render_json(extraction: &Extraction) -> Result<String> {
    Ok(serde_json::to_string_pretty(extraction)?)
}
