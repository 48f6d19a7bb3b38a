//! Synthetic stream builders for unit tests.

use crate::ofmd::{OfmdRecord, SEI_MARKER};

/// Build a bare OFMD record with one depth block per plane.
///
/// Every block must have the same length, which becomes the frame count.
pub fn ofmd_bytes(frame_rate_code: u8, planes: &[Vec<u8>]) -> Vec<u8> {
    let frames = planes.first().map(|p| p.len()).unwrap_or(0);
    assert!(planes.iter().all(|p| p.len() == frames));

    let mut data = vec![0u8; 14];
    data[..4].copy_from_slice(b"OFMD");
    data[4] = frame_rate_code;
    data[10] = planes.len() as u8;
    data[11] = frames as u8;
    for plane in planes {
        data.extend_from_slice(plane);
    }
    data
}

/// Wrap a record the way it appears in an MVC stream: start code, SEI
/// header, a few payload bytes, then the record.
pub fn sei_wrapped(record: &[u8]) -> Vec<u8> {
    let mut out = vec![0x00];
    out.extend_from_slice(SEI_MARKER);
    out.extend_from_slice(&[0x0E, 0x40, 0x2A, 0x11]);
    out.extend_from_slice(record);
    out
}

/// Parse a record built by [`ofmd_bytes`].
pub fn record(frame_rate_code: u8, planes: &[Vec<u8>]) -> OfmdRecord {
    OfmdRecord::parse(ofmd_bytes(frame_rate_code, planes), 0).unwrap()
}
