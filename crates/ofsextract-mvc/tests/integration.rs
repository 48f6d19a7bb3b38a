//! Integration tests for ofsextract-mvc

use std::io::Cursor;

use ofsextract_mvc::{
    reconstruct, validate, DecoderConfig, Error, FrameRate, InputSource, OfmdDecoder,
    OfsEncoder, OfsFile, ScanStrategy, ScannerConfig, TruncationRule, UNDEFINED_DEPTH,
};

/// OFMD record with one block per plane, all blocks the same length.
fn ofmd(rate_code: u8, planes: &[Vec<u8>]) -> Vec<u8> {
    let frames = planes[0].len();
    let mut data = b"OFMD".to_vec();
    data.push(rate_code);
    data.extend_from_slice(&[0; 5]);
    data.push(planes.len() as u8);
    data.push(frames as u8);
    data.extend_from_slice(&[0; 2]);
    for plane in planes {
        data.extend_from_slice(plane);
    }
    data
}

/// Elementary stream with each record behind an SEI header and some filler.
fn stream(records: &[Vec<u8>]) -> Vec<u8> {
    let mut out = vec![0x00, 0x00, 0x00, 0x01, 0x09, 0xF0];
    for record in records {
        out.extend_from_slice(&[0x00, 0x00, 0x01, 0x06, 0x25, 0x0E, 0x40, 0x2A, 0x11]);
        out.extend_from_slice(record);
        out.extend(std::iter::repeat(0xAB).take(333));
    }
    out
}

fn decode(data: Vec<u8>, scanner: ScannerConfig) -> ofsextract_mvc::Result<Vec<ofsextract_mvc::OfmdRecord>> {
    let size = data.len() as u64;
    let source = InputSource::from_reader(Cursor::new(data), Some(size));
    OfmdDecoder::from_source(source, scanner, DecoderConfig::default())?.decode_all()
}

/// Two records, two planes: frames concatenate per plane and both planes
/// are written with the full frame count.
#[test]
fn test_extract_two_planes() {
    let data = stream(&[
        ofmd(1, &[vec![10; 10], vec![20; 10]]),
        ofmd(1, &[vec![11; 5], vec![21; 5]]),
    ]);

    let records = decode(data, ScannerConfig::default()).unwrap();
    let planes = reconstruct(records).unwrap();
    assert_eq!(planes.context.total_frames(), 15);
    assert_eq!(planes.context.frame_rate(), FrameRate::Fps23_976);

    let report = validate(planes.context, &planes.planes, TruncationRule::ExamineAll);
    assert_eq!(report.valid_mask(), vec![true, true]);

    let dir = tempfile::tempdir().unwrap();
    let encoder = OfsEncoder::new(false);
    for plane in &planes.planes {
        encoder.write(&planes.context, plane, dir.path()).unwrap();
    }

    for (index, (head, tail)) in [(10u8, 11u8), (20, 21)].into_iter().enumerate() {
        let path = dir.path().join(format!("3D-Plane-{:02}.ofs", index));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes[28], 16);
        assert_eq!(&bytes[37..41], &[0, 0, 0, 15]);

        let mut expected = vec![head; 10];
        expected.extend_from_slice(&[tail; 5]);
        assert_eq!(&bytes[41..], &expected[..]);

        let parsed = OfsFile::parse(&bytes).unwrap();
        assert_eq!(parsed.plane_index() as usize, index);
        assert_eq!(parsed.frame_count(), 15);
    }
}

/// An all-undefined plane is reported invalid and never written.
#[test]
fn test_empty_plane_is_not_written() {
    let data = stream(&[ofmd(3, &[vec![5, 6, 7], vec![UNDEFINED_DEPTH; 3]])]);

    let planes = reconstruct(decode(data, ScannerConfig::default()).unwrap()).unwrap();
    let report = validate(planes.context, &planes.planes, TruncationRule::ExamineAll);
    assert_eq!(report.valid_mask(), vec![true, false]);

    let dir = tempfile::tempdir().unwrap();
    let encoder = OfsEncoder::new(false);
    for plane in planes.planes.iter().filter(|p| report.is_valid(p.index())) {
        encoder.write(&planes.context, plane, dir.path()).unwrap();
    }

    assert!(dir.path().join("3D-Plane-00.ofs").exists());
    assert!(!dir.path().join("3D-Plane-01.ofs").exists());
}

#[test]
fn test_identical_planes_are_cross_referenced() {
    let series = vec![1, 2, 3, 4];
    let data = stream(&[ofmd(2, &[series.clone(), vec![9; 4], series])]);

    let planes = reconstruct(decode(data, ScannerConfig::default()).unwrap()).unwrap();
    let report = validate(planes.context, &planes.planes, TruncationRule::ExamineAll);

    let duplicates = |i: usize| report.planes[i].stats.as_ref().unwrap().duplicates.clone();
    assert_eq!(duplicates(0), vec![2]);
    assert!(duplicates(1).is_empty());
    assert_eq!(duplicates(2), vec![0]);
}

/// Both buffering strategies find the same records, with windows far
/// smaller than the stream.
#[test]
fn test_strategies_agree() {
    let records: Vec<Vec<u8>> = (0..20)
        .map(|i| ofmd(4, &[vec![i; 7], vec![i + 1; 7]]))
        .collect();
    let data = stream(&records);

    let sliding = decode(data.clone(), ScannerConfig::default().buffer_size(16)).unwrap();
    let growth = decode(
        data,
        ScannerConfig::default()
            .buffer_size(16)
            .max_buffer_size(1 << 16)
            .strategy(ScanStrategy::BoundedGrowth),
    )
    .unwrap();

    assert_eq!(sliding.len(), 20);
    assert_eq!(sliding, growth);
}

#[test]
fn test_stream_without_records() {
    let data = vec![0x00, 0x00, 0x01, 0x06, 0x25, 0x00, 0x00, 0x00];
    assert!(matches!(
        decode(data, ScannerConfig::default()),
        Err(Error::NoOfmdRecords)
    ));
}
