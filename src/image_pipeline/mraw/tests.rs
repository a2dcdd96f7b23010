use std::io::{Cursor, Write};

use crate::image_pipeline::common::error::MrawError;
use crate::image_pipeline::mraw::{
    decode_frame_from_slice, decode_frames_parallel, unpack_12bit, unpack_12bit_to_vec, ByteSource,
    FrameGeometry, MemorySource, MrawReader, PackedChunk, SeekableSource, UnpackedFrame,
    MAX_SAMPLE_VALUE,
};

/// Packs sample pairs the way the camera does, to build fixtures with known values.
fn pack(samples: &[u16]) -> Vec<u8> {
    samples
        .chunks_exact(2)
        .flat_map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            [(a >> 4) as u8, (((a & 0x0F) << 4) | (b >> 8)) as u8, (b & 0xFF) as u8]
        })
        .collect()
}

fn pseudo_random_bytes(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x1234_5678;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        })
        .collect()
}

fn geometry_2x2() -> FrameGeometry {
    FrameGeometry::new(2, 2, 12).unwrap()
}

#[test]
fn test_unpack_known_triplet() {
    let mut out = [0u16; 2];
    let result = unpack_12bit(&[0xAB, 0xCD, 0xEF], &mut out).unwrap();

    assert_eq!(result, &[2748, 3567]);
    assert_eq!(out, [0xABC, 0xDEF]);
}

#[test]
fn test_unpack_extreme_triplets() {
    let mut out = [0xFFFFu16; 2];
    unpack_12bit(&[0x00, 0x00, 0x00], &mut out).unwrap();
    assert_eq!(out, [0, 0]);

    unpack_12bit(&[0xFF, 0xFF, 0xFF], &mut out).unwrap();
    assert_eq!(out, [4095, 4095]);
}

#[test]
fn test_unpack_output_size_and_range() {
    for triplets in [0usize, 1, 2, 5, 64, 1000] {
        let data = pseudo_random_bytes(triplets * 3);
        let out = unpack_12bit_to_vec(&data).unwrap();

        assert_eq!(out.len(), triplets * 2);
        assert!(out.iter().all(|&v| v <= MAX_SAMPLE_VALUE));
    }
}

#[test]
fn test_unpack_matches_packed_samples() {
    let samples: Vec<u16> = (0..4096u16).collect();
    let out = unpack_12bit_to_vec(&pack(&samples)).unwrap();
    assert_eq!(out, samples);
}

#[test]
fn test_unpack_rejects_partial_triplet_without_writing() {
    let data = [1u8; 7];
    let mut out = [0xBEEFu16; 4];

    let result = unpack_12bit(&data, &mut out);

    assert!(matches!(result, Err(MrawError::Precondition(_))));
    assert!(out.iter().all(|&v| v == 0xBEEF));
}

#[test]
fn test_unpack_rejects_mismatched_output() {
    let data = [0u8; 6];
    let mut too_short = [0u16; 3];
    let mut too_long = [0u16; 5];

    assert!(matches!(
        unpack_12bit(&data, &mut too_short),
        Err(MrawError::Precondition(_))
    ));
    assert!(matches!(
        unpack_12bit(&data, &mut too_long),
        Err(MrawError::Precondition(_))
    ));
    assert!(matches!(
        unpack_12bit_to_vec(&[0u8; 4]),
        Err(MrawError::Precondition(_))
    ));
}

#[test]
fn test_unpack_independent_of_partitioning() {
    // Large enough to take the parallel path.
    let triplets = 100_003;
    let data = pseudo_random_bytes(triplets * 3);
    let whole = unpack_12bit_to_vec(&data).unwrap();

    for chunk_triplets in [1usize, 7, 1000, 65_536] {
        let mut pieced = vec![0u16; triplets * 2];
        for (src, dst) in data
            .chunks(chunk_triplets * 3)
            .zip(pieced.chunks_mut(chunk_triplets * 2))
        {
            unpack_12bit(src, dst).unwrap();
        }
        assert_eq!(pieced, whole, "chunk size {chunk_triplets}");
    }
}

#[test]
fn test_geometry_validation() {
    assert!(matches!(
        FrameGeometry::new(1024, 1024, 8),
        Err(MrawError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        FrameGeometry::new(1024, 1024, 16),
        Err(MrawError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        FrameGeometry::new(0, 1024, 12),
        Err(MrawError::InvalidDimensions(0, 1024))
    ));
    assert!(matches!(
        FrameGeometry::new(3, 3, 12),
        Err(MrawError::Precondition(_))
    ));

    let geometry = FrameGeometry::new(1024, 1280, 12).unwrap();
    assert_eq!(geometry.pixel_count(), 1024 * 1280);
    assert_eq!(geometry.bit_depth(), 12);
    assert_eq!(geometry.frame_byte_size(), 1024 * 1280 * 3 / 2);
}

#[test]
fn test_frame_offsets() {
    let geometry = geometry_2x2();

    assert_eq!(geometry.frame_byte_size(), 6);
    assert_eq!(geometry.frame_offset(0).unwrap(), 0);
    assert_eq!(geometry.frame_offset(1).unwrap(), 6);
    assert_eq!(geometry.frame_offset(10).unwrap(), 60);
    assert!(matches!(
        geometry.frame_offset(u64::MAX),
        Err(MrawError::ShortRead { .. })
    ));
}

#[test]
fn test_decode_reads_the_right_byte_range() {
    let bytes = pseudo_random_bytes(12);
    let mut reader = MrawReader::new(MemorySource::new(&bytes), geometry_2x2(), 2);

    let first = reader.decode_frame(0).unwrap();
    let second = reader.decode_frame(1).unwrap();

    assert_eq!(first.as_slice(), unpack_12bit_to_vec(&bytes[0..6]).unwrap());
    assert_eq!(second.as_slice(), unpack_12bit_to_vec(&bytes[6..12]).unwrap());
    assert_eq!(first.rows(), 2);
    assert_eq!(first.columns(), 2);
}

#[test]
fn test_decode_past_end_is_short_read() {
    let bytes = pseudo_random_bytes(12);
    let mut reader = MrawReader::new(MemorySource::new(&bytes), geometry_2x2(), 2);

    match reader.decode_frame(2) {
        Err(MrawError::ShortRead {
            offset,
            expected,
            available,
        }) => {
            assert_eq!(offset, 12);
            assert_eq!(expected, 6);
            assert_eq!(available, 0);
        }
        other => panic!("expected short read, got {other:?}"),
    }
}

#[test]
fn test_decode_truncated_frame_is_short_read() {
    let bytes = pseudo_random_bytes(9);
    let mut reader = MrawReader::new(SeekableSource::new(Cursor::new(bytes)), geometry_2x2(), 2);

    assert!(reader.decode_frame(0).is_ok());
    assert!(matches!(
        reader.decode_frame(1),
        Err(MrawError::ShortRead {
            offset: 6,
            expected: 6,
            available: 3
        })
    ));
}

#[test]
fn test_decode_is_deterministic() {
    let geometry = FrameGeometry::new(16, 24, 12).unwrap();
    let bytes = pseudo_random_bytes(geometry.frame_byte_size() * 3);
    let mut reader = MrawReader::new(SeekableSource::new(Cursor::new(bytes)), geometry, 3);

    let a = reader.decode_frame(1).unwrap();
    let b = reader.decode_frame(1).unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_decode_into_reuses_buffer_and_checks_shape() {
    let bytes = pseudo_random_bytes(12);
    let mut reader = MrawReader::new(MemorySource::new(&bytes), geometry_2x2(), 2);

    let mut frame = UnpackedFrame::zeroed(&geometry_2x2());
    reader.decode_frame_into(1, &mut frame).unwrap();
    assert_eq!(frame.as_slice(), unpack_12bit_to_vec(&bytes[6..12]).unwrap());

    // A failed read leaves the previous contents alone.
    let before = frame.clone();
    assert!(reader.decode_frame_into(5, &mut frame).is_err());
    assert_eq!(frame, before);

    let mut wrong = UnpackedFrame::zeroed(&FrameGeometry::new(2, 4, 12).unwrap());
    assert!(matches!(
        reader.decode_frame_into(0, &mut wrong),
        Err(MrawError::Precondition(_))
    ));
}

#[test]
fn test_frames_iterates_recorded_count() {
    let bytes = pack(&[1, 2, 3, 4, 5, 6, 7, 8]);
    let mut reader = MrawReader::new(MemorySource::new(&bytes), geometry_2x2(), 3);

    assert_eq!(reader.available_frames().unwrap(), 2);

    let frames: Vec<_> = reader.frames().collect();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].as_ref().unwrap().as_slice(), &[1, 2, 3, 4]);
    assert_eq!(frames[1].as_ref().unwrap().as_slice(), &[5, 6, 7, 8]);
    assert!(matches!(frames[2], Err(MrawError::ShortRead { .. })));
}

#[test]
fn test_parallel_decode_matches_sequential() {
    let geometry = FrameGeometry::new(32, 48, 12).unwrap();
    let bytes = pseudo_random_bytes(geometry.frame_byte_size() * 6);
    let indices = [5u64, 0, 3, 3, 1];

    let frames = decode_frames_parallel(&bytes, &geometry, &indices).unwrap();

    let mut reader = MrawReader::new(MemorySource::new(&bytes), geometry, 6);
    for (frame, &index) in frames.iter().zip(indices.iter()) {
        assert_eq!(frame, &reader.decode_frame(index).unwrap());
    }

    assert!(matches!(
        decode_frames_parallel(&bytes, &geometry, &[0, 6]),
        Err(MrawError::ShortRead { .. })
    ));
}

#[test]
fn test_decode_from_file_source() {
    let samples: Vec<u16> = (0..8).map(|i| i * 500).collect();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&pack(&samples)).unwrap();
    file.flush().unwrap();

    let mut source = SeekableSource::open(file.path()).unwrap();
    assert_eq!(source.byte_len().unwrap(), 12);

    let mut reader = MrawReader::new(source, geometry_2x2(), 2);
    let frame = reader.decode_frame(1).unwrap();

    assert_eq!(frame.as_slice(), &[2000, 2500, 3000, 3500]);
    assert_eq!(decode_frame_from_slice(&pack(&samples), &geometry_2x2(), 1).unwrap(), frame);
}

#[test]
fn test_packed_chunk_and_frame_accessors() {
    assert!(matches!(
        PackedChunk::new(vec![0u8; 4]),
        Err(MrawError::Precondition(_))
    ));

    let chunk = PackedChunk::new(pack(&[10, 20, 30, 40, 50, 60])).unwrap();
    assert_eq!(chunk.len(), 9);
    assert!(!chunk.is_empty());
    assert_eq!(chunk.as_bytes(), pack(&[10, 20, 30, 40, 50, 60]));
    assert_eq!(chunk.sample_count(), 6);

    let mut samples = vec![0u16; chunk.sample_count()];
    chunk.unpack_into(&mut samples).unwrap();

    let frame = UnpackedFrame::from_samples(2, 3, samples).unwrap();
    assert_eq!(frame.row(1), &[40, 50, 60]);
    assert_eq!(frame.get(0, 2), Some(30));
    assert_eq!(frame.get(2, 0), None);
    assert_eq!(frame.iter_rows().count(), 2);
    assert_eq!(frame.into_vec(), vec![10, 20, 30, 40, 50, 60]);

    assert!(UnpackedFrame::from_samples(4, 4, vec![0; 6]).is_err());
    assert!(UnpackedFrame::from_samples(0, 4, Vec::new()).is_err());
}
