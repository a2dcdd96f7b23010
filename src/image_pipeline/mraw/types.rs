//! MRAW frame data types

use crate::image_pipeline::common::error::{MrawError, Result};
use crate::image_pipeline::mraw::unpack::{self, BYTES_PER_TRIPLET, SAMPLES_PER_TRIPLET};

/// The only bit depth this decoder understands.
pub const SUPPORTED_BIT_DEPTH: u32 = 12;

/// Largest value a 12-bit sample can hold.
pub const MAX_SAMPLE_VALUE: u16 = 0x0FFF;

/// Shape of every frame in an MRAW file, as described by its CIH sidecar.
///
/// Construction goes through [`FrameGeometry::new`], so a value of this type
/// always has non-zero dimensions, an even pixel count and a 12-bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    rows: u32,
    columns: u32,
    bit_depth: u32,
}

impl FrameGeometry {
    /// Validates and builds a frame geometry.
    ///
    /// # Errors
    ///
    /// * `UnsupportedFormat` - `bit_depth` is anything but 12
    /// * `InvalidDimensions` - `rows` or `columns` is zero
    /// * `Precondition` - `rows * columns` is odd, so the last sample would
    ///   not fill a whole byte triplet
    pub fn new(rows: u32, columns: u32, bit_depth: u32) -> Result<Self> {
        if bit_depth != SUPPORTED_BIT_DEPTH {
            return Err(MrawError::UnsupportedFormat(format!(
                "{}-bit MRAW data (only {}-bit packed frames are supported)",
                bit_depth, SUPPORTED_BIT_DEPTH
            )));
        }

        if rows == 0 || columns == 0 {
            return Err(MrawError::InvalidDimensions(rows, columns));
        }

        let pixels = rows as u64 * columns as u64;
        if pixels % SAMPLES_PER_TRIPLET as u64 != 0 {
            return Err(MrawError::Precondition(format!(
                "{}x{} frame has an odd pixel count ({}), 12-bit packing needs whole byte triplets",
                rows, columns, pixels
            )));
        }

        Ok(Self {
            rows,
            columns,
            bit_depth,
        })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    /// Number of samples in one frame.
    pub fn pixel_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Bytes occupied by one packed frame: `rows * columns * 3 / 2`.
    pub fn frame_byte_size(&self) -> usize {
        self.pixel_count() / SAMPLES_PER_TRIPLET * BYTES_PER_TRIPLET
    }

    /// Byte offset of frame `frame_index` from the start of the MRAW stream.
    ///
    /// Frames have no header or padding, so this is simply
    /// `frame_byte_size * frame_index`. An offset that does not fit in a
    /// `u64` cannot exist in any source and is reported as a short read.
    pub fn frame_offset(&self, frame_index: u64) -> Result<u64> {
        let frame_bytes = self.frame_byte_size();
        (frame_bytes as u64)
            .checked_mul(frame_index)
            .ok_or(MrawError::ShortRead {
                offset: u64::MAX,
                expected: frame_bytes,
                available: 0,
            })
    }
}

/// One frame worth of packed 12-bit data, three bytes per two samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedChunk {
    bytes: Vec<u8>,
}

impl PackedChunk {
    /// Wraps `bytes`, refusing buffers that are not a whole number of triplets.
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() % BYTES_PER_TRIPLET != 0 {
            return Err(MrawError::Precondition(format!(
                "packed chunk of {} bytes is not a multiple of {}",
                bytes.len(),
                BYTES_PER_TRIPLET
            )));
        }
        Ok(Self { bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of samples this chunk unpacks to.
    pub fn sample_count(&self) -> usize {
        self.bytes.len() / BYTES_PER_TRIPLET * SAMPLES_PER_TRIPLET
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Resizes the chunk to exactly `geometry.frame_byte_size()` bytes.
    pub(crate) fn resize_for(&mut self, geometry: &FrameGeometry) {
        self.bytes.resize(geometry.frame_byte_size(), 0);
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Unpacks into a caller-owned sample buffer.
    pub fn unpack_into<'a>(&self, out: &'a mut [u16]) -> Result<&'a mut [u16]> {
        unpack::unpack_12bit(&self.bytes, out)
    }
}

/// A decoded frame: `rows x columns` samples in row-major order, each in
/// `[0, 4095]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedFrame {
    rows: usize,
    columns: usize,
    data: Vec<u16>,
}

impl UnpackedFrame {
    /// A zero-filled frame sized for `geometry`, suitable for
    /// [`MrawReader::decode_frame_into`](crate::image_pipeline::MrawReader::decode_frame_into).
    pub fn zeroed(geometry: &FrameGeometry) -> Self {
        Self {
            rows: geometry.rows() as usize,
            columns: geometry.columns() as usize,
            data: vec![0u16; geometry.pixel_count()],
        }
    }

    /// Reshapes a flat sample vector into a frame.
    pub fn from_samples(rows: usize, columns: usize, data: Vec<u16>) -> Result<Self> {
        if rows == 0 || columns == 0 || rows.checked_mul(columns) != Some(data.len()) {
            return Err(MrawError::Precondition(format!(
                "{} samples cannot be shaped as {}x{}",
                data.len(),
                rows,
                columns
            )));
        }
        Ok(Self {
            rows,
            columns,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> Option<u16> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.data.get(row * self.columns + column).copied()
    }

    /// One row of samples.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.rows()`.
    pub fn row(&self, row: usize) -> &[u16] {
        let start = row * self.columns;
        &self.data[start..start + self.columns]
    }

    pub fn iter_rows(&self) -> std::slice::ChunksExact<'_, u16> {
        self.data.chunks_exact(self.columns)
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u16] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u16> {
        self.data
    }

    pub fn matches(&self, geometry: &FrameGeometry) -> bool {
        self.rows == geometry.rows() as usize && self.columns == geometry.columns() as usize
    }
}
