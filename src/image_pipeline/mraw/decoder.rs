//! Frame addressing and decoding.
//!
//! An MRAW stream is a bare sequence of equally sized packed frames, so frame
//! `n` lives at `n * frame_byte_size` and nothing else needs to be parsed.

use std::fs::File;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::image_pipeline::cih::CihMetadata;
use crate::image_pipeline::common::error::{MrawError, Result};
use crate::image_pipeline::mraw::source::{ByteSource, MemorySource, SeekableSource};
use crate::image_pipeline::mraw::types::{FrameGeometry, PackedChunk, UnpackedFrame};
use crate::image_pipeline::mraw::unpack;

/// Decodes frames from a byte source of known geometry.
///
/// The reader keeps one packed scratch buffer between calls so decoding a
/// sequence of frames does not reallocate it. Results depend only on the
/// source contents, the geometry and the frame index.
pub struct MrawReader<S: ByteSource> {
    source: S,
    geometry: FrameGeometry,
    recorded_frames: u32,
    packed: PackedChunk,
}

impl MrawReader<SeekableSource<File>> {
    /// Opens an MRAW file using the geometry recorded in its CIH sidecar.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mraw_rs::image_pipeline::MrawReader;
    ///
    /// let mut reader = MrawReader::open("shot.cih", "shot.mraw").unwrap();
    /// let first = reader.decode_frame(0).unwrap();
    /// println!("{}x{}", first.rows(), first.columns());
    /// ```
    #[instrument(skip(cih_path, mraw_path))]
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(cih_path: P, mraw_path: Q) -> Result<Self> {
        let metadata = CihMetadata::from_file(cih_path.as_ref())?;
        let geometry = metadata.geometry()?;

        info!(
            mraw = %mraw_path.as_ref().display(),
            rows = geometry.rows(),
            columns = geometry.columns(),
            recorded_frames = metadata.recorded_frames,
            "Opening MRAW file"
        );

        let source = SeekableSource::open(mraw_path)?;
        Ok(Self::new(source, geometry, metadata.recorded_frames))
    }
}

impl<S: ByteSource> MrawReader<S> {
    pub fn new(source: S, geometry: FrameGeometry, recorded_frames: u32) -> Self {
        Self {
            source,
            geometry,
            recorded_frames,
            packed: PackedChunk::default(),
        }
    }

    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    /// Frame count reported by the sidecar.
    pub fn recorded_frames(&self) -> u32 {
        self.recorded_frames
    }

    /// Number of whole frames actually present in the source.
    pub fn available_frames(&mut self) -> Result<u64> {
        Ok(self.source.byte_len()? / self.geometry.frame_byte_size() as u64)
    }

    /// Decodes frame `frame_index` into a freshly allocated frame.
    pub fn decode_frame(&mut self, frame_index: u64) -> Result<UnpackedFrame> {
        let mut frame = UnpackedFrame::zeroed(&self.geometry);
        self.decode_frame_into(frame_index, &mut frame)?;
        Ok(frame)
    }

    /// Decodes frame `frame_index` into `frame`, reusing its allocation.
    ///
    /// `frame` must have this reader's dimensions. On any error it is left
    /// exactly as it was.
    #[instrument(skip(self, frame), fields(frame_bytes = self.geometry.frame_byte_size()))]
    pub fn decode_frame_into(&mut self, frame_index: u64, frame: &mut UnpackedFrame) -> Result<()> {
        if !frame.matches(&self.geometry) {
            return Err(MrawError::Precondition(format!(
                "output frame is {}x{}, reader geometry is {}x{}",
                frame.rows(),
                frame.columns(),
                self.geometry.rows(),
                self.geometry.columns()
            )));
        }

        let offset = self.geometry.frame_offset(frame_index)?;
        debug!(offset, "Reading packed frame");

        self.packed.resize_for(&self.geometry);
        self.source.read_exact_at(offset, self.packed.as_mut_bytes())?;
        self.packed.unpack_into(frame.as_mut_slice())?;

        Ok(())
    }

    /// Iterates over every recorded frame in order.
    pub fn frames(&mut self) -> Frames<'_, S> {
        let end = self.recorded_frames as u64;
        Frames {
            reader: self,
            next: 0,
            end,
        }
    }
}

/// Iterator returned by [`MrawReader::frames`].
pub struct Frames<'a, S: ByteSource> {
    reader: &'a mut MrawReader<S>,
    next: u64,
    end: u64,
}

impl<S: ByteSource> Iterator for Frames<'_, S> {
    type Item = Result<UnpackedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.reader.decode_frame(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}

/// Decodes one frame straight out of an in-memory MRAW buffer.
pub fn decode_frame_from_slice(
    bytes: &[u8],
    geometry: &FrameGeometry,
    frame_index: u64,
) -> Result<UnpackedFrame> {
    let offset = geometry.frame_offset(frame_index)?;
    let packed = MemorySource::new(bytes).slice_at(offset, geometry.frame_byte_size())?;
    let samples = unpack::unpack_12bit_to_vec(packed)?;
    UnpackedFrame::from_samples(geometry.rows() as usize, geometry.columns() as usize, samples)
}

/// Decodes several frames of one shared buffer concurrently.
///
/// Frames come back in the order of `frame_indices`. Any failing index fails
/// the whole call.
#[instrument(skip(bytes, geometry, frame_indices), fields(frames = frame_indices.len()))]
pub fn decode_frames_parallel(
    bytes: &[u8],
    geometry: &FrameGeometry,
    frame_indices: &[u64],
) -> Result<Vec<UnpackedFrame>> {
    frame_indices
        .par_iter()
        .map(|&index| decode_frame_from_slice(bytes, geometry, index))
        .collect()
}
