//! MRAW frame decoding module
//!
//! This module turns packed 12-bit MRAW frames into `u16` sample grids: the
//! unpacking kernel, frame addressing and the byte sources frames are read from.

mod decoder;
mod source;
mod unpack;
pub mod types;

#[cfg(test)]
mod tests;

pub use decoder::{decode_frame_from_slice, decode_frames_parallel, Frames, MrawReader};
pub use source::{ByteSource, MemorySource, SeekableSource};
pub use types::{FrameGeometry, PackedChunk, UnpackedFrame, MAX_SAMPLE_VALUE, SUPPORTED_BIT_DEPTH};
pub use unpack::{unpack_12bit, unpack_12bit_to_vec, BYTES_PER_TRIPLET, SAMPLES_PER_TRIPLET};
