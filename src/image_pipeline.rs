//! MRAW decoding pipeline module
//!
//! This module is split into CIH sidecar parsing and MRAW frame decoding.

pub mod cih;
pub mod mraw;
pub mod common;

pub use common::{
    MrawError,
    Result,
};

pub use cih::{
    CihMetadata,
    clean_cih,
    clean_cih_file,
    parse_cih_xml,
};

pub use mraw::{
    FrameGeometry,
    PackedChunk,
    UnpackedFrame,
    MrawReader,
    ByteSource,
    MemorySource,
    SeekableSource,
    unpack_12bit,
    decode_frame_from_slice,
    decode_frames_parallel,
};
