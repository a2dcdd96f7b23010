//! CIH metadata types

use std::path::Path;

use crate::image_pipeline::cih::{clean::clean_cih, parser::parse_cih_xml};
use crate::image_pipeline::common::error::{MrawError, Result};
use crate::image_pipeline::mraw::FrameGeometry;

/// The handful of sidecar values needed to decode an MRAW file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CihMetadata {
    /// Image height in pixels
    pub rows: u32,
    /// Image width in pixels
    pub columns: u32,
    /// Number of frames stored in the MRAW file
    pub recorded_frames: u32,
    /// Bits per sample (only 12 is decodable)
    pub bit_depth: u32,
    /// Frames per second, when the sidecar records it
    pub record_rate: Option<u32>,
}

impl CihMetadata {
    /// Cleans and parses raw sidecar bytes.
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        parse_cih_xml(&clean_cih(raw)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path)
            .map_err(|e| MrawError::InputReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(&raw)
    }

    /// Frame geometry for the decoder; fails for anything but 12-bit data.
    pub fn geometry(&self) -> Result<FrameGeometry> {
        FrameGeometry::new(self.rows, self.columns, self.bit_depth)
    }
}
