//! Reader for Photron MRAW high-speed video files.
//!
//! Frames are stored as packed 12-bit samples and described by a CIH
//! sidecar. [`image_pipeline::MrawReader`] decodes them into `u16` grids.

pub mod image_pipeline;
pub mod logger;
