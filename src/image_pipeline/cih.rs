//! CIH sidecar module
//!
//! Cleans the camera information header that accompanies an MRAW file and
//! extracts the geometry and frame count the decoder needs.

mod clean;
mod parser;
pub mod types;


pub use clean::{clean_cih, clean_cih_file};
pub use parser::parse_cih_xml;
pub use types::CihMetadata;
