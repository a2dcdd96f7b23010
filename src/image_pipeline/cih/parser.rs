use roxmltree::{Document, Node};
use tracing::debug;

use crate::image_pipeline::cih::types::CihMetadata;
use crate::image_pipeline::common::error::{MrawError, Result};

const RECORDED_FRAMES: &[&str] = &["frameInfo", "recordedFrame"];
const RECORD_RATE: &[&str] = &["frameInfo", "recordRate"];
const HEIGHT: &[&str] = &["imageFileInfo", "resolution", "height"];
const WIDTH: &[&str] = &["imageFileInfo", "resolution", "width"];
const BIT_DEPTH: &[&str] = &["imageDataInfo", "colorInfo", "bit"];

/// Extracts the decoding parameters from a cleaned CIH document.
///
/// Only the frame count, resolution and bit depth are required. The record
/// rate is picked up when present and parseable.
pub fn parse_cih_xml(xml: &str) -> Result<CihMetadata> {
    let doc = Document::parse(xml)
        .map_err(|e| MrawError::Metadata(format!("malformed CIH XML: {}", e)))?;
    let root = doc.root_element();

    let metadata = CihMetadata {
        rows: required_u32(root, HEIGHT)?,
        columns: required_u32(root, WIDTH)?,
        recorded_frames: required_u32(root, RECORDED_FRAMES)?,
        bit_depth: required_u32(root, BIT_DEPTH)?,
        record_rate: find(root, RECORD_RATE)
            .and_then(|node| node.text())
            .and_then(|text| text.trim().parse().ok()),
    };

    debug!(?metadata, "Parsed CIH metadata");
    Ok(metadata)
}

fn find<'a, 'input>(root: Node<'a, 'input>, path: &[&str]) -> Option<Node<'a, 'input>> {
    path.iter().try_fold(root, |node, name| {
        node.children().find(|child| child.has_tag_name(*name))
    })
}

fn required_u32(root: Node<'_, '_>, path: &[&str]) -> Result<u32> {
    let node = find(root, path)
        .ok_or_else(|| MrawError::Metadata(format!("missing <{}>", path.join("/"))))?;
    let text = node.text().unwrap_or("").trim();

    text.parse().map_err(|e| {
        MrawError::Metadata(format!("<{}> value {:?}: {}", path.join("/"), text, e))
    })
}
