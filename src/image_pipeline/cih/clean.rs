use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::image_pipeline::common::error::{MrawError, Result};

/// Line that ends the CIH document; anything after it is padding.
const CLOSING_TAG: &str = "</cih>";

/// Turns raw CIH sidecar bytes into a well-formed XML document.
///
/// Photron sidecars carry binary junk in front of the first tag and padding
/// after the closing `</cih>`. The first line keeps only what follows its
/// last `<`, then lines are copied up to and including the one starting with
/// `</cih>`. Invalid UTF-8 is replaced rather than rejected.
pub fn clean_cih(raw: &[u8]) -> Result<String> {
    let text = String::from_utf8_lossy(raw);
    let mut lines = text.lines();

    let first = lines
        .next()
        .ok_or_else(|| MrawError::Metadata("CIH file is empty".to_string()))?;
    let first_tag = match first.rfind('<') {
        Some(pos) => &first[pos + 1..],
        None => first,
    };

    let mut cleaned = String::with_capacity(text.len());
    cleaned.push('<');
    cleaned.push_str(first_tag);
    cleaned.push('\n');

    for line in lines {
        cleaned.push_str(line);
        cleaned.push('\n');
        if line.starts_with(CLOSING_TAG) {
            debug!(bytes = cleaned.len(), "Cleaned CIH document");
            return Ok(cleaned);
        }
    }

    Err(MrawError::Metadata(format!(
        "no line starting with {} found",
        CLOSING_TAG
    )))
}

/// Cleans a sidecar on disk and writes the result next to it with an `.xml`
/// extension. Returns the path of the written file.
#[instrument(skip(cih_path), fields(cih = %cih_path.as_ref().display()))]
pub fn clean_cih_file<P: AsRef<Path>>(cih_path: P) -> Result<PathBuf> {
    let cih_path = cih_path.as_ref();
    let xml_path = cih_path.with_extension("xml");
    if xml_path == cih_path {
        return Err(MrawError::Precondition(format!(
            "{} already has an .xml extension, refusing to overwrite it",
            cih_path.display()
        )));
    }

    let raw = std::fs::read(cih_path)
        .map_err(|e| MrawError::InputReadError(format!("{}: {}", cih_path.display(), e)))?;
    let cleaned = clean_cih(&raw)?;

    std::fs::write(&xml_path, cleaned)
        .map_err(|e| MrawError::OutputWriteError(format!("{}: {}", xml_path.display(), e)))?;

    debug!(xml = %xml_path.display(), "Wrote cleaned CIH");
    Ok(xml_path)
}
