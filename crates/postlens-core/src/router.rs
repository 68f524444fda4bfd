//! Media-type based backend selection.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RouteError;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
const IMAGE_PREFIX: &str = "image/";
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Extraction backend chosen for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// PDF text-layer reader.
    Pdf,
    /// Image-to-text recognizer.
    Ocr,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Pdf => write!(f, "pdf"),
            Backend::Ocr => write!(f, "ocr"),
        }
    }
}

/// Select the backend for a declared media type.
pub fn route(media_type: &str) -> Result<Backend, RouteError> {
    if media_type == PDF_MEDIA_TYPE {
        Ok(Backend::Pdf)
    } else if media_type.starts_with(IMAGE_PREFIX) {
        Ok(Backend::Ocr)
    } else {
        Err(RouteError::UnsupportedType {
            media_type: media_type.to_string(),
        })
    }
}

/// Guess a media type from a file extension.
///
/// Unknown extensions map to `application/octet-stream`, which [`route`]
/// rejects.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => PDF_MEDIA_TYPE,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        _ => FALLBACK_MEDIA_TYPE,
    }
}
