//! Document-level data model shared by the pipeline stages.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::router::Backend;

/// Where a submitted file's bytes come from.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Bytes already held in memory (drag-and-drop, wasm hosts).
    Memory(Vec<u8>),
    /// A file read lazily when extraction starts.
    Path(PathBuf),
}

/// A file handed to the pipeline by the presentation layer.
#[derive(Debug, Clone)]
pub struct SubmittedFile {
    /// Display name (no directories).
    pub name: String,
    /// Declared media type, e.g. `application/pdf` or `image/png`.
    pub media_type: String,
    payload: Payload,
}

impl SubmittedFile {
    /// Create a file from in-memory bytes.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            payload: Payload::Memory(bytes),
        }
    }

    /// Create a file backed by a path on disk.
    pub fn from_path(
        name: impl Into<String>,
        media_type: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            payload: Payload::Path(path.into()),
        }
    }

    /// Read the payload.
    pub fn bytes(&self) -> std::io::Result<Cow<'_, [u8]>> {
        match &self.payload {
            Payload::Memory(bytes) => Ok(Cow::Borrowed(bytes)),
            Payload::Path(path) => std::fs::read(path).map(Cow::Owned),
        }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// Extraction progress as a whole percentage in `[0, 100]`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "u8", into = "u8")]
pub struct ExtractionProgress(u8);

impl From<u8> for ExtractionProgress {
    fn from(percent: u8) -> Self {
        Self::new(percent)
    }
}

impl From<ExtractionProgress> for u8 {
    fn from(progress: ExtractionProgress) -> Self {
        progress.0
    }
}

impl ExtractionProgress {
    pub const ZERO: Self = Self(0);
    pub const COMPLETE: Self = Self(100);

    /// Create a progress value, clamping to 100.
    pub fn new(percent: u8) -> Self {
        Self(percent.min(100))
    }

    /// Convert a backend fraction (nominally 0.0 - 1.0) to a percentage.
    ///
    /// Out-of-range and non-finite fractions are clamped.
    pub fn from_fraction(fraction: f64) -> Self {
        if !fraction.is_finite() {
            return Self::ZERO;
        }
        let percent = (fraction * 100.0).round().clamp(0.0, 100.0);
        Self(percent as u8)
    }

    /// Progress after `done` of `total` steps.
    pub fn from_steps(done: u32, total: u32) -> Self {
        if total == 0 {
            return Self::COMPLETE;
        }
        Self::from_fraction(f64::from(done.min(total)) / f64::from(total))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    pub fn is_complete(self) -> bool {
        self.0 == 100
    }
}

impl fmt::Display for ExtractionProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Text produced by one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Extracted text, possibly empty.
    pub text: String,
    /// Backend that produced the text.
    pub backend: Backend,
    /// Number of pages read (PDF only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

impl ExtractedDocument {
    /// Document produced by the OCR backend.
    pub fn recognized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            backend: Backend::Ocr,
            page_count: None,
        }
    }

    /// Document produced by the PDF backend.
    pub fn from_pdf(text: impl Into<String>, page_count: u32) -> Self {
        Self {
            text: text.into(),
            backend: Backend::Pdf,
            page_count: Some(page_count),
        }
    }

    /// Whether the document carries no visible text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
