//! Data model and configuration.

pub mod config;
pub mod document;

pub use config::{OcrConfig, PdfConfig, PostlensConfig, SuggestionConfig};
pub use document::{ExtractedDocument, ExtractionProgress, Payload, SubmittedFile};
