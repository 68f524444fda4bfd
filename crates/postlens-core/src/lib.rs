//! Core library for postlens.
//!
//! This crate provides:
//! - Media-type routing of submitted files to a text-extraction backend
//! - PDF text extraction (page by page, with progress)
//! - OCR of images through a lazily-loaded recognizer engine
//! - Heuristic social-post suggestions for the extracted text
//! - The session state machine a presentation layer renders

pub mod error;
pub mod export;
pub mod models;
pub mod ocr;
pub mod orchestrator;
pub mod pdf;
pub mod router;
pub mod session;
pub mod suggest;

pub use error::{
    BackendError, ConfigError, ExtractionError, OcrError, PdfError, PostlensError, Result,
    RouteError, SessionError,
};
pub use export::{TextSink, WriterSink};
pub use models::{
    ExtractedDocument, ExtractionProgress, OcrConfig, PdfConfig, PostlensConfig, SubmittedFile,
    SuggestionConfig,
};
pub use ocr::{Recognizer, RecognizerEvent, RecognizerFactory, RecognizerPhase};
pub use orchestrator::{ExtractionOrchestrator, NoProgress, ProgressSink};
pub use pdf::{LopdfBackend, PdfBackend, PdfDocument, TextItem};
pub use router::{media_type_for_path, route, Backend};
pub use session::{Phase, SessionState, Submission, Ticket};
pub use suggest::{analyze, Suggestion, SuggestionEngine, SuggestionStyle};

#[cfg(feature = "native")]
pub use ocr::PureOcrFactory;

/// Orchestrator backed by the bundled ONNX recognizer and `lopdf`.
#[cfg(feature = "native")]
pub type NativeOrchestrator = ExtractionOrchestrator<PureOcrFactory, LopdfBackend>;
