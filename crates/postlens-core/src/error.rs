//! Error types for the postlens-core library.

use thiserror::Error;

/// Main error type for the postlens library.
#[derive(Error, Debug)]
pub enum PostlensError {
    /// The submitted file cannot be routed to any backend.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A backend failed to produce text.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The session rejected a transition.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the file-type router.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The declared media type is neither a PDF nor an image.
    #[error("unsupported media type: {media_type:?}")]
    UnsupportedType { media_type: String },
}

/// Generic extraction failure.
///
/// Callers only learn that extraction failed; the backend-specific cause is
/// kept as the error source for logging.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("extraction failed")]
    Failed {
        #[source]
        source: BackendError,
    },
}

impl ExtractionError {
    /// Backend-level cause of the failure.
    pub fn cause(&self) -> &BackendError {
        match self {
            ExtractionError::Failed { source } => source,
        }
    }
}

impl From<BackendError> for ExtractionError {
    fn from(source: BackendError) -> Self {
        ExtractionError::Failed { source }
    }
}

macro_rules! extraction_failure_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ExtractionError {
                fn from(err: $ty) -> Self {
                    ExtractionError::Failed { source: BackendError::from(err) }
                }
            }
        )*
    };
}

extraction_failure_from!(PdfError, OcrError, image::ImageError, std::io::Error);

/// Backend-specific failure causes.
#[derive(Error, Debug)]
pub enum BackendError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error while reading the payload.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The worker running the backend stopped before returning.
    #[error("extraction worker stopped: {0}")]
    Worker(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from a page.
    #[error("failed to extract text from page {page}: {reason}")]
    TextExtraction { page: u32, reason: String },

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The requested recognition language has no model.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),
}

/// Errors raised by session transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// An extraction is still in flight.
    #[error("an extraction is already in progress")]
    Busy,
}

/// Errors loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported OCR language: {0} (only \"eng\" is available)")]
    UnsupportedLanguage(String),
}

/// Result type for the postlens library.
pub type Result<T> = std::result::Result<T, PostlensError>;
