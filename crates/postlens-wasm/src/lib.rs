//! WASM bindings for postlens.
//!
//! The browser host runs its own OCR; PDF text extraction, suggestions and
//! the session state machine run here.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use postlens_core::pdf::{self, PdfBackend, PdfDocument};
use postlens_core::{
    route, ExtractedDocument, ExtractionError, ExtractionProgress, LopdfBackend, OcrError,
    SessionState, Submission, SuggestionEngine, SuggestionStyle, Ticket,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn style_for(decorated: bool) -> SuggestionStyle {
    if decorated {
        SuggestionStyle::Decorated
    } else {
        SuggestionStyle::Plain
    }
}

/// Suggestions for `text`, as an array of strings.
#[wasm_bindgen]
pub fn analyze_text(text: &str, decorated: bool) -> Result<JsValue, JsValue> {
    let suggestions = SuggestionEngine::new()
        .with_style(style_for(decorated))
        .analyze(text);
    to_js(&suggestions)
}

/// Backend name (`"pdf"` or `"ocr"`) for a media type.
#[wasm_bindgen]
pub fn route_media_type(media_type: &str) -> Result<String, JsValue> {
    route(media_type)
        .map(|backend| backend.to_string())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn read_pdf(bytes: &[u8]) -> Result<(String, u32), ExtractionError> {
    let document = LopdfBackend::new().open(bytes)?;
    let text = pdf::read_all_pages(&document, None)?;
    Ok((text, document.page_count()))
}

/// Text of every page of a PDF, each page prefixed with a newline.
#[wasm_bindgen]
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, JsValue> {
    read_pdf(bytes)
        .map(|(text, _)| text)
        .map_err(|e| JsValue::from_str(&format!("{}: {}", e, e.cause())))
}

/// Document-analysis session for browser use.
///
/// `submit` returns a numeric handle; pass it back with progress and results
/// so late events from a superseded submission are ignored.
#[wasm_bindgen]
pub struct Session {
    state: SessionState,
    engine: SuggestionEngine,
    current: Option<(u32, Ticket)>,
    next_handle: u32,
}

impl Session {
    fn ticket(&self, handle: u32) -> Option<Ticket> {
        match self.current {
            Some((current, ticket)) if current == handle => Some(ticket),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct Started<'a> {
    handle: u32,
    backend: &'a str,
}

#[wasm_bindgen]
impl Session {
    /// Create an idle session.
    #[wasm_bindgen(constructor)]
    pub fn new(decorated: bool) -> Self {
        Self {
            state: SessionState::new(),
            engine: SuggestionEngine::new().with_style(style_for(decorated)),
            current: None,
            next_handle: 0,
        }
    }

    /// Submit a file by name and media type.
    ///
    /// Returns `{ handle, backend }`, or `null` when the type was rejected.
    /// Throws while another submission is still running.
    #[wasm_bindgen]
    pub fn submit(&mut self, file_name: &str, media_type: &str) -> Result<JsValue, JsValue> {
        let submission = self
            .state
            .submit(file_name, media_type)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        match submission {
            Submission::Started { ticket, backend } => {
                self.next_handle = self.next_handle.wrapping_add(1);
                self.current = Some((self.next_handle, ticket));
                let backend = backend.to_string();
                to_js(&Started {
                    handle: self.next_handle,
                    backend: &backend,
                })
            }
            Submission::Rejected(_) => {
                self.current = None;
                Ok(JsValue::NULL)
            }
        }
    }

    /// Record OCR progress as a fraction between 0 and 1.
    #[wasm_bindgen]
    pub fn report_progress(&mut self, handle: u32, fraction: f64) -> bool {
        match self.ticket(handle) {
            Some(ticket) => self
                .state
                .report_progress(ticket, ExtractionProgress::from_fraction(fraction)),
            None => false,
        }
    }

    /// Finish a submission with text recognized by the host.
    #[wasm_bindgen]
    pub fn complete_recognized(&mut self, handle: u32, text: &str) -> bool {
        match self.ticket(handle) {
            Some(ticket) => {
                self.state
                    .complete(ticket, ExtractedDocument::recognized(text), &self.engine)
            }
            None => false,
        }
    }

    /// Finish a PDF submission by extracting `bytes` here.
    #[wasm_bindgen]
    pub fn complete_pdf(&mut self, handle: u32, bytes: &[u8]) -> bool {
        let Some(ticket) = self.ticket(handle) else {
            return false;
        };
        match read_pdf(bytes) {
            Ok((text, pages)) => {
                self.state
                    .complete(ticket, ExtractedDocument::from_pdf(text, pages), &self.engine)
            }
            Err(err) => self.state.fail(ticket, &err),
        }
    }

    /// Record a host-side OCR failure.
    #[wasm_bindgen]
    pub fn fail(&mut self, handle: u32, reason: &str) -> bool {
        match self.ticket(handle) {
            Some(ticket) => {
                let err = ExtractionError::from(OcrError::Recognition(reason.to_string()));
                self.state.fail(ticket, &err)
            }
            None => false,
        }
    }

    /// Return to idle, discarding any in-flight submission.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.state.reset();
        self.current = None;
    }

    /// Extracted text, if any.
    #[wasm_bindgen]
    pub fn text(&self) -> Option<String> {
        self.state.text().map(str::to_string)
    }

    /// Current session state as a plain object.
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state)
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_route_media_type() {
        assert_eq!(route_media_type("application/pdf").unwrap(), "pdf");
        assert_eq!(route_media_type("image/webp").unwrap(), "ocr");
        assert!(route_media_type("text/plain").is_err());
    }

    #[wasm_bindgen_test]
    fn test_extract_pdf_text_rejects_garbage() {
        assert!(extract_pdf_text(b"not a pdf").is_err());
    }

    #[wasm_bindgen_test]
    fn test_session_recognized_flow() {
        let mut session = Session::new(false);
        assert!(!session.submit("shot.png", "image/png").unwrap().is_null());
        let handle = session.next_handle;

        assert!(session.report_progress(handle, 0.5));
        assert!(session.complete_recognized(handle, "hello #world"));
        assert_eq!(session.text().as_deref(), Some("hello #world"));
    }

    #[wasm_bindgen_test]
    fn test_session_ignores_stale_handle() {
        let mut session = Session::new(false);
        session.submit("a.png", "image/png").unwrap();
        let old = session.next_handle;
        session.reset();
        session.submit("b.png", "image/png").unwrap();

        assert!(!session.complete_recognized(old, "late"));
        assert!(session.text().is_none());
    }

    #[wasm_bindgen_test]
    fn test_session_rejects_unsupported_type() {
        let mut session = Session::new(false);
        assert!(session.submit("notes.txt", "text/plain").unwrap().is_null());
        assert!(!session.fail(1, "boom"));
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod native_tests {
    use super::*;

    fn session_with_image() -> (Session, u32) {
        let mut session = Session::new(false);
        let ticket = match session.state.submit("a.png", "image/png").unwrap() {
            Submission::Started { ticket, .. } => ticket,
            Submission::Rejected(err) => panic!("unexpected rejection: {err}"),
        };
        session.current = Some((1, ticket));
        (session, 1)
    }

    #[test]
    fn test_host_progress_never_decreases() {
        let (mut session, handle) = session_with_image();

        assert!(session.report_progress(handle, 0.8));
        assert!(!session.report_progress(handle, 0.2));
        assert_eq!(session.state.progress.percent(), 80);
        assert!(session.report_progress(handle, 1.0));
        assert_eq!(session.state.progress.percent(), 100);
    }

    #[test]
    fn test_unknown_handle_ignored() {
        let (mut session, handle) = session_with_image();

        assert!(!session.report_progress(handle + 1, 0.5));
        assert!(!session.complete_recognized(handle + 1, "late"));
        assert!(session.complete_recognized(handle, "hello"));
        assert_eq!(session.text().as_deref(), Some("hello"));
    }
}
