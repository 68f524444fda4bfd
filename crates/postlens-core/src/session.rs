//! Observable state of one document-analysis session.
//!
//! ```text
//! Idle -> Submitting -> Extracting -> Analyzing -> Done
//!                  \            \
//!                   `-> Failed   `-> Failed
//! ```
//!
//! Every accepted submission gets a [`Ticket`]. Progress, completion and
//! failure events carry the ticket and are ignored once a reset or a newer
//! submission has superseded it.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ExtractionError, RouteError, SessionError};
use crate::models::{ExtractedDocument, ExtractionProgress, SubmittedFile};
use crate::router::{self, Backend};
use crate::suggest::SuggestionEngine;

/// Message shown when the media type is neither a PDF nor an image.
pub const UNSUPPORTED_TYPE_MESSAGE: &str = "Unsupported file type. Upload PDF or an image.";

/// Message shown for any extraction failure.
pub const EXTRACTION_FAILED_MESSAGE: &str = "An error occurred while processing the file.";

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Extracting,
    Analyzing,
    Done,
    Failed,
}

/// Identifies one accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Outcome of [`SessionState::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Routed; run `backend` and report back with `ticket`.
    Started { ticket: Ticket, backend: Backend },
    /// The media type was rejected; the session is now `Failed`.
    Rejected(RouteError),
}

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionState {
    pub phase: Phase,
    pub loading: bool,
    pub progress: ExtractionProgress,
    pub document: Option<ExtractedDocument>,
    pub file_name: Option<String>,
    pub suggestions: Vec<String>,
    pub error: Option<String>,
    #[serde(skip)]
    generation: u64,
    #[serde(skip)]
    in_flight: Option<Ticket>,
}

impl SessionState {
    /// Create an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return to `Idle`, discarding any result, error or in-flight run.
    pub fn reset(&mut self) {
        let generation = self.generation + 1;
        *self = Self {
            generation,
            ..Self::default()
        };
    }

    /// Start a new submission for a file called `file_name` with the
    /// declared `media_type`.
    ///
    /// Rejected with [`SessionError::Busy`] while an extraction is running;
    /// the state is left untouched in that case.
    pub fn submit(&mut self, file_name: &str, media_type: &str) -> Result<Submission, SessionError> {
        if self.in_flight.is_some() {
            return Err(SessionError::Busy);
        }

        self.reset();
        self.phase = Phase::Submitting;
        self.file_name = Some(file_name.to_string());
        self.loading = true;

        match router::route(media_type) {
            Ok(backend) => {
                let ticket = Ticket(self.generation);
                self.phase = Phase::Extracting;
                self.in_flight = Some(ticket);
                debug!("Submitted {} ({}) -> {}", file_name, media_type, backend);
                Ok(Submission::Started { ticket, backend })
            }
            Err(err) => {
                warn!("Rejected {}: {}", file_name, err);
                self.phase = Phase::Failed;
                self.loading = false;
                self.error = Some(UNSUPPORTED_TYPE_MESSAGE.to_string());
                Ok(Submission::Rejected(err))
            }
        }
    }

    /// [`SessionState::submit`] using the file's own name and media type.
    pub fn submit_file(&mut self, file: &SubmittedFile) -> Result<Submission, SessionError> {
        self.submit(&file.name, &file.media_type)
    }

    /// Record backend progress. Returns whether the update was applied.
    ///
    /// Progress never moves backwards within a run; lower values are dropped.
    pub fn report_progress(&mut self, ticket: Ticket, progress: ExtractionProgress) -> bool {
        if !self.is_current(ticket) || progress < self.progress {
            return false;
        }
        self.progress = progress;
        true
    }

    /// Store the extracted document and its suggestions.
    ///
    /// Returns `false` and changes nothing if `ticket` is stale.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        document: ExtractedDocument,
        engine: &SuggestionEngine,
    ) -> bool {
        if !self.is_current(ticket) {
            debug!("Discarding stale extraction result");
            return false;
        }

        self.phase = Phase::Analyzing;
        self.suggestions = engine.analyze(&document.text);
        self.document = Some(document);
        self.finish(Phase::Done);
        true
    }

    /// Record an extraction failure.
    ///
    /// Only the generic message is stored; the cause is logged.
    pub fn fail(&mut self, ticket: Ticket, error: &ExtractionError) -> bool {
        if !self.is_current(ticket) {
            debug!("Discarding stale extraction failure");
            return false;
        }

        warn!("Extraction failed: {}", error.cause());
        self.error = Some(EXTRACTION_FAILED_MESSAGE.to_string());
        self.finish(Phase::Failed);
        true
    }

    /// Extracted text, for clipboard export.
    pub fn text(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.text.as_str())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Done | Phase::Failed)
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.in_flight == Some(ticket) && self.phase == Phase::Extracting
    }

    fn finish(&mut self, phase: Phase) {
        self.phase = phase;
        self.loading = false;
        self.progress = ExtractionProgress::ZERO;
        self.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, PdfError};
    use pretty_assertions::assert_eq;

    fn started(submission: Submission) -> Ticket {
        match submission {
            Submission::Started { ticket, .. } => ticket,
            Submission::Rejected(err) => panic!("unexpected rejection: {err}"),
        }
    }

    fn failure() -> ExtractionError {
        ExtractionError::from(BackendError::Pdf(PdfError::Parse("bad xref".to_string())))
    }

    #[test]
    fn test_initial_state() {
        let state = SessionState::new();
        assert_eq!(state.phase, Phase::Idle);
        assert!(!state.loading);
        assert_eq!(state.progress, ExtractionProgress::ZERO);
        assert!(state.document.is_none());
        assert!(state.file_name.is_none());
        assert!(state.suggestions.is_empty());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_submit_routes_and_starts_loading() {
        let mut state = SessionState::new();
        let submission = state.submit("deck.pdf", "application/pdf").unwrap();

        assert!(matches!(
            submission,
            Submission::Started { backend: Backend::Pdf, .. }
        ));
        assert_eq!(state.phase, Phase::Extracting);
        assert!(state.loading);
        assert_eq!(state.file_name.as_deref(), Some("deck.pdf"));
    }

    #[test]
    fn test_submit_file_uses_declared_type() {
        let mut state = SessionState::new();
        let file = SubmittedFile::from_bytes("photo.jpg", "image/jpeg", vec![]);
        let submission = state.submit_file(&file).unwrap();

        assert!(matches!(
            submission,
            Submission::Started { backend: Backend::Ocr, .. }
        ));
        assert_eq!(state.file_name.as_deref(), Some("photo.jpg"));
    }

    #[test]
    fn test_unsupported_type_fails_immediately() {
        let mut state = SessionState::new();
        let submission = state.submit("notes.txt", "text/plain").unwrap();

        assert_eq!(
            submission,
            Submission::Rejected(RouteError::UnsupportedType {
                media_type: "text/plain".to_string()
            })
        );
        assert_eq!(state.phase, Phase::Failed);
        assert!(!state.loading);
        assert!(state.document.is_none());
        assert_eq!(state.error.as_deref(), Some(UNSUPPORTED_TYPE_MESSAGE));
        assert_eq!(state.file_name.as_deref(), Some("notes.txt"));
    }

    #[test]
    fn test_progress_then_complete() {
        let mut state = SessionState::new();
        let ticket = started(state.submit("shot.png", "image/png").unwrap());

        assert!(state.report_progress(ticket, ExtractionProgress::new(40)));
        assert_eq!(state.progress.percent(), 40);
        assert!(state.loading);

        let doc = ExtractedDocument::recognized("hello world");
        assert!(state.complete(ticket, doc.clone(), &SuggestionEngine::new()));

        assert_eq!(state.phase, Phase::Done);
        assert!(!state.loading);
        assert_eq!(state.progress, ExtractionProgress::ZERO);
        assert_eq!(state.document, Some(doc));
        assert_eq!(state.suggestions.len(), 6);
        assert_eq!(state.suggestions[0], "Word count: 2");
        assert!(state.error.is_none());
        assert_eq!(state.text(), Some("hello world"));
    }

    #[test]
    fn test_progress_never_decreases() {
        let mut state = SessionState::new();
        let ticket = started(state.submit("shot.png", "image/png").unwrap());

        assert!(state.report_progress(ticket, ExtractionProgress::new(80)));
        assert!(!state.report_progress(ticket, ExtractionProgress::new(20)));
        assert_eq!(state.progress.percent(), 80);
        assert!(state.report_progress(ticket, ExtractionProgress::new(80)));
        assert!(state.report_progress(ticket, ExtractionProgress::COMPLETE));
        assert_eq!(state.progress, ExtractionProgress::COMPLETE);
    }

    #[test]
    fn test_failure_stores_generic_message_only() {
        let mut state = SessionState::new();
        let ticket = started(state.submit("bad.pdf", "application/pdf").unwrap());
        state.report_progress(ticket, ExtractionProgress::new(50));

        assert!(state.fail(ticket, &failure()));

        assert_eq!(state.phase, Phase::Failed);
        assert!(!state.loading);
        assert_eq!(state.progress, ExtractionProgress::ZERO);
        assert!(state.document.is_none());
        assert!(state.suggestions.is_empty());
        assert_eq!(state.error.as_deref(), Some(EXTRACTION_FAILED_MESSAGE));
    }

    #[test]
    fn test_new_submission_clears_previous_result() {
        let mut state = SessionState::new();
        let ticket = started(state.submit("a.png", "image/png").unwrap());
        state.complete(ticket, ExtractedDocument::recognized("first"), &SuggestionEngine::new());

        started(state.submit("b.pdf", "application/pdf").unwrap());

        assert_eq!(state.phase, Phase::Extracting);
        assert!(state.document.is_none());
        assert!(state.suggestions.is_empty());
        assert!(state.error.is_none());
        assert_eq!(state.progress, ExtractionProgress::ZERO);
        assert_eq!(state.file_name.as_deref(), Some("b.pdf"));
    }

    #[test]
    fn test_new_submission_clears_previous_error() {
        let mut state = SessionState::new();
        state.submit("notes.txt", "text/plain").unwrap();
        assert!(state.error.is_some());

        started(state.submit("a.png", "image/png").unwrap());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_submit_while_extracting_is_busy() {
        let mut state = SessionState::new();
        let ticket = started(state.submit("a.png", "image/png").unwrap());
        state.report_progress(ticket, ExtractionProgress::new(10));

        assert_eq!(state.submit("b.png", "image/png"), Err(SessionError::Busy));
        assert_eq!(state.file_name.as_deref(), Some("a.png"));
        assert_eq!(state.progress.percent(), 10);
    }

    #[test]
    fn test_reset_discards_in_flight_result() {
        let mut state = SessionState::new();
        let ticket = started(state.submit("a.png", "image/png").unwrap());

        state.reset();
        assert_eq!(state.phase, Phase::Idle);
        assert!(!state.loading);

        assert!(!state.report_progress(ticket, ExtractionProgress::new(90)));
        assert!(!state.complete(ticket, ExtractedDocument::recognized("late"), &SuggestionEngine::new()));
        assert!(!state.fail(ticket, &failure()));
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.document.is_none());
        assert!(state.error.is_none());
        assert_eq!(state.progress, ExtractionProgress::ZERO);
    }

    #[test]
    fn test_stale_ticket_after_resubmission() {
        let mut state = SessionState::new();
        let old = started(state.submit("a.png", "image/png").unwrap());
        state.reset();
        let new = started(state.submit("b.png", "image/png").unwrap());
        assert_ne!(old, new);

        assert!(!state.complete(old, ExtractedDocument::recognized("old"), &SuggestionEngine::new()));
        assert_eq!(state.phase, Phase::Extracting);

        assert!(state.complete(new, ExtractedDocument::recognized("new"), &SuggestionEngine::new()));
        assert_eq!(state.text(), Some("new"));
    }

    #[test]
    fn test_reset_from_done() {
        let mut state = SessionState::new();
        let ticket = started(state.submit("a.png", "image/png").unwrap());
        state.complete(ticket, ExtractedDocument::recognized(""), &SuggestionEngine::new());
        assert_eq!(state.suggestions, vec!["No text found in the document."]);
        assert!(state.is_terminal());

        state.reset();
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.file_name.is_none());
        assert!(state.suggestions.is_empty());
    }

    #[test]
    fn test_double_completion_ignored() {
        let mut state = SessionState::new();
        let ticket = started(state.submit("a.png", "image/png").unwrap());
        assert!(state.complete(ticket, ExtractedDocument::recognized("one"), &SuggestionEngine::new()));
        assert!(!state.fail(ticket, &failure()));
        assert!(state.error.is_none());
        assert_eq!(state.text(), Some("one"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = SessionState::new();
        state.submit("notes.txt", "text/plain").unwrap();
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["phase"], "failed");
        assert_eq!(json["loading"], false);
        assert_eq!(json["progress"], 0);
        assert_eq!(json["error"], UNSUPPORTED_TYPE_MESSAGE);
        assert!(json.get("generation").is_none());
    }
}
