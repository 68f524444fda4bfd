//! Drives a backend to completion for one submitted file.

use std::time::Instant;

use tracing::{debug, info};

use crate::error::{ExtractionError, PostlensError};
use crate::models::config::PostlensConfig;
use crate::models::{ExtractedDocument, ExtractionProgress, SubmittedFile};
use crate::ocr::{EngineSlot, Recognizer, RecognizerFactory, RecognizerPhase};
use crate::pdf::{self, PdfBackend, PdfDocument};
use crate::router::{self, Backend};

/// Receiver of normalized progress updates.
pub trait ProgressSink {
    fn report(&mut self, progress: ExtractionProgress);
}

impl<F: FnMut(ExtractionProgress)> ProgressSink for F {
    fn report(&mut self, progress: ExtractionProgress) {
        self(progress)
    }
}

/// Sink that drops every update.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _progress: ExtractionProgress) {}
}

/// Runs extractions, owning the session's recognizer engine.
pub struct ExtractionOrchestrator<F: RecognizerFactory, P: PdfBackend> {
    recognizer: EngineSlot<F>,
    pdf: P,
    report_page_progress: bool,
}

impl<F: RecognizerFactory, P: PdfBackend> ExtractionOrchestrator<F, P> {
    /// Create an orchestrator. The recognizer is not loaded until the first
    /// image is extracted.
    pub fn new(factory: F, pdf: P, language: impl Into<String>) -> Self {
        Self {
            recognizer: EngineSlot::new(factory, language),
            pdf,
            report_page_progress: true,
        }
    }

    /// Create an orchestrator using the OCR language and PDF settings of `config`.
    pub fn from_config(factory: F, pdf: P, config: &PostlensConfig) -> Self {
        Self::new(factory, pdf, config.ocr.language.clone())
            .with_page_progress(config.pdf.report_page_progress)
    }

    /// Set whether the PDF path reports progress per page.
    pub fn with_page_progress(mut self, enabled: bool) -> Self {
        self.report_page_progress = enabled;
        self
    }

    /// Whether the recognizer engine has been built.
    pub fn recognizer_ready(&self) -> bool {
        self.recognizer.is_initialized()
    }

    /// Route `file` by media type and extract its text.
    pub fn extract(
        &mut self,
        file: &SubmittedFile,
        progress: &mut dyn ProgressSink,
    ) -> Result<ExtractedDocument, PostlensError> {
        let backend = router::route(&file.media_type)?;
        Ok(self.extract_with(backend, file, progress)?)
    }

    /// Extract `file` with an already-selected backend.
    pub fn extract_with(
        &mut self,
        backend: Backend,
        file: &SubmittedFile,
        progress: &mut dyn ProgressSink,
    ) -> Result<ExtractedDocument, ExtractionError> {
        let start = Instant::now();
        info!("Extracting {} with {} backend", file.name, backend);

        let document = match backend {
            Backend::Pdf => self.extract_pdf(file, progress)?,
            Backend::Ocr => self.extract_image(file, progress)?,
        };

        debug!(
            "Extracted {} chars from {} in {}ms",
            document.text.len(),
            file.name,
            start.elapsed().as_millis()
        );
        Ok(document)
    }

    fn extract_image(
        &mut self,
        file: &SubmittedFile,
        progress: &mut dyn ProgressSink,
    ) -> Result<ExtractedDocument, ExtractionError> {
        let engine = self.recognizer.get()?;
        let bytes = file.bytes()?;
        let image = image::load_from_memory(&bytes)?;

        let mut last = ExtractionProgress::ZERO;
        let text = engine.recognize(&image, &mut |event| {
            if event.phase != RecognizerPhase::RecognizingText {
                return;
            }
            let current = ExtractionProgress::from_fraction(f64::from(event.fraction));
            // Recognizers may re-report an earlier fraction
            if current >= last {
                last = current;
                progress.report(current);
            }
        })?;

        Ok(ExtractedDocument::recognized(text))
    }

    fn extract_pdf(
        &mut self,
        file: &SubmittedFile,
        progress: &mut dyn ProgressSink,
    ) -> Result<ExtractedDocument, ExtractionError> {
        let bytes = file.bytes()?;
        let document = self.pdf.open(&bytes)?;
        let page_count = document.page_count();
        debug!("{} has {} pages", file.name, page_count);

        let mut report = |p: ExtractionProgress| progress.report(p);
        let on_page: Option<&mut dyn FnMut(ExtractionProgress)> = if self.report_page_progress {
            Some(&mut report)
        } else {
            None
        };
        let text = pdf::read_all_pages(&document, on_page)?;

        Ok(ExtractedDocument::from_pdf(text, page_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, OcrError, PdfError, RouteError};
    use crate::ocr::fake::FakeFactory;
    use crate::ocr::RecognizerEvent;
    use crate::pdf::fake::{FakeDocument, FakePdfBackend};
    use image::{ImageBuffer, ImageFormat, Rgb};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = ImageBuffer::from_pixel(4, 4, Rgb([255u8, 255, 255]));
        let mut data = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .unwrap();
        data
    }

    fn pdf_backend() -> FakePdfBackend {
        FakePdfBackend {
            document: FakeDocument {
                pages: vec![vec!["A", "B"], vec!["C"], vec!["D", "E"]],
            },
        }
    }

    fn event(phase: RecognizerPhase, fraction: f32) -> RecognizerEvent {
        RecognizerEvent::new(phase, fraction)
    }

    #[test]
    fn test_pdf_extraction() {
        let mut orch = ExtractionOrchestrator::new(FakeFactory::new(""), pdf_backend(), "eng");
        let file = SubmittedFile::from_bytes("deck.pdf", "application/pdf", b"%PDF".to_vec());

        let mut seen = Vec::new();
        let doc = orch
            .extract(&file, &mut |p: ExtractionProgress| seen.push(p.percent()))
            .unwrap();

        assert_eq!(doc.text, "\nA B\nC\nD E");
        assert_eq!(doc.backend, Backend::Pdf);
        assert_eq!(doc.page_count, Some(3));
        assert_eq!(seen, vec![33, 67, 100]);
        assert!(!orch.recognizer_ready());
    }

    #[test]
    fn test_pdf_without_page_progress() {
        let mut orch = ExtractionOrchestrator::new(FakeFactory::new(""), pdf_backend(), "eng")
            .with_page_progress(false);
        let file = SubmittedFile::from_bytes("deck.pdf", "application/pdf", b"%PDF".to_vec());

        let mut seen = Vec::new();
        orch.extract(&file, &mut |p: ExtractionProgress| seen.push(p))
            .unwrap();
        assert!(seen.is_empty());
    }

    #[test]
    fn test_corrupt_pdf_is_extraction_failure() {
        let mut orch = ExtractionOrchestrator::new(FakeFactory::new(""), pdf_backend(), "eng");
        let file = SubmittedFile::from_bytes("bad.pdf", "application/pdf", b"corrupt".to_vec());

        let err = orch.extract(&file, &mut NoProgress).unwrap_err();
        match err {
            PostlensError::Extraction(e) => {
                assert!(matches!(e.cause(), BackendError::Pdf(PdfError::Parse(_))))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_type() {
        let mut orch = ExtractionOrchestrator::new(FakeFactory::new(""), pdf_backend(), "eng");
        let file = SubmittedFile::from_bytes("notes.txt", "text/plain", b"hi".to_vec());

        let err = orch.extract(&file, &mut NoProgress).unwrap_err();
        assert!(matches!(
            err,
            PostlensError::Route(RouteError::UnsupportedType { ref media_type }) if media_type == "text/plain"
        ));
    }

    #[test]
    fn test_image_extraction_reuses_engine() {
        let factory = FakeFactory::new("Hello #world");
        let count = factory.initializations.clone();
        let mut orch = ExtractionOrchestrator::new(factory, pdf_backend(), "eng");
        let file = SubmittedFile::from_bytes("shot.png", "image/png", png_bytes());

        let first = orch.extract(&file, &mut NoProgress).unwrap();
        let second = orch.extract(&file, &mut NoProgress).unwrap();

        assert_eq!(first.text, "Hello #world");
        assert_eq!(first.backend, Backend::Ocr);
        assert_eq!(second, first);
        assert_eq!(count.get(), 1);
        assert!(orch.recognizer_ready());
    }

    #[test]
    fn test_image_progress_filtered_and_monotonic() {
        let mut factory = FakeFactory::new("text");
        factory.events = vec![
            event(RecognizerPhase::LoadingModel, 0.5),
            event(RecognizerPhase::DetectingText, 0.9),
            event(RecognizerPhase::RecognizingText, 0.0),
            event(RecognizerPhase::RecognizingText, 0.254),
            event(RecognizerPhase::RecognizingText, 0.2),
            event(RecognizerPhase::RecognizingText, 0.75),
            event(RecognizerPhase::RecognizingText, 1.0),
        ];
        let mut orch = ExtractionOrchestrator::new(factory, pdf_backend(), "eng");
        let file = SubmittedFile::from_bytes("shot.png", "image/png", png_bytes());

        let mut seen = Vec::new();
        orch.extract(&file, &mut |p: ExtractionProgress| seen.push(p.percent()))
            .unwrap();

        assert_eq!(seen, vec![0, 25, 75, 100]);
    }

    #[test]
    fn test_undecodable_image_fails() {
        let mut orch = ExtractionOrchestrator::new(FakeFactory::new("x"), pdf_backend(), "eng");
        let file = SubmittedFile::from_bytes("shot.png", "image/png", b"not an image".to_vec());

        let err = orch.extract(&file, &mut NoProgress).unwrap_err();
        match err {
            PostlensError::Extraction(e) => assert!(matches!(e.cause(), BackendError::Image(_))),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_engine_init_failure() {
        let mut factory = FakeFactory::new("x");
        factory.fail = true;
        let mut orch = ExtractionOrchestrator::new(factory, pdf_backend(), "eng");
        let file = SubmittedFile::from_bytes("shot.png", "image/png", png_bytes());

        let err = orch
            .extract_with(Backend::Ocr, &file, &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err.cause(), BackendError::Ocr(OcrError::ModelLoad(_))));
    }

    #[test]
    fn test_unreadable_path() {
        let mut orch = ExtractionOrchestrator::new(FakeFactory::new("x"), pdf_backend(), "eng");
        let file = SubmittedFile::from_path("gone.pdf", "application/pdf", "/nonexistent/gone.pdf");

        let err = orch
            .extract_with(Backend::Pdf, &file, &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err.cause(), BackendError::Io(_)));
    }
}
