//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use super::{Recognizer, RecognizerEvent, RecognizerFactory, RecognizerPhase};
use crate::error::OcrError;
use crate::models::config::{OcrConfig, DEFAULT_LANGUAGE};

/// Builds [`PureOcrRecognizer`]s from model files on disk.
#[derive(Debug, Clone)]
pub struct PureOcrFactory {
    config: OcrConfig,
}

impl PureOcrFactory {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }
}

impl RecognizerFactory for PureOcrFactory {
    type Recognizer = PureOcrRecognizer;

    fn initialize(&self, language: &str) -> Result<PureOcrRecognizer, OcrError> {
        if language != DEFAULT_LANGUAGE {
            return Err(OcrError::UnsupportedLanguage(language.to_string()));
        }

        for path in self.config.model_paths() {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&self.config.detection_path())
            .rec_model_path(&self.config.recognition_path())
            .dictionary_path(&self.config.dictionary_path())
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!(
            "Loaded pure-onnx-ocr engine from {}",
            self.config.model_dir.display()
        );

        Ok(PureOcrRecognizer {
            engine,
            keep_unk: self.config.keep_unk,
        })
    }
}

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrRecognizer {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unk: bool,
}

/// A recognized line with its top-left corner, for reading-order sorting.
struct Line {
    text: String,
    x: f64,
    y: f64,
}

impl Recognizer for PureOcrRecognizer {
    fn recognize(
        &mut self,
        image: &DynamicImage,
        on_event: &mut dyn FnMut(RecognizerEvent),
    ) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        info!("Processing image: {}x{}", width, height);

        on_event(RecognizerEvent::new(RecognizerPhase::DetectingText, 0.0));

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());
        on_event(RecognizerEvent::new(RecognizerPhase::DetectingText, 1.0));

        let total = results.len().max(1) as f32;
        let mut lines = Vec::with_capacity(results.len());
        on_event(RecognizerEvent::new(RecognizerPhase::RecognizingText, 0.0));

        for (i, r) in results.iter().enumerate() {
            let (x, y) = r
                .bounding_box
                .exterior()
                .coords()
                .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| {
                    (x.min(c.x), y.min(c.y))
                });
            let text = if self.keep_unk {
                r.text.clone()
            } else {
                r.text.replace("[UNK]", " ")
            };
            lines.push(Line { text, x, y });

            on_event(RecognizerEvent::new(
                RecognizerPhase::RecognizingText,
                (i + 1) as f32 / total,
            ));
        }

        // Sort by reading order: rows of ~20px, then left to right
        lines.sort_by(|a, b| {
            let row_a = (a.y / 20.0) as i64;
            let row_b = (b.y / 20.0) as i64;
            row_a
                .cmp(&row_b)
                .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
        });

        on_event(RecognizerEvent::new(RecognizerPhase::RecognizingText, 1.0));

        let text = lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        info!(
            "OCR complete: {} lines in {}ms",
            lines.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}
