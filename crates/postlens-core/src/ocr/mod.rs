//! Image-to-text recognition.

mod engine;
#[cfg(feature = "native")]
mod pure_engine;

pub use engine::EngineSlot;
#[cfg(feature = "native")]
pub use pure_engine::{PureOcrFactory, PureOcrRecognizer};

use image::DynamicImage;

use crate::error::OcrError;

/// Stage a recognizer reports progress for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerPhase {
    /// Loading model weights.
    LoadingModel,
    /// Locating text regions.
    DetectingText,
    /// Decoding characters from the detected regions.
    RecognizingText,
}

/// Status update emitted while recognizing an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecognizerEvent {
    pub phase: RecognizerPhase,
    /// Completion of the phase, 0.0 - 1.0.
    pub fraction: f32,
}

impl RecognizerEvent {
    pub fn new(phase: RecognizerPhase, fraction: f32) -> Self {
        Self { phase, fraction }
    }
}

/// Builds recognizer engines. Construction is expensive (model loading).
pub trait RecognizerFactory {
    type Recognizer: Recognizer;

    /// Load the engine for `language`.
    fn initialize(&self, language: &str) -> Result<Self::Recognizer, OcrError>;
}

/// A ready-to-use recognizer engine.
pub trait Recognizer {
    /// Recognize the text in `image`, reporting status through `on_event`.
    fn recognize(
        &mut self,
        image: &DynamicImage,
        on_event: &mut dyn FnMut(RecognizerEvent),
    ) -> Result<String, OcrError>;
}
