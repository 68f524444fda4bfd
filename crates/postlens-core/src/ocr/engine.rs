//! Lazily-initialized, reusable recognizer engine.

use std::time::Instant;

use tracing::{debug, info};

use super::RecognizerFactory;
use crate::error::OcrError;

/// Holds the single recognizer engine of a session.
///
/// The engine is built on first use and kept for every later image; it is
/// never torn down while the slot lives.
pub struct EngineSlot<F: RecognizerFactory> {
    factory: F,
    language: String,
    engine: Option<F::Recognizer>,
}

impl<F: RecognizerFactory> EngineSlot<F> {
    /// Create an empty slot. Nothing is loaded until [`EngineSlot::get`].
    pub fn new(factory: F, language: impl Into<String>) -> Self {
        Self {
            factory,
            language: language.into(),
            engine: None,
        }
    }

    /// Return the engine, building it on first call.
    ///
    /// A failed initialization leaves the slot empty so a later call retries.
    pub fn get(&mut self) -> Result<&mut F::Recognizer, OcrError> {
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => {
                let start = Instant::now();
                debug!("Initializing recognizer for language {}", self.language);
                let engine = self.factory.initialize(&self.language)?;
                info!(
                    "Recognizer ready ({}) in {}ms",
                    self.language,
                    start.elapsed().as_millis()
                );
                engine
            }
        };
        Ok(self.engine.insert(engine))
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.is_some()
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}
