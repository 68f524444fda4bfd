//! Configuration structures for the postlens pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::suggest::SuggestionStyle;

/// Recognition language used by the OCR backend.
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Main configuration for the postlens pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostlensConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Suggestion rendering configuration.
    pub suggestions: SuggestionConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Recognition language. Only `eng` ships with a model.
    pub language: String,

    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` tokens emitted for characters missing from the dictionary.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    pub fn detection_path(&self) -> PathBuf {
        self.model_dir.join(&self.detection_model)
    }

    pub fn recognition_path(&self) -> PathBuf {
        self.model_dir.join(&self.recognition_model)
    }

    pub fn dictionary_path(&self) -> PathBuf {
        self.model_dir.join(&self.dictionary)
    }

    /// Paths of every file the recognizer needs.
    pub fn model_paths(&self) -> [PathBuf; 3] {
        [
            self.detection_path(),
            self.recognition_path(),
            self.dictionary_path(),
        ]
    }

    /// Whether all model files are present on disk.
    pub fn models_present(&self) -> bool {
        self.model_paths().iter().all(|p| p.exists())
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Report progress after each page instead of staying indeterminate.
    pub report_page_progress: bool,

    /// Try an empty user password on encrypted documents.
    pub decrypt_empty_password: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            report_page_progress: true,
            decrypt_empty_password: true,
        }
    }
}

/// Suggestion rendering configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    pub style: SuggestionStyle,
}

impl PostlensConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ocr.language != DEFAULT_LANGUAGE {
            return Err(ConfigError::UnsupportedLanguage(self.ocr.language.clone()));
        }
        Ok(())
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
