//! Heuristic content suggestions for social-media posts.
//!
//! The engine is a pure function of the text. Output order is fixed:
//! word count, then one line per missing hashtag/mention/link (in that
//! order), then two closing style tips that are always present.

pub mod patterns;
pub mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};

use rules::{default_rules, ContentRule};

/// How suggestions are rendered to strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStyle {
    /// Plain sentences.
    #[default]
    Plain,
    /// Sentences prefixed with an emoji icon.
    Decorated,
}

/// A single heuristic recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suggestion {
    /// The document has no text at all.
    NoText,
    /// Number of whitespace-delimited words.
    WordCount(usize),
    AddHashtags,
    TagCollaborators,
    AddLink,
    ShortSentences,
    AltText,
}

impl Suggestion {
    pub fn message(&self) -> String {
        match self {
            Suggestion::NoText => "No text found in the document.".to_string(),
            Suggestion::WordCount(n) => format!("Word count: {}", n),
            Suggestion::AddHashtags => "Add 3–8 hashtags for better reach.".to_string(),
            Suggestion::TagCollaborators => "Tag collaborators using @mentions.".to_string(),
            Suggestion::AddLink => "Consider adding a call-to-action link.".to_string(),
            Suggestion::ShortSentences => "Add short sentences and a clear CTA.".to_string(),
            Suggestion::AltText => "Include alt text for images.".to_string(),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Suggestion::NoText => "📝",
            Suggestion::WordCount(_) => "📊",
            Suggestion::AddHashtags => "🏷️",
            Suggestion::TagCollaborators => "👥",
            Suggestion::AddLink => "🔗",
            Suggestion::ShortSentences => "✏️",
            Suggestion::AltText => "🖼️",
        }
    }

    pub fn render(&self, style: SuggestionStyle) -> String {
        match style {
            SuggestionStyle::Plain => self.message(),
            SuggestionStyle::Decorated => format!("{} {}", self.icon(), self.message()),
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Count whitespace-delimited tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Rule-based suggestion engine.
pub struct SuggestionEngine {
    rules: Vec<Box<dyn ContentRule + Send + Sync>>,
    style: SuggestionStyle,
}

impl SuggestionEngine {
    /// Create an engine with the hashtag, mention and link rules.
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
            style: SuggestionStyle::Plain,
        }
    }

    /// Set the rendering style.
    pub fn with_style(mut self, style: SuggestionStyle) -> Self {
        self.style = style;
        self
    }

    /// Typed suggestions for `text`.
    pub fn suggestions(&self, text: &str) -> Vec<Suggestion> {
        if text.trim().is_empty() {
            return vec![Suggestion::NoText];
        }

        let mut out = Vec::with_capacity(self.rules.len() + 3);
        out.push(Suggestion::WordCount(word_count(text)));
        out.extend(self.rules.iter().filter_map(|rule| rule.check(text)));
        out.push(Suggestion::ShortSentences);
        out.push(Suggestion::AltText);
        out
    }

    /// Rendered suggestions for `text`.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        self.suggestions(text)
            .iter()
            .map(|s| s.render(self.style))
            .collect()
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyze `text` with the default engine and plain rendering.
pub fn analyze(text: &str) -> Vec<String> {
    SuggestionEngine::new().analyze(text)
}
