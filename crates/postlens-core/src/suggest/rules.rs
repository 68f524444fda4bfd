//! Pattern-presence rules run by the suggestion engine.

use regex::Regex;

use super::patterns::{HASHTAG, LINK, MENTION};
use super::Suggestion;

/// A check that may contribute one suggestion for a text.
pub trait ContentRule {
    /// Suggestion to emit for `text`, if any.
    fn check(&self, text: &str) -> Option<Suggestion>;
}

/// Suggests something when a pattern is absent from the text.
pub struct MissingPatternRule {
    pattern: &'static Regex,
    suggestion: Suggestion,
}

impl MissingPatternRule {
    pub fn new(pattern: &'static Regex, suggestion: Suggestion) -> Self {
        Self {
            pattern,
            suggestion,
        }
    }
}

impl ContentRule for MissingPatternRule {
    fn check(&self, text: &str) -> Option<Suggestion> {
        if self.pattern.is_match(text) {
            None
        } else {
            Some(self.suggestion)
        }
    }
}

/// The conditional rules, in output order: hashtags, mentions, links.
pub fn default_rules() -> Vec<Box<dyn ContentRule + Send + Sync>> {
    vec![
        Box::new(MissingPatternRule::new(&*HASHTAG, Suggestion::AddHashtags)),
        Box::new(MissingPatternRule::new(&*MENTION, Suggestion::TagCollaborators)),
        Box::new(MissingPatternRule::new(&*LINK, Suggestion::AddLink)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_pattern_rule() {
        let rule = MissingPatternRule::new(&*HASHTAG, Suggestion::AddHashtags);
        assert_eq!(rule.check("plain text"), Some(Suggestion::AddHashtags));
        assert_eq!(rule.check("with #tag"), None);
    }

    #[test]
    fn test_default_rule_order() {
        let emitted: Vec<Suggestion> = default_rules()
            .iter()
            .filter_map(|rule| rule.check("nothing special here"))
            .collect();
        assert_eq!(
            emitted,
            vec![
                Suggestion::AddHashtags,
                Suggestion::TagCollaborators,
                Suggestion::AddLink
            ]
        );
    }
}
