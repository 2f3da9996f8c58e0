//! Keyword lexicons and the rule provider seam.
//!
//! Every heuristic text match in the engine (strength categories, role kinds,
//! neurotype markers) goes through [`RuleProvider::classify`], so a different
//! matching strategy can be swapped in without touching evaluator control flow.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Maps free text to the set of tags it triggers
pub trait RuleProvider: Send + Sync {
    /// Classify a text into zero or more tags
    fn classify(&self, text: &str) -> BTreeSet<String>;

    /// Get a description of what this provider classifies
    fn name(&self) -> &str {
        "rule provider"
    }
}

/// A tag and the keywords that trigger it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCategory {
    pub tag: String,
    pub keywords: Vec<String>,
    /// Other spellings of the tag itself, e.g. its Spanish form
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl KeywordCategory {
    pub fn new(tag: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            tag: tag.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// The tag followed by its aliases
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.tag.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// How keywords are compared against text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Case-insensitive containment anywhere in the text
    #[default]
    Substring,
    /// Case-insensitive match on whole alphanumeric tokens (or token phrases)
    Token,
}

/// Keyword table classifier, the default [`RuleProvider`]
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    name: String,
    mode: MatchMode,
    categories: Vec<(String, Vec<String>)>,
}

impl KeywordClassifier {
    /// Build a classifier, normalizing keywords once for the chosen mode.
    pub fn new(name: impl Into<String>, mode: MatchMode, categories: &[KeywordCategory]) -> Self {
        let categories = categories
            .iter()
            .map(|category| {
                let keywords = category
                    .keywords
                    .iter()
                    .map(|keyword| normalize(keyword, mode))
                    .filter(|keyword| !keyword.trim().is_empty())
                    .collect();
                (category.tag.clone(), keywords)
            })
            .collect();

        Self {
            name: name.into(),
            mode,
            categories,
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl RuleProvider for KeywordClassifier {
    fn classify(&self, text: &str) -> BTreeSet<String> {
        let haystack = normalize(text, self.mode);
        self.categories
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|keyword| haystack.contains(keyword.as_str())))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for KeywordClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} categories)", self.name, self.categories.len())
    }
}

fn normalize(text: &str, mode: MatchMode) -> String {
    match mode {
        MatchMode::Substring => text.to_lowercase(),
        MatchMode::Token => token_phrase(text),
    }
}

/// Lower-case tokens joined by single spaces and padded, so that phrase
/// containment only succeeds on token boundaries.
fn token_phrase(text: &str) -> String {
    let tokens: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
        .collect();
    format!(" {} ", tokens.join(" "))
}

/// Whether any keyword occurs in the text (case-insensitive containment).
pub fn contains_any<S: AsRef<str>>(text: &str, keywords: &[S]) -> bool {
    let text = text.to_lowercase();
    keywords.iter().any(|keyword| {
        let keyword = keyword.as_ref().to_lowercase();
        !keyword.is_empty() && text.contains(&keyword)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strengths() -> KeywordClassifier {
        KeywordClassifier::new(
            "strengths",
            MatchMode::Substring,
            &[
                KeywordCategory::new("mathematics", &["number", "fraction"]),
                KeywordCategory::new("creativity", &["mural", "art"]),
            ],
        )
    }

    fn neurotypes() -> KeywordClassifier {
        KeywordClassifier::new(
            "neurotypes",
            MatchMode::Token,
            &[
                KeywordCategory::new("TEA", &["TEA", "autism"]),
                KeywordCategory::new("Gifted", &["altas capacidades", "gifted"]),
            ],
        )
    }

    #[test]
    fn test_substring_classify() {
        let tags = strengths().classify("Fractions and a class MURAL");
        assert!(tags.contains("mathematics"));
        assert!(tags.contains("creativity"));
    }

    #[test]
    fn test_substring_no_match() {
        assert!(strengths().classify("reading circle").is_empty());
    }

    #[test]
    fn test_token_match_ignores_case_and_separators() {
        let tags = neurotypes().classify("TEA_support");
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["TEA".to_string()]);
        assert!(neurotypes().classify("tea: visual agenda").contains("TEA"));
    }

    #[test]
    fn test_token_match_rejects_partial_words() {
        assert!(neurotypes().classify("teamwork with the team").is_empty());
    }

    #[test]
    fn test_token_phrase_match() {
        let tags = neurotypes().classify("Altas Capacidades - ampliación");
        assert!(tags.contains("Gifted"));
    }

    #[test]
    fn test_empty_keywords_ignored() {
        let classifier = KeywordClassifier::new(
            "empty",
            MatchMode::Token,
            &[KeywordCategory::new("blank", &["", "  "])],
        );
        assert!(classifier.classify("").is_empty());
        assert!(classifier.classify("anything").is_empty());
    }

    #[test]
    fn test_contains_any() {
        assert!(contains_any("Two SESSIONS of 45 min", &["session", "hour"]));
        assert!(!contains_any("soon", &["session", "hour"]));
        assert!(!contains_any("soon", &[""]));
    }

    #[test]
    fn test_provider_name_and_display() {
        let classifier = strengths();
        assert_eq!(classifier.name(), "strengths");
        assert_eq!(classifier.to_string(), "strengths (2 categories)");
        assert_eq!(classifier.len(), 2);
        assert_eq!(classifier.mode(), MatchMode::Substring);
    }
}
