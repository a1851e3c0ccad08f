//! Whole-word, case-sensitive term search over plain text.

use coursetext_common::{MatchSpan, Term};
use regex::Regex;

/// A compiled glossary term.
///
/// The term text is used as a regular expression fragment, grouped and
/// wrapped in word boundaries so every alternative must be a whole word. Terms that are empty or fail to compile never match.
#[derive(Debug, Clone)]
pub struct TermPattern {
    regex: Option<Regex>,
}

impl TermPattern {
    pub fn new(term: &str) -> Self {
        if term.is_empty() {
            return Self { regex: None };
        }
        match Regex::new(&format!(r"\b(?:{term})\b")) {
            Ok(regex) => Self { regex: Some(regex) },
            Err(err) => {
                tracing::warn!(term, error = %err, "glossary term is not a valid pattern, skipping");
                Self { regex: None }
            }
        }
    }

    pub fn for_term(term: &Term) -> Self {
        Self::new(&term.term)
    }

    /// False when the term can never match anything.
    pub fn is_valid(&self) -> bool {
        self.regex.is_some()
    }

    /// Every non-overlapping match in `text`, left to right, as byte spans.
    pub fn find_matches(&self, text: &str) -> Vec<MatchSpan> {
        let Some(regex) = &self.regex else {
            return Vec::new();
        };
        regex
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| MatchSpan::new(m.start(), m.len()))
            .collect()
    }
}

/// Find whole-word occurrences of `term` in `text`.
pub fn find_term_matches(text: &str, term: &str) -> Vec<MatchSpan> {
    TermPattern::new(term).find_matches(text)
}
