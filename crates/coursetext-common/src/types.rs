use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A glossary entry supplied by the course backend.
///
/// `term` is compiled as a regular expression fragment when matching, so it
/// should be a plain word or phrase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub id: String,
    pub term: String,
    #[serde(default)]
    pub definition: String,
}

impl Term {
    pub fn new(
        id: impl Into<String>,
        term: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            term: term.into(),
            definition: definition.into(),
        }
    }
}

/// A matched region of a text string, as a byte offset and byte length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchSpan {
    pub index: usize,
    pub length: usize,
}

impl MatchSpan {
    #[inline]
    pub const fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }

    /// Exclusive end offset.
    #[inline]
    pub const fn end(&self) -> usize {
        self.index + self.length
    }

    #[inline]
    pub const fn range(&self) -> Range<usize> {
        self.index..self.end()
    }
}

/// Switches for a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Annotate glossary terms. On by default.
    pub glossary: bool,
}

impl ParseOptions {
    pub const NO_GLOSSARY: Self = Self { glossary: false };
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { glossary: true }
    }
}

/// Output of one pipeline run.
///
/// `parsed_text` has always been through the sanitizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTextResult {
    pub parsed_text: String,
    /// Number of `[latex]` regions converted.
    pub count: usize,
    pub has_citations_or_glossary: bool,
    /// Matched glossary terms, unique by id, in the order first seen.
    pub glossary_entries: Vec<Term>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_options_default_enables_glossary() {
        assert!(ParseOptions::default().glossary);
        let parsed: ParseOptions = serde_json::from_str("{}").unwrap();
        assert!(parsed.glossary);
    }

    #[test]
    fn result_serializes_with_camel_case_keys() {
        let result = ParsedTextResult {
            parsed_text: "x".into(),
            count: 2,
            has_citations_or_glossary: true,
            glossary_entries: vec![Term::new("t", "word", "def")],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["parsedText"], "x");
        assert_eq!(json["count"], 2);
        assert_eq!(json["hasCitationsOrGlossary"], true);
        assert_eq!(json["glossaryEntries"][0]["id"], "t");
    }

    #[test]
    fn term_definition_is_optional_in_input() {
        let term: Term = serde_json::from_str(r#"{"id":"a","term":"loop"}"#).unwrap();
        assert_eq!(term.definition, "");
    }

    #[test]
    fn match_span_range() {
        let span = MatchSpan::new(3, 9);
        assert_eq!(span.end(), 12);
        assert_eq!(&"An algorithm here"[span.range()], "algorithm");
    }
}
