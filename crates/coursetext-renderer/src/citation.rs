//! `\cite[prenote][postnote]{key}` references turned into citation markers.

use std::fmt::Write;
use std::sync::LazyLock;

use coursetext_common::{
    DATA_CITATION_ID_ATTR, DATA_CITATION_POSTNOTE_ATTR, DATA_CITATION_PRENOTE_ATTR, MARKER_TAG,
};
use regex::{Captures, Regex};

static LATEX_CITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\cite(?:\[([^\]]*)\])?(?:\[([^\]]*)\])?\{(.*?)\}").unwrap()
});

/// One parsed `\cite` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Citation<'a> {
    pub key: &'a str,
    pub prenote: Option<&'a str>,
    pub postnote: Option<&'a str>,
}

impl<'a> Citation<'a> {
    /// With a single bracket group the note is a postnote, as in LaTeX:
    /// `\cite[p.~3]{key}`. An empty first group counts as absent.
    fn from_captures(caps: &Captures<'a>) -> Self {
        let first = caps.get(1).map(|m| m.as_str());
        let second = caps.get(2).map(|m| m.as_str());
        let (prenote, postnote) = match (first, second) {
            (Some(note), None) if !note.is_empty() => (None, Some(note)),
            other => other,
        };
        Self {
            key: caps.get(3).map_or("", |m| m.as_str()),
            prenote,
            postnote,
        }
    }

    /// The marker element; note attributes are left out when empty.
    pub fn to_marker(&self) -> String {
        let mut marker = format!(
            r#"<{MARKER_TAG} {DATA_CITATION_ID_ATTR}="{}""#,
            escape_citation_text(self.key)
        );
        for (attr, note) in [
            (DATA_CITATION_PRENOTE_ATTR, self.prenote),
            (DATA_CITATION_POSTNOTE_ATTR, self.postnote),
        ] {
            if let Some(note) = note.filter(|note| !note.is_empty()) {
                let _ = write!(marker, r#" {attr}="{}""#, escape_citation_text(note));
            }
        }
        let _ = write!(marker, "></{MARKER_TAG}>");
        marker
    }
}

/// `"` becomes `&quot;` and LaTeX's non-breaking `~` becomes `&nbsp;`.
fn escape_citation_text(text: &str) -> String {
    text.replace('"', "&quot;").replace('~', "&nbsp;")
}

/// Every `\cite` reference in `html`, left to right.
pub fn find_citations(html: &str) -> Vec<Citation<'_>> {
    LATEX_CITE_RE
        .captures_iter(html)
        .map(|caps| Citation::from_captures(&caps))
        .collect()
}

/// Replace each `\cite` reference with an empty citation marker.
pub fn parse_citation(html: &str) -> String {
    LATEX_CITE_RE
        .replace_all(html, |caps: &Captures| Citation::from_captures(caps).to_marker())
        .into_owned()
}
