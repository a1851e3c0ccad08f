//! Glossary term annotation over the text nodes of an HTML fragment.

use coursetext_common::Term;

use crate::dom::{FragmentParser, Html5Fragments};
use crate::term_match::TermPattern;

/// Output of the glossary pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryParse {
    pub parsed_text: String,
    /// One entry per replaced occurrence, so a term matched three times
    /// appears three times.
    pub terms: Vec<Term>,
}

/// Mark glossary terms in `html` using the default HTML parser.
pub fn parse_glossary(html: &str, terms: &[Term]) -> GlossaryParse {
    annotate_glossary(&Html5Fragments, html, terms)
}

/// Mark glossary terms in `html`.
///
/// Terms are applied in list order. Each term sees the text nodes as left by
/// the terms before it, so text already turned into a marker cannot match
/// again. Only text nodes are searched; tag names, attribute values and
/// comments never match. When nothing matches the input comes back
/// byte-for-byte.
pub fn annotate_glossary<P: FragmentParser>(
    parser: &P,
    html: &str,
    terms: &[Term],
) -> GlossaryParse {
    let mut used = Vec::new();
    if terms.is_empty() || html.is_empty() {
        return GlossaryParse {
            parsed_text: html.to_owned(),
            terms: used,
        };
    }

    let document = parser.parse(html);
    for term in terms {
        let pattern = TermPattern::for_term(term);
        if !pattern.is_valid() {
            continue;
        }
        for text in parser.text_nodes(&document) {
            let matches = pattern.find_matches(&parser.text_content(&text));
            if matches.is_empty() {
                continue;
            }
            used.extend(std::iter::repeat_n(term.clone(), matches.len()));
            parser.splice_glossary_markers(&document, &text, &matches, &term.id);
        }
    }

    if used.is_empty() {
        return GlossaryParse {
            parsed_text: html.to_owned(),
            terms: used,
        };
    }
    tracing::trace!(occurrences = used.len(), "glossary terms marked");
    GlossaryParse {
        parsed_text: parser.serialize(&document),
        terms: used,
    }
}
