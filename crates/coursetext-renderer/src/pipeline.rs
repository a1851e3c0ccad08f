//! The full text pipeline: math, citations, glossary, sanitize.

use std::collections::HashSet;

use coursetext_common::config::SanitizerConfig;
use coursetext_common::{ParseOptions, ParsedTextResult, Term};

use crate::citation::parse_citation;
use crate::dom::{FragmentParser, Html5Fragments};
use crate::glossary::annotate_glossary;
use crate::math::{MathRenderer, PulldownLatex, convert_to_latex_with};
use crate::sanitize::{AmmoniaSanitizer, HtmlSanitizer};

/// The text pipeline with its math renderer, sanitizer and HTML parser.
///
/// `TextPipeline::default()` uses pulldown-latex, ammonia and html5ever.
/// Each can be swapped for tests or other hosts.
#[derive(Debug, Clone)]
pub struct TextPipeline<M = PulldownLatex, S = AmmoniaSanitizer, P = Html5Fragments> {
    math: M,
    sanitizer: S,
    fragments: P,
}

impl TextPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sanitizer_config(config: SanitizerConfig) -> Self {
        Self::new().with_sanitizer(AmmoniaSanitizer::new(config))
    }
}

impl Default for TextPipeline {
    fn default() -> Self {
        Self {
            math: PulldownLatex,
            sanitizer: AmmoniaSanitizer::default(),
            fragments: Html5Fragments,
        }
    }
}

impl<M, S, P> TextPipeline<M, S, P> {
    pub fn with_math_renderer<M2>(self, math: M2) -> TextPipeline<M2, S, P> {
        TextPipeline {
            math,
            sanitizer: self.sanitizer,
            fragments: self.fragments,
        }
    }

    pub fn with_sanitizer<S2>(self, sanitizer: S2) -> TextPipeline<M, S2, P> {
        TextPipeline {
            math: self.math,
            sanitizer,
            fragments: self.fragments,
        }
    }

    pub fn with_fragment_parser<P2>(self, fragments: P2) -> TextPipeline<M, S, P2> {
        TextPipeline {
            math: self.math,
            sanitizer: self.sanitizer,
            fragments,
        }
    }
}

impl<M, S, P> TextPipeline<M, S, P>
where
    M: MathRenderer,
    S: HtmlSanitizer,
    P: FragmentParser,
{
    /// Run every pass over `content`.
    ///
    /// A missing or empty input gives an empty, sanitized result. The
    /// glossary pass is skipped when `options.glossary` is off, and then
    /// `glossary_entries` is empty. `has_citations_or_glossary` is set when
    /// the glossary pass changed the text.
    pub fn parse_text(
        &self,
        content: Option<&str>,
        terms: &[Term],
        options: ParseOptions,
    ) -> ParsedTextResult {
        let content = content.unwrap_or_default();
        let _span = tracing::debug_span!(
            "parse_text",
            len = content.len(),
            terms = terms.len(),
            glossary = options.glossary
        )
        .entered();

        let latex = convert_to_latex_with(&self.math, content);
        let cited = parse_citation(&latex.converted);

        let (annotated, used_terms) = if options.glossary {
            let glossary = annotate_glossary(&self.fragments, &cited, terms);
            (glossary.parsed_text, glossary.terms)
        } else {
            (cited.clone(), Vec::new())
        };
        let has_citations_or_glossary = annotated != cited;

        let mut seen = HashSet::new();
        let glossary_entries: Vec<Term> = used_terms
            .into_iter()
            .filter(|term| seen.insert(term.id.clone()))
            .collect();

        tracing::debug!(
            latex = latex.count,
            glossary_entries = glossary_entries.len(),
            "text parsed"
        );

        ParsedTextResult {
            parsed_text: self.sanitizer.sanitize(&annotated),
            count: latex.count,
            has_citations_or_glossary,
            glossary_entries,
        }
    }
}

/// Run the default pipeline once.
pub fn parse_text(content: Option<&str>, terms: &[Term], options: ParseOptions) -> ParsedTextResult {
    TextPipeline::new().parse_text(content, terms, options)
}
