//! Coursetext renderer
//!
//! Turns course-material HTML from the backend into the HTML that is finally
//! injected into the page. The passes run in a fixed order:
//!
//! 1. `[latex]…[/latex]` regions are rendered to MathML ([`math`]).
//! 2. `\cite[pre][post]{key}` references become citation markers ([`citation`]).
//! 3. Glossary terms in text nodes become glossary markers ([`glossary`]).
//! 4. Everything goes through the allow-list sanitizer ([`sanitize`]).
//!
//! Markers are empty `<span>` elements carrying `data-glossary-id` or
//! `data-citation-*` attributes; [`markers`] finds them again once the HTML
//! has been placed in a container.

pub mod citation;
pub mod dom;
pub mod glossary;
pub mod markers;
pub mod math;
pub mod pipeline;
pub mod sanitize;
pub mod tag_parser;
pub mod term_match;

pub use coursetext_common::{MatchSpan, ParseOptions, ParsedTextResult, Term};

pub use crate::citation::parse_citation;
pub use crate::dom::{FragmentParser, Html5Fragments, HtmlDocument, replace_text_node_with_glossary_spans};
pub use crate::glossary::{GlossaryParse, parse_glossary};
pub use crate::markers::{CitationTarget, GlossaryTarget, MarkerScan, scan_markers};
pub use crate::math::{LatexConversion, MathRenderer, PulldownLatex, convert_to_latex};
pub use crate::pipeline::{TextPipeline, parse_text};
pub use crate::sanitize::{AmmoniaSanitizer, HtmlSanitizer};
pub use crate::tag_parser::{format_text, is_valid_text};
pub use crate::term_match::{TermPattern, find_term_matches};
