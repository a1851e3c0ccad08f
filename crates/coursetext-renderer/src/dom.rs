//! HTML fragment handling for the glossary pass.
//!
//! [`FragmentParser`] is the seam between the glossary annotator and a DOM
//! implementation. [`Html5Fragments`] is the html5ever-backed one used by
//! default.

use coursetext_common::{DATA_GLOSSARY_ID_ATTR, MARKER_TAG, MatchSpan};
use kuchikiki::traits::*;
use kuchikiki::{Attribute, ExpandedName, NodeRef};

/// Parse, walk and rewrite an HTML fragment.
pub trait FragmentParser {
    type Document;
    type Text: Clone;

    fn parse(&self, html: &str) -> Self::Document;

    /// Snapshot of every text node under the document body, in document order.
    fn text_nodes(&self, document: &Self::Document) -> Vec<Self::Text>;

    fn text_content(&self, text: &Self::Text) -> String;

    /// Replace `text` with the same text, each matched span swapped for an
    /// empty glossary marker.
    fn splice_glossary_markers(
        &self,
        document: &Self::Document,
        text: &Self::Text,
        matches: &[MatchSpan],
        glossary_id: &str,
    );

    /// Inner HTML of the document body.
    fn serialize(&self, document: &Self::Document) -> String;
}

/// A parsed HTML document, addressed through its `<body>`.
pub struct HtmlDocument {
    body: NodeRef,
    // Parsed `<span>` whose qualified name every created marker reuses.
    marker_template: NodeRef,
}

impl HtmlDocument {
    pub fn parse(html: &str) -> Self {
        let document = kuchikiki::parse_html().one(html);
        let body = document
            .select_first("body")
            .map(|body| body.as_node().clone())
            .unwrap_or(document);

        let template = kuchikiki::parse_html().one(format!("<{MARKER_TAG}></{MARKER_TAG}>"));
        let marker_template = template
            .select_first(MARKER_TAG)
            .map(|span| span.as_node().clone())
            .unwrap_or(template);

        Self {
            body,
            marker_template,
        }
    }

    pub fn body(&self) -> &NodeRef {
        &self.body
    }

    pub fn text_nodes(&self) -> Vec<NodeRef> {
        self.body
            .descendants()
            .text_nodes()
            .map(|text| text.as_node().clone())
            .collect()
    }

    pub fn inner_html(&self) -> String {
        self.body.children().map(|child| child.to_string()).collect()
    }

    /// A detached, empty marker element with a single attribute.
    pub fn create_marker(&self, attribute: &str, value: &str) -> NodeRef {
        let attributes = [(
            ExpandedName::new("", attribute),
            Attribute {
                prefix: None,
                value: value.to_owned(),
            },
        )];
        match self.marker_template.as_element() {
            Some(template) => NodeRef::new_element(template.name.clone(), attributes),
            None => NodeRef::new_text(""),
        }
    }
}

/// Replace `text_node` in its parent with alternating text and glossary
/// markers.
///
/// Text before, between and after the matches is kept as text nodes; empty
/// pieces are dropped. Spans that overlap an earlier span, run past the end
/// of the text or split a UTF-8 character are ignored. Nothing happens when
/// the node has no parent or is not a text node.
pub fn replace_text_node_with_glossary_spans(
    document: &HtmlDocument,
    text_node: &NodeRef,
    matches: &[MatchSpan],
    glossary_id: &str,
) {
    if text_node.parent().is_none() {
        return;
    }
    let Some(text) = text_node.as_text().map(|text| text.borrow().clone()) else {
        return;
    };

    let mut cursor = 0;
    for span in matches {
        let range = span.range();
        if range.start < cursor
            || range.end > text.len()
            || !text.is_char_boundary(range.start)
            || !text.is_char_boundary(range.end)
        {
            tracing::trace!(?span, "skipping unusable glossary span");
            continue;
        }
        if range.start > cursor {
            text_node.insert_before(NodeRef::new_text(&text[cursor..range.start]));
        }
        text_node.insert_before(document.create_marker(DATA_GLOSSARY_ID_ATTR, glossary_id));
        cursor = range.end;
    }
    if cursor < text.len() {
        text_node.insert_before(NodeRef::new_text(&text[cursor..]));
    }
    text_node.detach();
}

/// [`FragmentParser`] over html5ever via kuchikiki.
#[derive(Debug, Clone, Copy, Default)]
pub struct Html5Fragments;

impl FragmentParser for Html5Fragments {
    type Document = HtmlDocument;
    type Text = NodeRef;

    fn parse(&self, html: &str) -> HtmlDocument {
        HtmlDocument::parse(html)
    }

    fn text_nodes(&self, document: &HtmlDocument) -> Vec<NodeRef> {
        document.text_nodes()
    }

    fn text_content(&self, text: &NodeRef) -> String {
        text.as_text()
            .map(|text| text.borrow().clone())
            .unwrap_or_default()
    }

    fn splice_glossary_markers(
        &self,
        document: &HtmlDocument,
        text: &NodeRef,
        matches: &[MatchSpan],
        glossary_id: &str,
    ) {
        replace_text_node_with_glossary_spans(document, text, matches, glossary_id);
    }

    fn serialize(&self, document: &HtmlDocument) -> String {
        document.inner_html()
    }
}
