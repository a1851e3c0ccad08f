//! Locating glossary and citation markers in rendered HTML.
//!
//! Overlays that anchor tooltips or reference popovers to markers need to
//! know which markers exist. Scanning is read-only.

use coursetext_common::{
    DATA_CITATION_ID_ATTR, DATA_CITATION_POSTNOTE_ATTR, DATA_CITATION_PRENOTE_ATTR,
    DATA_GLOSSARY_ID_ATTR,
};
use kuchikiki::traits::*;
use serde::Serialize;

use crate::dom::HtmlDocument;

/// A glossary marker, by position among glossary markers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryTarget {
    pub position: usize,
    pub glossary_id: String,
}

/// A citation marker, by position among citation markers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationTarget {
    pub position: usize,
    pub citation_id: String,
    pub prenote: Option<String>,
    pub postnote: Option<String>,
}

/// Every marker found in one scan, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkerScan {
    pub glossary: Vec<GlossaryTarget>,
    pub citations: Vec<CitationTarget>,
}

impl MarkerScan {
    pub fn is_empty(&self) -> bool {
        self.glossary.is_empty() && self.citations.is_empty()
    }
}

pub fn scan_markers(html: &str) -> MarkerScan {
    let document = HtmlDocument::parse(html);
    let mut scan = MarkerScan::default();
    for element in document.body().descendants().elements() {
        let attributes = element.attributes.borrow();
        if let Some(id) = attributes.get(DATA_GLOSSARY_ID_ATTR) {
            scan.glossary.push(GlossaryTarget {
                position: scan.glossary.len(),
                glossary_id: id.to_owned(),
            });
        }
        if let Some(id) = attributes.get(DATA_CITATION_ID_ATTR) {
            scan.citations.push(CitationTarget {
                position: scan.citations.len(),
                citation_id: id.to_owned(),
                prenote: attributes.get(DATA_CITATION_PRENOTE_ATTR).map(str::to_owned),
                postnote: attributes.get(DATA_CITATION_POSTNOTE_ATTR).map(str::to_owned),
            });
        }
    }
    scan
}
