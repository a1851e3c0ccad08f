use coursetext_common::Term;
use coursetext_renderer::{CitationTarget, GlossaryTarget, MarkerScan};
use serde::Serialize;

/// A glossary marker together with the term it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlossaryOverlay {
    pub target: GlossaryTarget,
    pub term: Term,
}

/// Everything an overlay renderer needs after one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overlays {
    pub glossary: Vec<GlossaryOverlay>,
    pub citations: Vec<CitationTarget>,
}

impl Overlays {
    /// Pair scanned glossary markers with `entries`. Markers whose id has no
    /// entry are dropped.
    pub fn pair(scan: MarkerScan, entries: &[Term]) -> Self {
        let glossary = scan
            .glossary
            .into_iter()
            .filter_map(|target| {
                let term = entries.iter().find(|term| term.id == target.glossary_id);
                if term.is_none() {
                    tracing::trace!(id = %target.glossary_id, "marker without a glossary entry");
                }
                term.cloned().map(|term| GlossaryOverlay { target, term })
            })
            .collect();
        Self {
            glossary,
            citations: scan.citations,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.glossary.is_empty() && self.citations.is_empty()
    }
}
