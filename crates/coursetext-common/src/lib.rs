//! Shared types, errors and configuration for the coursetext pipeline.

pub mod config;
pub mod error;
#[cfg(feature = "telemetry")]
pub mod telemetry;
pub mod types;

pub use crate::error::{CoursetextError, ParseError, SerDeError};
pub use crate::types::{MatchSpan, ParseOptions, ParsedTextResult, Term};

/// Attribute carrying the glossary term id on a glossary marker.
pub const DATA_GLOSSARY_ID_ATTR: &str = "data-glossary-id";
/// Attribute carrying the citation key on a citation marker.
pub const DATA_CITATION_ID_ATTR: &str = "data-citation-id";
pub const DATA_CITATION_PRENOTE_ATTR: &str = "data-citation-prenote";
pub const DATA_CITATION_POSTNOTE_ATTR: &str = "data-citation-postnote";
/// Element name used for every marker.
pub const MARKER_TAG: &str = "span";
