//! Error types for the fallible edges of coursetext: configuration, glossary
//! files and I/O. The text pipeline itself never fails.

use miette::{Diagnostic, NamedSource, SourceOffset, SourceSpan};
use std::path::PathBuf;

/// Main error type for coursetext operations
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum CoursetextError {
    /// IO error
    #[error(transparent)]
    #[diagnostic(code(coursetext::io))]
    Io(#[from] std::io::Error),

    /// Parse error with source location
    #[error(transparent)]
    #[diagnostic_source]
    Parse(#[from] ParseError),

    /// Serialization error without a source document
    #[error(transparent)]
    #[diagnostic_source]
    Serde(#[from] SerDeError),

    #[error("unsupported file format: {}", path.display())]
    #[diagnostic(
        code(coursetext::format),
        help("use a file ending in .json or .toml")
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("invalid configuration: {0}")]
    #[diagnostic(code(coursetext::config))]
    InvalidConfig(String),
}

/// Parse error with source code location information
#[derive(thiserror::Error, Debug, Diagnostic)]
#[error("parse error: {}", self.kind)]
#[diagnostic(code(coursetext::parse))]
pub struct ParseError {
    #[diagnostic_source]
    kind: SerDeError,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    err_location: SourceSpan,
    #[help]
    advice: Option<String>,
}

impl ParseError {
    /// Wrap a JSON error, pointing at the line and column it reports.
    pub fn json(err: serde_json::Error, name: impl AsRef<str>, src: impl Into<String>) -> Self {
        let src = src.into();
        let offset = if err.line() == 0 {
            SourceOffset::from(0)
        } else {
            SourceOffset::from_location(&src, err.line(), err.column().max(1))
        };
        Self {
            kind: SerDeError::Json(err),
            src: NamedSource::new(name, src),
            err_location: SourceSpan::new(offset, 0),
            advice: None,
        }
    }

    /// Wrap a TOML error, pointing at the span it reports.
    pub fn toml(err: toml::de::Error, name: impl AsRef<str>, src: impl Into<String>) -> Self {
        let src = src.into();
        let err_location = match err.span() {
            Some(span) => SourceSpan::new(span.start.into(), span.len()),
            None => SourceSpan::new(0.into(), 0),
        };
        Self {
            kind: SerDeError::TomlDe(err),
            src: NamedSource::new(name, src),
            err_location,
            advice: None,
        }
    }

    pub fn with_advice(mut self, advice: impl Into<String>) -> Self {
        self.advice = Some(advice.into());
        self
    }

    /// Byte offset of the reported location in the source document.
    pub fn offset(&self) -> usize {
        self.err_location.offset()
    }
}

/// Serialization/deserialization errors
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SerDeError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}
