use thiserror::Error;
use xmlmap_dom::XmlError;

/// Errors produced by a [`Mapper`](crate::Mapper).
///
/// Per-field conversion failures are not errors: the field is skipped and
/// the record is still returned.
#[derive(Debug, Error)]
pub enum MapperError {
    /// The input text is not a well-formed XML document.
    #[error("malformed input: {0}")]
    MalformedInput(#[from] XmlError),
    /// A record was requested before any input was set.
    #[error("no xml input has been set")]
    NoInputSource,
    /// A single record was requested but no element matched.
    #[error("no <{0}> elements found")]
    NoMatch(String),
}
