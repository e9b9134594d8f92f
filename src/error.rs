//! Error types for the sanitization engine.

use std::result::Result as StdResult;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = StdResult<T, Error>;

/// Core error type for sanitization operations.
///
/// Everything here is recovered internally by the orchestrator; the public
/// [`sanitize`](crate::sanitize) entry point is total and surfaces
/// degradation through the report's warning field instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("PDF structure error: {0}")]
    Structure(#[from] StructureError),

    #[error("replacement of {replacement} bytes does not fit span of {span} bytes")]
    ReplacementTooLong { replacement: usize, span: usize },

    #[error("rewrite span {start}..{end} lies outside buffer of {len} bytes")]
    SpanOutOfRange { start: usize, end: usize, len: usize },
}

/// Failures of the structural (object-graph) pass.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StructureError {
    #[error("parse failed: {0}")]
    Parse(String),

    #[error("save failed: {0}")]
    Save(String),
}

impl From<lopdf::Error> for StructureError {
    fn from(err: lopdf::Error) -> Self {
        StructureError::Parse(err.to_string())
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Structure(StructureError::from(err))
    }
}
