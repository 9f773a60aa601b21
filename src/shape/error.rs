//! Errors for turning a reply into a snapshot.
//!
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    /// The server cannot report what the mode needs.
    #[error("server does not support reporting {0}")]
    UnsupportedFeature(&'static str),
    /// A field that must be present is not in the reply.
    #[error("reply has no '{0}' field")]
    MissingField(&'static str),
    /// The reply has an unexpected structure.
    #[error("malformed reply: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Reading the next document of a cursor failed.
    #[error("failure reading from cursor: {0}")]
    Cursor(String),
}
