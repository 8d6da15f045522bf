//! Error types for the service layer core.
//!
//! # Design
//! A single `Error` enum covers everything a call can fail with. Status-line
//! failures get their own `ParseError` so callers that only parse responses
//! (without building requests) can match on them directly. Malformed header
//! lines are not errors at all; the parser skips them.

use std::path::PathBuf;

use thiserror::Error;

use crate::transport::TransportError;

/// Errors returned by request building, response parsing and the client.
#[derive(Debug, Error)]
pub enum Error {
    /// An attachment path could not be read while building a multipart body.
    #[error("failed to read attachment {}: {source}", path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The response status line could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The transport failed before a response was received.
    #[error("transport failed: {0}")]
    Transport(#[source] TransportError),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The service layer answered with an unexpected status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Fatal status-line failures. Header noise never produces one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("response has no status line")]
    MissingStatusLine,

    #[error("malformed status line: {0:?}")]
    MalformedStatusLine(String),

    #[error("invalid status code: {0:?}")]
    InvalidStatusCode(String),
}
