//! Error types for the request and verification layers.
//!
//! # Design
//! `ClientError` covers request construction, `TransportError` covers the
//! network round-trip, and `VerifyError` is what every verified operation
//! returns. An unexpected status is a value like any other assertion failure;
//! the expected status decides whether a 404 is a pass or a fail.

use thiserror::Error;

/// Errors raised while building a request.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("base URL cannot carry path segments: {0}")]
    CannotBeABase(String),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("request body could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while executing a request.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP transport failed: {0}")]
    Http(#[from] ureq::Error),
}

/// A failed verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("{operation}: expected status {expected} but got {actual}")]
    UnexpectedStatus {
        operation: &'static str,
        expected: u16,
        actual: u16,
        body: String,
    },

    #[error("{operation}: expected {field} to be {expected} but got {actual}")]
    FieldMismatch {
        operation: &'static str,
        field: String,
        expected: String,
        actual: String,
    },

    #[error("{operation}: expected content type application/json but got {actual}")]
    UnexpectedContentType {
        operation: &'static str,
        actual: String,
    },

    #[error("{operation}: malformed response body: {reason}")]
    MalformedBody {
        operation: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Errors raised while loading a case file.
#[derive(Debug, Error)]
pub enum CaseFileError {
    #[error("failed to read case file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse case file: {0}")]
    Parse(#[from] serde_json::Error),
}
