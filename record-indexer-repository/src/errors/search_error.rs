//! Search error types.
//!
//! This module defines the error types that can occur when talking to the
//! search engine. Failures propagate to the caller verbatim; nothing at this
//! layer retries or reclassifies them.

use thiserror::Error;

/// Errors that can occur during search engine operations.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// Failed to establish connection to the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A bulk submission failed as a whole (transport or request-level).
    #[error("Bulk error: {0}")]
    BulkError(String),

    /// Failed to parse a response from the search engine.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a bulk error.
    pub fn bulk(msg: impl Into<String>) -> Self {
        Self::BulkError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}
