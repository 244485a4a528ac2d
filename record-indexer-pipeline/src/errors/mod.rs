//! Error types for the record indexer pipeline.

use thiserror::Error;

use crate::mapping::FieldNotMappedError;
use record_indexer_repository::SearchError;

/// Errors that can occur while synchronizing records to the search index.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// A model field kind has no entry in the field mapping table.
    #[error("Field mapping error: {0}")]
    FieldNotMapped(#[from] FieldNotMappedError),

    /// Error fetching rows from the data source.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Error from the search engine, propagated verbatim.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}

/// Errors that can occur while fetching rows from the data source.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// A page query against the data source failed.
    #[error("Query error: {0}")]
    QueryError(String),

    /// The data source connection is unavailable.
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl SourceError {
    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }
}
