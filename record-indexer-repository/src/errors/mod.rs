//! Error types for the record indexer repository.

mod search_error;

pub use search_error::SearchError;
