//! # Record Indexer Repository
//!
//! This crate provides the search engine boundary for the record indexer:
//! the abstract `SearchClient` trait for bulk submission, its error types,
//! and a concrete implementation over OpenSearch.

pub mod errors;
pub mod interfaces;
pub mod opensearch;

pub use errors::SearchError;
pub use interfaces::SearchClient;
pub use opensearch::OpenSearchBulkClient;
