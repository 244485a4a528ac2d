//! OpenSearch backend implementation.

mod client;

pub use client::OpenSearchBulkClient;
