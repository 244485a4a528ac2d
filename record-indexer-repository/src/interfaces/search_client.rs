//! Search client trait definition.
//!
//! This module defines the abstract interface for bulk submission, allowing
//! different backend implementations (OpenSearch, Elasticsearch, mocks).

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::errors::SearchError;
use record_indexer_shared::{BulkAction, BulkResponse};

/// Abstract interface for submitting bulk actions to a search engine.
///
/// Implementations are injected into the update pipeline by the caller; the
/// pipeline never resolves a connection from ambient state.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// Submission failures are returned verbatim as `SearchError`; partial
/// failure within one bulk call is reported inside the `BulkResponse`
/// (per-item results), not as an `Err`.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Submit a sequence of actions in a single blocking bulk call.
    ///
    /// # Arguments
    ///
    /// * `actions` - The actions to submit, in order
    /// * `refresh` - Optional refresh flag; `None` leaves the engine default
    ///
    /// # Returns
    ///
    /// * `Ok(BulkResponse)` - The aggregate response, including per-item outcomes
    /// * `Err(SearchError)` - If the request fails as a whole
    async fn bulk(
        &self,
        actions: &[BulkAction],
        refresh: Option<bool>,
    ) -> Result<BulkResponse, SearchError>;

    /// Submit actions through parallel workers, one bulk call per chunk.
    ///
    /// The returned stream is lazy: nothing executes until it is polled, and
    /// the caller must drain it to force all chunks through. Each item is the
    /// outcome of one chunk's bulk call; chunk completion order is not
    /// guaranteed to match submission order.
    fn parallel_bulk<'a>(
        &'a self,
        actions: Vec<BulkAction>,
        chunk_size: usize,
        refresh: Option<bool>,
    ) -> BoxStream<'a, Result<BulkResponse, SearchError>>;
}
