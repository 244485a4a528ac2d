//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchClient` using
//! the OpenSearch Rust client. Actions are rendered into the newline-delimited
//! bulk body; the parallel path chunks the action list and runs the chunks
//! through a bounded set of concurrent bulk calls.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use opensearch::{
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    params::Refresh,
    BulkParts, OpenSearch,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::errors::SearchError;
use crate::interfaces::SearchClient;
use record_indexer_shared::{BulkAction, BulkResponse};

/// Number of concurrent workers used by `parallel_bulk`.
const PARALLEL_WORKERS: usize = 4;

/// OpenSearch-backed bulk submission client.
///
/// # Example
///
/// ```ignore
/// use record_indexer_repository::OpenSearchBulkClient;
/// use record_indexer_shared::BulkAction;
///
/// let client = OpenSearchBulkClient::new("http://localhost:9200")?;
/// let actions = vec![BulkAction::delete("records", "7")];
/// let response = client.bulk(&actions, None).await?;
/// ```
pub struct OpenSearchBulkClient {
    client: OpenSearch,
}

impl OpenSearchBulkClient {
    /// Create a new client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchBulkClient)` - A new client instance
    /// * `Err(SearchError)` - If connection setup fails
    pub fn new(url: &str) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        info!(url = %url, "Created OpenSearch bulk client");

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }

    /// Wrap an existing OpenSearch handle owned by the caller.
    ///
    /// This is the dependency-injection constructor: connection lifecycle,
    /// pooling, and authentication remain the caller's concern.
    pub fn from_client(client: OpenSearch) -> Self {
        Self { client }
    }

    /// Submit one chunk of actions through a single bulk request.
    #[instrument(skip(self, actions), fields(action_count = actions.len()))]
    async fn bulk_request(
        &self,
        actions: &[BulkAction],
        refresh: Option<bool>,
    ) -> Result<BulkResponse, SearchError> {
        let body: Vec<JsonBody<Value>> = bulk_body(actions)
            .into_iter()
            .map(JsonBody::from)
            .collect();

        let mut request = self.client.bulk(BulkParts::None).body(body);
        if let Some(refresh) = refresh {
            request = request.refresh(if refresh { Refresh::True } else { Refresh::False });
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchError::bulk(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchError::bulk(format!(
                "Bulk failed with status {}: {}",
                status, error_body
            )));
        }

        let parsed: BulkResponse = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        debug!(
            actions = actions.len(),
            took = parsed.took,
            errors = parsed.errors,
            "Bulk request completed"
        );

        Ok(parsed)
    }
}

#[async_trait]
impl SearchClient for OpenSearchBulkClient {
    async fn bulk(
        &self,
        actions: &[BulkAction],
        refresh: Option<bool>,
    ) -> Result<BulkResponse, SearchError> {
        self.bulk_request(actions, refresh).await
    }

    fn parallel_bulk<'a>(
        &'a self,
        actions: Vec<BulkAction>,
        chunk_size: usize,
        refresh: Option<bool>,
    ) -> BoxStream<'a, Result<BulkResponse, SearchError>> {
        let chunks = chunk_actions(actions, chunk_size);

        stream::iter(chunks)
            .map(move |chunk| async move { self.bulk_request(&chunk, refresh).await })
            .buffer_unordered(PARALLEL_WORKERS)
            .boxed()
    }
}

/// Render actions into the flat list of bulk-protocol body lines.
fn bulk_body(actions: &[BulkAction]) -> Vec<Value> {
    let mut lines = Vec::with_capacity(actions.len() * 2);
    for action in actions {
        lines.extend(action.body_lines());
    }
    lines
}

/// Split an action list into chunks of at most `chunk_size` actions.
fn chunk_actions(actions: Vec<BulkAction>, chunk_size: usize) -> Vec<Vec<BulkAction>> {
    let chunk_size = chunk_size.max(1);
    actions
        .chunks(chunk_size)
        .map(|chunk| chunk.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index_action(id: u32) -> BulkAction {
        BulkAction::index("records", id.to_string(), json!({"pk": id}))
    }

    #[test]
    fn test_bulk_body_interleaves_headers_and_sources() {
        let actions = vec![
            BulkAction::index("records", "1", json!({"name": "one"})),
            BulkAction::delete("records", "2"),
        ];

        let body = bulk_body(&actions);

        assert_eq!(body.len(), 3);
        assert_eq!(body[0], json!({"index": {"_index": "records", "_id": "1"}}));
        assert_eq!(body[1], json!({"name": "one"}));
        assert_eq!(body[2], json!({"delete": {"_index": "records", "_id": "2"}}));
    }

    #[test]
    fn test_chunk_actions_splits_evenly() {
        let actions: Vec<BulkAction> = (0..10).map(index_action).collect();

        let chunks = chunk_actions(actions, 4);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 4);
        assert_eq!(chunks[1].len(), 4);
        assert_eq!(chunks[2].len(), 2);
    }

    #[test]
    fn test_chunk_actions_zero_chunk_size_treated_as_one() {
        let actions: Vec<BulkAction> = (0..3).map(index_action).collect();

        let chunks = chunk_actions(actions, 0);

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_chunk_actions_chunk_larger_than_input() {
        let actions: Vec<BulkAction> = (0..3).map(index_action).collect();

        let chunks = chunk_actions(actions, 100);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 3);
    }
}
