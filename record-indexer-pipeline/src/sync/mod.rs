//! Bulk submission driver.
//!
//! `Document::update` and friends turn rows into bulk actions and push them
//! through a `SearchClient`, either in one blocking bulk call or via the
//! client's parallel worker path. The serial path fires a post-index event on
//! the definition's sink; the parallel path intentionally does not (see
//! [`Document::update`]).

use futures::StreamExt;
use tracing::{debug, instrument};

use crate::document::{Document, ProjectableRecord};
use crate::errors::SyncError;
use crate::source::{RecordCursor, RecordSource};
use record_indexer_repository::SearchClient;
use record_indexer_shared::{BulkAction, BulkResponse, OpType};

/// Options for one update call.
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// The operation to perform for every row. Defaults to `Index`.
    pub op: OpType,
    /// Explicit refresh flag. When `None`, the definition's auto-refresh
    /// default applies.
    pub refresh: Option<bool>,
    /// Submit through the client's parallel worker path.
    pub parallel: bool,
    /// Per-worker chunk size for the parallel path. Defaults to the
    /// definition's page size.
    pub chunk_size: Option<usize>,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            op: OpType::Index,
            refresh: None,
            parallel: false,
            chunk_size: None,
        }
    }
}

impl UpdateOptions {
    /// Options for a plain serial index update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a delete update.
    pub fn delete() -> Self {
        Self {
            op: OpType::Delete,
            ..Self::default()
        }
    }

    /// Set the operation.
    pub fn with_op(mut self, op: OpType) -> Self {
        self.op = op;
        self
    }

    /// Set an explicit refresh flag, overriding the definition's default.
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = Some(refresh);
        self
    }

    /// Use the parallel worker path.
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    /// Override the parallel chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }
}

/// Notification fired after a serial bulk call completes.
#[derive(Debug)]
pub struct PostIndexEvent<'a> {
    /// The index alias of the document type that submitted.
    pub index: &'a str,
    /// The actions that were submitted, in order.
    pub actions: &'a [BulkAction],
    /// The engine's response.
    pub response: &'a BulkResponse,
}

/// Receives post-index notifications.
///
/// There is no contract on failure: a sink that panics or blocks is the
/// embedder's problem, and the pipeline does nothing with the sink's outcome.
pub trait IndexEventSink: Send + Sync {
    /// Called once per serial bulk call, after the response has arrived.
    fn post_index(&self, event: &PostIndexEvent<'_>);
}

/// The default sink: drops every event.
pub struct NoopEventSink;

impl IndexEventSink for NoopEventSink {
    fn post_index(&self, _event: &PostIndexEvent<'_>) {}
}

impl<R> Document<R>
where
    R: ProjectableRecord + 'static,
{
    /// Update the search index for a slice of rows.
    ///
    /// Builds one action per row (subject to the inclusion predicate for
    /// non-delete ops) and submits them through `client`.
    ///
    /// The serial path returns the engine's response and fires exactly one
    /// post-index event. The parallel path drains the client's lazy chunk
    /// stream, discards the per-chunk responses, returns
    /// [`BulkResponse::placeholder`], and fires no event. The missing
    /// parallel notification is intentional: per-chunk responses are
    /// discarded, so there is no single response to report. Callers that
    /// depend on the event must use the serial path.
    #[instrument(
        skip(self, rows, client, options),
        fields(
            index = %self.definition().alias(),
            row_count = rows.len(),
            op = ?options.op,
            parallel = options.parallel,
        )
    )]
    pub async fn update(
        &self,
        rows: &[R],
        client: &dyn SearchClient,
        options: &UpdateOptions,
    ) -> Result<BulkResponse, SyncError> {
        let actions: Vec<BulkAction> = self.bulk_actions(rows, options.op).collect();
        self.submit(actions, client, options).await
    }

    /// Update the search index for a single row.
    pub async fn update_one(
        &self,
        row: &R,
        client: &dyn SearchClient,
        options: &UpdateOptions,
    ) -> Result<BulkResponse, SyncError> {
        self.update(std::slice::from_ref(row), client, options).await
    }

    /// Update the search index for every row in `source`.
    ///
    /// Pages through the source with a [`RecordCursor`] at the definition's
    /// page size, so row memory stays bounded to one page while the action
    /// list is accumulated.
    #[instrument(
        skip(self, source, client, options),
        fields(index = %self.definition().alias(), op = ?options.op)
    )]
    pub async fn update_from_source(
        &self,
        source: &dyn RecordSource<R>,
        client: &dyn SearchClient,
        options: &UpdateOptions,
    ) -> Result<BulkResponse, SyncError> {
        let mut cursor = RecordCursor::new(source, self.definition().page_size());
        let mut actions = Vec::new();
        while let Some(row) = cursor.next_record().await? {
            if let Some(action) = self.action_for(&row, options.op) {
                actions.push(action);
            }
        }
        self.submit(actions, client, options).await
    }

    async fn submit(
        &self,
        actions: Vec<BulkAction>,
        client: &dyn SearchClient,
        options: &UpdateOptions,
    ) -> Result<BulkResponse, SyncError> {
        let definition = self.definition();
        // Explicit refresh wins; otherwise fall back to the definition's
        // auto-refresh default, or leave the engine default untouched.
        let refresh = options
            .refresh
            .or_else(|| definition.auto_refresh().then_some(true));

        if options.parallel {
            let chunk_size = options.chunk_size.unwrap_or_else(|| definition.page_size());
            debug!(
                action_count = actions.len(),
                chunk_size, "Submitting actions through parallel bulk"
            );

            // The chunk stream is inert until polled; drain it to force
            // every chunk through, discarding per-chunk responses.
            let mut chunks = client.parallel_bulk(actions, chunk_size, refresh);
            while let Some(result) = chunks.next().await {
                result?;
            }

            return Ok(BulkResponse::placeholder());
        }

        debug!(action_count = actions.len(), "Submitting actions through serial bulk");
        let response = client.bulk(&actions, refresh).await?;

        definition.event_sink.post_index(&PostIndexEvent {
            index: definition.alias(),
            actions: &actions,
            response: &response,
        });

        Ok(response)
    }
}
