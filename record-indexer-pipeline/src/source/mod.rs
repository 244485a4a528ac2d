//! Chunked record cursor over the data source.
//!
//! The cursor pages through rows by primary key so that at most one page is
//! held in memory at a time, however large the table is. It tolerates the
//! table changing under it: rows inserted ahead of the cursor are picked up,
//! rows deleted behind it are simply never revisited. It is not safe against
//! rows whose primary key changes during iteration.

use async_trait::async_trait;

use crate::errors::SourceError;

/// A row that can be driven through the indexing pipeline.
pub trait IndexableRecord: Send + Sync {
    /// The row's primary key. Must be positive and monotonically assigned.
    fn pk(&self) -> i64;
}

/// A data source that supports ordered range queries by primary key.
///
/// Implementations back onto whatever storage holds the rows (a SQL table,
/// an embedded store, a fixture in tests). The only contract is keyset
/// pagination: return up to `limit` rows with pk strictly greater than
/// `last_pk`, in ascending pk order.
#[async_trait]
pub trait RecordSource<R>: Send + Sync
where
    R: IndexableRecord,
{
    /// Fetch the next page of rows after `last_pk`.
    async fn fetch_after(&self, last_pk: i64, limit: usize) -> Result<Vec<R>, SourceError>;
}

/// A lazy, finite, non-restartable cursor over a `RecordSource`.
///
/// Keeps the last-seen primary key and the current page; advances
/// monotonically and terminates when a fetched page comes back empty.
/// Consumed rows are moved out of the page, so memory peaks at one page.
pub struct RecordCursor<'a, R>
where
    R: IndexableRecord,
{
    source: &'a dyn RecordSource<R>,
    chunk_size: usize,
    last_pk: i64,
    page: std::collections::VecDeque<R>,
    exhausted: bool,
}

impl<'a, R> RecordCursor<'a, R>
where
    R: IndexableRecord,
{
    /// Create a cursor over `source` fetching pages of at most `chunk_size`.
    pub fn new(source: &'a dyn RecordSource<R>, chunk_size: usize) -> Self {
        Self {
            source,
            chunk_size: chunk_size.max(1),
            last_pk: 0,
            page: std::collections::VecDeque::new(),
            exhausted: false,
        }
    }

    /// Yield the next row, fetching the next page when the current one is
    /// drained. Returns `Ok(None)` once a fetched page is empty; the cursor
    /// stays exhausted from then on.
    pub async fn next_record(&mut self) -> Result<Option<R>, SourceError> {
        loop {
            if let Some(row) = self.page.pop_front() {
                self.last_pk = row.pk();
                return Ok(Some(row));
            }

            if self.exhausted {
                return Ok(None);
            }

            let rows = self.source.fetch_after(self.last_pk, self.chunk_size).await?;
            if rows.is_empty() {
                self.exhausted = true;
                return Ok(None);
            }
            self.page = rows.into();
        }
    }

    /// Drain the cursor into a vector. Mostly useful in tests; production
    /// callers should consume rows one at a time to keep the memory bound.
    pub async fn collect_remaining(mut self) -> Result<Vec<R>, SourceError> {
        let mut rows = Vec::new();
        while let Some(row) = self.next_record().await? {
            rows.push(row);
        }
        Ok(rows)
    }
}
