//! # Record Indexer Pipeline
//!
//! This crate keeps a search index in sync with rows from a primary-keyed
//! data source. It converts rows into bulk actions and submits them through
//! a `SearchClient`, serially or via parallel workers.
//!
//! ## Architecture
//!
//! The pipeline is a chain of small components:
//!
//! 1. **Mapping**: static table from model field kinds to search field types
//! 2. **Source**: chunked, pk-ordered cursor over the data source
//! 3. **Document**: per-field projectors turning a row into a document body
//! 4. **Sync**: the update driver building actions and submitting them in bulk

pub mod document;
pub mod errors;
pub mod mapping;
pub mod source;
pub mod sync;

pub use document::{
    Document, DocumentBuilder, DocumentDefinition, FieldSpec, ProjectableRecord, RecordRef,
    DEFAULT_PAGE_SIZE,
};
pub use errors::{SourceError, SyncError};
pub use mapping::{search_field_type, FieldNotMappedError, ModelFieldKind, SearchFieldType};
pub use source::{IndexableRecord, RecordCursor, RecordSource};
pub use sync::{IndexEventSink, NoopEventSink, PostIndexEvent, UpdateOptions};
