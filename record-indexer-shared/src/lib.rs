//! # Record Indexer Shared
//!
//! Wire-level data types shared across the record indexer crates: the bulk
//! action descriptor and the bulk response. These types match the search
//! engine's bulk protocol exactly; everything else in the workspace is free
//! to evolve, but the shapes here are a fixed boundary.

pub mod action;
pub mod response;

pub use action::{BulkAction, OpType};
pub use response::{BulkItemResult, BulkResponse};
