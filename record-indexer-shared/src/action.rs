//! Bulk action descriptors.
//!
//! A `BulkAction` is one instruction in a bulk request: index, update, or
//! delete a single document. Actions are ephemeral; they are produced by the
//! pipeline for one update call and consumed by the client that submits them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The operation a bulk action performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpType {
    /// Create the document, replacing any existing document with the same id.
    Index,
    /// Partially update an existing document.
    Update,
    /// Remove the document.
    Delete,
}

impl OpType {
    /// The operation name as it appears in the bulk protocol header line.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpType::Index => "index",
            OpType::Update => "update",
            OpType::Delete => "delete",
        }
    }
}

/// One bulk operation: an op type, a target index, a document id, and the
/// document source (absent for deletes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkAction {
    /// The operation to perform.
    pub op_type: OpType,
    /// The concrete index (or alias) the operation targets.
    pub index: String,
    /// The document id.
    pub id: String,
    /// The document body. `None` for delete operations.
    pub source: Option<Value>,
}

impl BulkAction {
    /// Create an index action carrying a full document source.
    pub fn index(index: impl Into<String>, id: impl Into<String>, source: Value) -> Self {
        Self {
            op_type: OpType::Index,
            index: index.into(),
            id: id.into(),
            source: Some(source),
        }
    }

    /// Create an update action carrying the fields to change.
    pub fn update(index: impl Into<String>, id: impl Into<String>, source: Value) -> Self {
        Self {
            op_type: OpType::Update,
            index: index.into(),
            id: id.into(),
            source: Some(source),
        }
    }

    /// Create a delete action. Deletes carry no source.
    pub fn delete(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            op_type: OpType::Delete,
            index: index.into(),
            id: id.into(),
            source: None,
        }
    }

    /// Render this action as bulk-protocol body lines.
    ///
    /// Every action contributes a header line naming the operation, index,
    /// and id. Index actions follow it with the document source, update
    /// actions with the source wrapped in a `doc` object as the protocol
    /// requires, and deletes contribute the header only.
    pub fn body_lines(&self) -> Vec<Value> {
        let header = json!({
            self.op_type.as_str(): {
                "_index": self.index,
                "_id": self.id,
            }
        });

        match self.op_type {
            OpType::Delete => vec![header],
            OpType::Index => {
                let source = self.source.clone().unwrap_or_else(|| json!({}));
                vec![header, source]
            }
            OpType::Update => {
                let source = self.source.clone().unwrap_or_else(|| json!({}));
                vec![header, json!({ "doc": source })]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_action_body_lines() {
        let action = BulkAction::index("records", "7", json!({"name": "seven"}));

        let lines = action.body_lines();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], json!({"index": {"_index": "records", "_id": "7"}}));
        assert_eq!(lines[1], json!({"name": "seven"}));
    }

    #[test]
    fn test_update_action_wraps_source_in_doc() {
        let action = BulkAction::update("records", "7", json!({"name": "seven"}));

        let lines = action.body_lines();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], json!({"update": {"_index": "records", "_id": "7"}}));
        assert_eq!(lines[1], json!({"doc": {"name": "seven"}}));
    }

    #[test]
    fn test_delete_action_has_no_source_line() {
        let action = BulkAction::delete("records", "7");

        assert!(action.source.is_none());
        let lines = action.body_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], json!({"delete": {"_index": "records", "_id": "7"}}));
    }
}
