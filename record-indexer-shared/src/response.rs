//! Bulk response types.
//!
//! The response from a serial bulk call, deserialized from the search
//! engine's reply. Per-item outcomes are carried through verbatim; this
//! layer never reinterprets partial failures, it only surfaces them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Aggregate response to one bulk request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkResponse {
    /// Time the engine spent on the request, in milliseconds.
    #[serde(default)]
    pub took: u64,
    /// Whether any item in the request failed.
    #[serde(default)]
    pub errors: bool,
    /// Raw per-item results, one entry per submitted action, in order.
    #[serde(default)]
    pub items: Vec<Value>,
}

impl BulkResponse {
    /// Synthetic response returned by the parallel update path, which drains
    /// per-chunk results without surfacing them to the caller.
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// Typed view over `items`. Items that do not match the expected shape
    /// are skipped rather than treated as errors.
    pub fn item_results(&self) -> Vec<BulkItemResult> {
        self.items
            .iter()
            .filter_map(BulkItemResult::from_item)
            .collect()
    }
}

/// The outcome of a single action within a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemResult {
    /// The operation name (`index`, `update`, or `delete`).
    pub op: String,
    /// The document id the action targeted.
    pub id: Option<String>,
    /// The per-item HTTP status code.
    pub status: u16,
    /// The engine's error payload, if the item failed.
    pub error: Option<Value>,
}

impl BulkItemResult {
    /// Parse one raw bulk item, shaped as `{"<op>": {"_id": …, "status": …}}`.
    pub fn from_item(item: &Value) -> Option<Self> {
        let (op, body) = item.as_object()?.iter().next()?;
        let status = body.get("status")?.as_u64()? as u16;
        let id = body
            .get("_id")
            .and_then(Value::as_str)
            .map(ToString::to_string);
        let error = body.get("error").cloned();

        Some(Self {
            op: op.clone(),
            id,
            status,
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_bulk_response() {
        let raw = json!({
            "took": 30,
            "errors": false,
            "items": [
                {"index": {"_index": "records", "_id": "1", "status": 201}},
                {"delete": {"_index": "records", "_id": "2", "status": 200}}
            ]
        });

        let response: BulkResponse = serde_json::from_value(raw).unwrap();

        assert_eq!(response.took, 30);
        assert!(!response.errors);
        assert_eq!(response.items.len(), 2);

        let results = response.item_results();
        assert_eq!(results[0].op, "index");
        assert_eq!(results[0].id.as_deref(), Some("1"));
        assert_eq!(results[0].status, 201);
        assert_eq!(results[1].op, "delete");
    }

    #[test]
    fn test_item_error_is_carried_verbatim() {
        let raw = json!({
            "took": 5,
            "errors": true,
            "items": [
                {"index": {"_id": "9", "status": 400, "error": {"type": "mapper_parsing_exception"}}}
            ]
        });

        let response: BulkResponse = serde_json::from_value(raw).unwrap();
        let results = response.item_results();

        assert!(response.errors);
        assert_eq!(results[0].status, 400);
        assert_eq!(
            results[0].error,
            Some(json!({"type": "mapper_parsing_exception"}))
        );
    }

    #[test]
    fn test_placeholder_is_empty() {
        let response = BulkResponse::placeholder();

        assert_eq!(response.took, 0);
        assert!(!response.errors);
        assert!(response.items.is_empty());
    }
}
