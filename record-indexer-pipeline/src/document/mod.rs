//! Document definitions and preparation.
//!
//! A `DocumentDefinition` declares the shape of one search document type:
//! its index alias, its fields, and how each field's value is projected out
//! of a source row. A `Document` is a cheap per-use instance of a definition
//! with the projector list resolved once at construction, so `prepare` does
//! no lookup work per row.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde_json::{json, Map, Value};
use wildmatch::WildMatch;

use crate::mapping::{search_field_type, FieldNotMappedError, ModelFieldKind, SearchFieldType};
use crate::source::IndexableRecord;
use crate::sync::{IndexEventSink, NoopEventSink};
use record_indexer_shared::{BulkAction, OpType};

/// Default page size for cursor iteration and parallel chunking.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Projects one field value out of a row.
pub type Projector<R> = Arc<dyn Fn(&R) -> Value + Send + Sync>;

/// Projects one field value out of a row, aware of a related record that
/// nested extraction must skip.
pub type RelatedProjector<R> = Arc<dyn Fn(&R, Option<&RecordRef>) -> Value + Send + Sync>;

/// Per-row inclusion predicate for index actions.
pub type Predicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Produces the document id for a row.
pub type IdGenerator<R> = Arc<dyn Fn(&R) -> String + Send + Sync>;

/// Identifies a record of some document type without holding it.
///
/// Used as the "related instance to ignore" token: when two document types
/// reference each other through a relation, the instance preparing one side
/// passes its own identity down so the other side's extraction does not
/// recurse back into it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordRef {
    /// The record's type name.
    pub kind: &'static str,
    /// The record's primary key.
    pub pk: i64,
}

impl RecordRef {
    /// Create a reference to the record of type `kind` with key `pk`.
    pub fn new(kind: &'static str, pk: i64) -> Self {
        Self { kind, pk }
    }
}

/// A row whose attributes can be projected into a document.
pub trait ProjectableRecord: IndexableRecord {
    /// Extract the named attribute as a JSON value.
    ///
    /// `related_to_ignore`, when set, names a related record the extraction
    /// must skip when following relations (cycle breaking). Attributes that
    /// do not exist should come back as `Value::Null`.
    fn attribute(&self, name: &str, related_to_ignore: Option<&RecordRef>) -> Value;
}

/// One named field of a document: its search field type and the source
/// attribute it projects by default.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// The field name in the document.
    pub name: String,
    /// The field's type in the search index.
    pub field_type: SearchFieldType,
    /// The source attribute projected by the default preparer. Defaults to
    /// the field name.
    pub attr: String,
}

impl FieldSpec {
    /// Declare a field with an explicit search field type.
    pub fn new(name: impl Into<String>, field_type: SearchFieldType) -> Self {
        let name = name.into();
        let attr = name.clone();
        Self {
            name,
            field_type,
            attr,
        }
    }

    /// Declare a field by mapping a model field kind through the table.
    ///
    /// Fails with `FieldNotMappedError` for kinds absent from the table.
    pub fn mapped(
        name: impl Into<String>,
        kind: ModelFieldKind,
    ) -> Result<Self, FieldNotMappedError> {
        Ok(Self::new(name, search_field_type(kind)?))
    }

    /// Project from a source attribute other than the field name.
    pub fn with_attr(mut self, attr: impl Into<String>) -> Self {
        self.attr = attr.into();
        self
    }
}

/// Builder for a `DocumentDefinition`.
///
/// Custom preparers are registered here by field name and resolved exactly
/// once when a `Document` is constructed; nothing is looked up by name at
/// prepare time.
pub struct DocumentBuilder<R> {
    alias: String,
    page_size: usize,
    auto_refresh: bool,
    fields: Vec<FieldSpec>,
    preparers: HashMap<String, Projector<R>>,
    related_preparers: HashMap<String, RelatedProjector<R>>,
    should_index: Option<Predicate<R>>,
    id_generator: Option<IdGenerator<R>>,
    event_sink: Option<Arc<dyn IndexEventSink>>,
}

impl<R> DocumentBuilder<R>
where
    R: ProjectableRecord,
{
    /// Start a definition for documents stored under `alias`.
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            page_size: DEFAULT_PAGE_SIZE,
            auto_refresh: false,
            fields: Vec::new(),
            preparers: HashMap::new(),
            related_preparers: HashMap::new(),
            should_index: None,
            id_generator: None,
            event_sink: None,
        }
    }

    /// Set the page size used for cursor iteration and parallel chunking.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Request an index refresh after every update by default. An explicit
    /// refresh flag on the update call still wins.
    pub fn auto_refresh(mut self, auto_refresh: bool) -> Self {
        self.auto_refresh = auto_refresh;
        self
    }

    /// Add a field.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Add a field by mapping a model field kind through the table.
    pub fn mapped_field(
        self,
        name: impl Into<String>,
        kind: ModelFieldKind,
    ) -> Result<Self, FieldNotMappedError> {
        Ok(self.field(FieldSpec::mapped(name, kind)?))
    }

    /// Register a custom preparer for a field.
    pub fn prepare_with<F>(mut self, name: impl Into<String>, preparer: F) -> Self
    where
        F: Fn(&R) -> Value + Send + Sync + 'static,
    {
        self.preparers.insert(name.into(), Arc::new(preparer));
        self
    }

    /// Register a related-aware preparer for a field.
    ///
    /// Takes priority over a plain preparer for the same field. The second
    /// argument is the document instance's "related record to ignore" token.
    pub fn prepare_with_related<F>(mut self, name: impl Into<String>, preparer: F) -> Self
    where
        F: Fn(&R, Option<&RecordRef>) -> Value + Send + Sync + 'static,
    {
        self.related_preparers.insert(name.into(), Arc::new(preparer));
        self
    }

    /// Override the per-row inclusion predicate (default: index everything).
    /// Delete actions are never filtered by this predicate.
    pub fn should_index<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.should_index = Some(Arc::new(predicate));
        self
    }

    /// Override document id generation (default: the row's primary key).
    pub fn generate_id<F>(mut self, generator: F) -> Self
    where
        F: Fn(&R) -> String + Send + Sync + 'static,
    {
        self.id_generator = Some(Arc::new(generator));
        self
    }

    /// Attach a post-index event sink (default: no-op).
    pub fn event_sink(mut self, sink: Arc<dyn IndexEventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Finish the definition. The result is immutable.
    pub fn build(self) -> Arc<DocumentDefinition<R>> {
        Arc::new(DocumentDefinition {
            alias: self.alias,
            page_size: self.page_size,
            auto_refresh: self.auto_refresh,
            fields: self.fields,
            preparers: self.preparers,
            related_preparers: self.related_preparers,
            should_index: self
                .should_index
                .unwrap_or_else(|| Arc::new(|_row: &R| true)),
            id_generator: self
                .id_generator
                .unwrap_or_else(|| Arc::new(|row: &R| row.pk().to_string())),
            event_sink: self.event_sink.unwrap_or_else(|| Arc::new(NoopEventSink)),
        })
    }
}

/// The immutable shape of one search document type.
///
/// Built once through `DocumentBuilder`; shared between `Document` instances
/// behind an `Arc`.
pub struct DocumentDefinition<R> {
    alias: String,
    page_size: usize,
    auto_refresh: bool,
    fields: Vec<FieldSpec>,
    preparers: HashMap<String, Projector<R>>,
    related_preparers: HashMap<String, RelatedProjector<R>>,
    pub(crate) should_index: Predicate<R>,
    pub(crate) id_generator: IdGenerator<R>,
    pub(crate) event_sink: Arc<dyn IndexEventSink>,
}

impl<R> DocumentDefinition<R>
where
    R: ProjectableRecord,
{
    /// The index alias this document type is defined against.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Page size for cursor iteration and parallel chunking.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Whether updates refresh the index by default.
    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    /// The declared fields, in order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Whether a hit from the concrete index named `index_name` belongs to
    /// this document type.
    ///
    /// Documents come back from the engine tagged with the concrete, often
    /// rotated, physical index while the definition holds the stable alias,
    /// so membership is a glob match of `<alias>*` against the hit's index.
    pub fn matches_index(&self, index_name: &str) -> bool {
        WildMatch::new(&format!("{}*", self.alias)).matches(index_name)
    }

    /// Render the index mappings body for this document type.
    pub fn mappings_body(&self) -> Value {
        let mut properties = Map::new();
        for spec in &self.fields {
            properties.insert(spec.name.clone(), json!({ "type": spec.field_type.name() }));
        }
        json!({ "mappings": { "properties": properties } })
    }
}

/// One resolved field of a document instance: name, spec, and the bound
/// projector invoked for every row.
struct PreparedField<R> {
    name: String,
    projector: Projector<R>,
}

/// A per-use instance of a document definition.
///
/// Construction resolves the definition's preparers into a fixed ordered
/// projector list; `prepare` then just runs the list.
///
/// # Equality
///
/// Documents are ephemeral projections, so equality and hashing are by
/// in-memory identity: an instance equals only itself, never another
/// instance built from the same definition. This is a deliberate policy,
/// not an omission.
pub struct Document<R> {
    definition: Arc<DocumentDefinition<R>>,
    prepared: Vec<PreparedField<R>>,
}

impl<R> Document<R>
where
    R: ProjectableRecord + 'static,
{
    /// Instantiate a document with no related record to ignore.
    pub fn new(definition: Arc<DocumentDefinition<R>>) -> Self {
        Self::with_related_to_ignore(definition, None)
    }

    /// Instantiate a document that skips `related_to_ignore` during
    /// attribute extraction, breaking recursion between mutually related
    /// document types.
    ///
    /// Projector resolution happens here, once: a related-aware preparer
    /// wins over a plain preparer, which wins over default attribute
    /// extraction. The resolved list is cached on the instance and never
    /// recomputed.
    pub fn with_related_to_ignore(
        definition: Arc<DocumentDefinition<R>>,
        related_to_ignore: Option<RecordRef>,
    ) -> Self {
        let mut prepared = Vec::with_capacity(definition.fields.len());

        for spec in &definition.fields {
            let projector: Projector<R> =
                if let Some(preparer) = definition.related_preparers.get(&spec.name) {
                    let preparer = Arc::clone(preparer);
                    let ignore = related_to_ignore.clone();
                    Arc::new(move |row: &R| (*preparer)(row, ignore.as_ref()))
                } else if let Some(preparer) = definition.preparers.get(&spec.name) {
                    Arc::clone(preparer)
                } else {
                    let attr = spec.attr.clone();
                    let ignore = related_to_ignore.clone();
                    Arc::new(move |row: &R| row.attribute(&attr, ignore.as_ref()))
                };

            prepared.push(PreparedField {
                name: spec.name.clone(),
                projector,
            });
        }

        Self {
            definition,
            prepared,
        }
    }

    /// The definition this instance was built from.
    pub fn definition(&self) -> &DocumentDefinition<R> {
        &self.definition
    }

    /// Project a row into a document body, one entry per declared field.
    ///
    /// Runs the projectors resolved at construction; no per-call lookups.
    pub fn prepare(&self, row: &R) -> Map<String, Value> {
        let mut data = Map::with_capacity(self.prepared.len());
        for field in &self.prepared {
            data.insert(field.name.clone(), (*field.projector)(row));
        }
        data
    }

    /// Build the bulk action for one row, or `None` when the inclusion
    /// predicate excludes it. Deletes are always emitted and never consult
    /// the predicate.
    pub(crate) fn action_for(&self, row: &R, op: OpType) -> Option<BulkAction> {
        if op != OpType::Delete && !(*self.definition.should_index)(row) {
            return None;
        }

        let id = (*self.definition.id_generator)(row);
        let source = match op {
            OpType::Delete => None,
            _ => Some(Value::Object(self.prepare(row))),
        };

        Some(BulkAction {
            op_type: op,
            index: self.definition.alias.clone(),
            id,
            source,
        })
    }

    /// Lazily map rows into bulk actions for `op`, applying the inclusion
    /// predicate for non-delete operations.
    pub fn bulk_actions<'a>(
        &'a self,
        rows: &'a [R],
        op: OpType,
    ) -> impl Iterator<Item = BulkAction> + 'a {
        rows.iter().filter_map(move |row| self.action_for(row, op))
    }
}

impl<R> std::fmt::Debug for Document<R>
where
    R: ProjectableRecord,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("alias", &self.definition.alias())
            .finish_non_exhaustive()
    }
}

impl<R> PartialEq for Document<R> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl<R> Eq for Document<R> {}

impl<R> Hash for Document<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self as *const Self as usize).hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone)]
    struct Article {
        pk: i64,
        title: String,
        views: i64,
        published: bool,
    }

    impl IndexableRecord for Article {
        fn pk(&self) -> i64 {
            self.pk
        }
    }

    impl ProjectableRecord for Article {
        fn attribute(&self, name: &str, _related_to_ignore: Option<&RecordRef>) -> Value {
            match name {
                "title" => json!(self.title),
                "views" => json!(self.views),
                "published" => json!(self.published),
                _ => Value::Null,
            }
        }
    }

    fn article(pk: i64) -> Article {
        Article {
            pk,
            title: format!("article {}", pk),
            views: pk * 10,
            published: true,
        }
    }

    fn basic_definition() -> Arc<DocumentDefinition<Article>> {
        DocumentBuilder::new("articles")
            .mapped_field("title", ModelFieldKind::Char)
            .unwrap()
            .mapped_field("views", ModelFieldKind::BigInteger)
            .unwrap()
            .build()
    }

    #[test]
    fn test_prepare_uses_default_attribute_extraction() {
        let doc = Document::new(basic_definition());

        let data = doc.prepare(&article(1));

        assert_eq!(data.get("title"), Some(&json!("article 1")));
        assert_eq!(data.get("views"), Some(&json!(10)));
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_custom_preparer_overrides_default() {
        let definition = DocumentBuilder::new("articles")
            .mapped_field("title", ModelFieldKind::Char)
            .unwrap()
            .prepare_with("title", |row: &Article| json!(row.title.to_uppercase()))
            .build();
        let doc = Document::new(definition);

        let data = doc.prepare(&article(1));

        assert_eq!(data.get("title"), Some(&json!("ARTICLE 1")));
    }

    #[test]
    fn test_related_preparer_wins_over_plain_preparer() {
        let definition = DocumentBuilder::new("articles")
            .mapped_field("title", ModelFieldKind::Char)
            .unwrap()
            .prepare_with("title", |_row: &Article| json!("plain"))
            .prepare_with_related("title", |_row: &Article, ignore| {
                json!(ignore.map(|r| r.pk).unwrap_or(-1))
            })
            .build();

        let plain = Document::new(Arc::clone(&definition));
        assert_eq!(plain.prepare(&article(1)).get("title"), Some(&json!(-1)));

        let ignoring = Document::with_related_to_ignore(
            definition,
            Some(RecordRef::new("author", 42)),
        );
        assert_eq!(ignoring.prepare(&article(1)).get("title"), Some(&json!(42)));
    }

    #[test]
    fn test_field_spec_with_attr_projects_other_attribute() {
        let definition = DocumentBuilder::new("articles")
            .field(FieldSpec::new("headline", SearchFieldType::Text).with_attr("title"))
            .build();
        let doc = Document::new(definition);

        let data = doc.prepare(&article(3));

        assert_eq!(data.get("headline"), Some(&json!("article 3")));
    }

    #[test]
    fn test_unmapped_kind_fails_at_definition_time() {
        let result = DocumentBuilder::<Article>::new("articles").mapped_field("raw", ModelFieldKind::Json);

        assert!(matches!(
            result,
            Err(FieldNotMappedError {
                kind: ModelFieldKind::Json
            })
        ));
    }

    #[test]
    fn test_default_generate_id_is_pk() {
        let doc = Document::new(basic_definition());

        let action = doc.action_for(&article(7), OpType::Index).unwrap();

        assert_eq!(action.id, "7");
    }

    #[test]
    fn test_generate_id_override_changes_only_id() {
        let definition = DocumentBuilder::new("articles")
            .mapped_field("title", ModelFieldKind::Char)
            .unwrap()
            .generate_id(|row: &Article| format!("article-{}", row.pk))
            .build();
        let doc = Document::new(Arc::clone(&definition));
        let baseline = Document::new(basic_definition());

        let action = doc.action_for(&article(7), OpType::Index).unwrap();
        let base = baseline.action_for(&article(7), OpType::Index).unwrap();

        assert_eq!(action.id, "article-7");
        assert_eq!(action.op_type, base.op_type);
        assert_eq!(action.index, base.index);
        assert_eq!(
            action.source.as_ref().unwrap().get("title"),
            base.source.as_ref().unwrap().get("title")
        );
    }

    #[test]
    fn test_should_index_excludes_from_index_but_not_delete() {
        let definition = DocumentBuilder::new("articles")
            .mapped_field("title", ModelFieldKind::Char)
            .unwrap()
            .should_index(|row: &Article| row.published)
            .build();
        let doc = Document::new(definition);

        let mut unpublished = article(5);
        unpublished.published = false;

        assert!(doc.action_for(&unpublished, OpType::Index).is_none());
        assert!(doc.action_for(&unpublished, OpType::Delete).is_some());
    }

    #[test]
    fn test_delete_never_calls_should_index() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let definition = DocumentBuilder::new("articles")
            .mapped_field("title", ModelFieldKind::Char)
            .unwrap()
            .should_index(move |_row: &Article| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            })
            .build();
        let doc = Document::new(definition);

        let action = doc.action_for(&article(7), OpType::Delete).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(action.op_type, OpType::Delete);
        assert_eq!(action.id, "7");
        assert!(action.source.is_none());
    }

    #[test]
    fn test_bulk_actions_filters_rows() {
        let definition = DocumentBuilder::new("articles")
            .mapped_field("title", ModelFieldKind::Char)
            .unwrap()
            .should_index(|row: &Article| row.pk % 2 == 0)
            .build();
        let doc = Document::new(definition);
        let rows: Vec<Article> = (1..=6).map(article).collect();

        let actions: Vec<BulkAction> = doc.bulk_actions(&rows, OpType::Index).collect();

        let ids: Vec<&str> = actions.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4", "6"]);

        let deletes: Vec<BulkAction> = doc.bulk_actions(&rows, OpType::Delete).collect();
        assert_eq!(deletes.len(), 6);
    }

    #[test]
    fn test_identity_equality() {
        let definition = basic_definition();
        let a = Document::new(Arc::clone(&definition));
        let b = Document::new(definition);

        let same = &a;
        assert_eq!(same, &a);
        assert_ne!(a, b);
    }

    #[test]
    fn test_matches_index_globs_alias_prefix() {
        let definition = basic_definition();

        assert!(definition.matches_index("articles"));
        assert!(definition.matches_index("articles-2026.08.29-000002"));
        assert!(!definition.matches_index("article"));
        assert!(!definition.matches_index("users-000001"));
    }

    #[test]
    fn test_mappings_body() {
        let definition = basic_definition();

        assert_eq!(
            definition.mappings_body(),
            json!({
                "mappings": {
                    "properties": {
                        "title": {"type": "text"},
                        "views": {"type": "long"},
                    }
                }
            })
        );
    }
}
