//! Field type mapping.
//!
//! A static table from model field kinds to search field types. Lookup is
//! keyed on the exact kind with no fallback: a kind absent from the table is
//! a `FieldNotMappedError` at schema-definition time, never a silent default.

use thiserror::Error;

/// The column kinds a model field can have at the data source.
///
/// The set is closed on purpose: the mapping table below covers exactly the
/// kinds a document definition may project, and anything else (json, binary,
/// duration, ip address, relation) is rejected. Callers needing custom
/// behavior for those kinds must declare the search field type themselves
/// via [`FieldSpec::new`](crate::document::FieldSpec::new) instead of going
/// through the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFieldKind {
    /// Auto-incrementing integer key.
    AutoKey,
    /// Auto-incrementing 64-bit key.
    BigAutoKey,
    /// 64-bit integer.
    BigInteger,
    /// Boolean flag.
    Boolean,
    /// Bounded character column.
    Char,
    /// Calendar date.
    Date,
    /// Date with time of day.
    DateTime,
    /// Fixed-precision decimal.
    Decimal,
    /// Email address.
    Email,
    /// Uploaded file reference.
    File,
    /// Filesystem path.
    FilePath,
    /// Floating point number.
    Float,
    /// Uploaded image reference.
    Image,
    /// 32-bit integer.
    Integer,
    /// Boolean flag that may be null.
    NullableBoolean,
    /// Non-negative 32-bit integer.
    PositiveInteger,
    /// Non-negative 16-bit integer.
    PositiveSmallInteger,
    /// URL-safe slug.
    Slug,
    /// 16-bit integer.
    SmallInteger,
    /// Unbounded text column.
    Text,
    /// Time of day without a date.
    Time,
    /// URL.
    Url,
    /// UUID.
    Uuid,
    /// Arbitrary JSON column. Not mapped.
    Json,
    /// Raw binary column. Not mapped.
    Binary,
    /// Time interval. Not mapped.
    Duration,
    /// IP address column. Not mapped.
    IpAddress,
    /// Foreign key or other relation. Not mapped.
    Relation,
}

/// The field types a document can declare in the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchFieldType {
    /// Analyzed full-text field.
    Text,
    /// Exact-match keyword field.
    Keyword,
    /// 32-bit integer field.
    Integer,
    /// 64-bit integer field.
    Long,
    /// 16-bit integer field.
    Short,
    /// Double-precision float field.
    Double,
    /// Boolean field.
    Boolean,
    /// Date field (also carries datetimes).
    Date,
    /// Time-of-day field, indexed as text.
    Time,
    /// File reference field, indexed as text (the stored value is the URL).
    File,
}

impl SearchFieldType {
    /// The type name used in the index mappings body.
    pub fn name(&self) -> &'static str {
        match self {
            SearchFieldType::Text => "text",
            SearchFieldType::Keyword => "keyword",
            SearchFieldType::Integer => "integer",
            SearchFieldType::Long => "long",
            SearchFieldType::Short => "short",
            SearchFieldType::Double => "double",
            SearchFieldType::Boolean => "boolean",
            SearchFieldType::Date => "date",
            SearchFieldType::Time => "text",
            SearchFieldType::File => "text",
        }
    }
}

/// A model field kind with no entry in the field mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot map model field kind {kind:?} to a search field")]
pub struct FieldNotMappedError {
    /// The kind that failed to map.
    pub kind: ModelFieldKind,
}

/// Look up the search field type for a model field kind.
///
/// Exact-kind table lookup. No coercion, no fallback: an unmapped kind
/// returns `FieldNotMappedError` so schema problems surface at definition
/// time rather than at submission time.
pub fn search_field_type(kind: ModelFieldKind) -> Result<SearchFieldType, FieldNotMappedError> {
    let field_type = match kind {
        ModelFieldKind::AutoKey => SearchFieldType::Integer,
        ModelFieldKind::BigAutoKey => SearchFieldType::Long,
        ModelFieldKind::BigInteger => SearchFieldType::Long,
        ModelFieldKind::Boolean => SearchFieldType::Boolean,
        ModelFieldKind::Char => SearchFieldType::Text,
        ModelFieldKind::Date => SearchFieldType::Date,
        ModelFieldKind::DateTime => SearchFieldType::Date,
        ModelFieldKind::Decimal => SearchFieldType::Double,
        ModelFieldKind::Email => SearchFieldType::Text,
        ModelFieldKind::File => SearchFieldType::File,
        ModelFieldKind::FilePath => SearchFieldType::Keyword,
        ModelFieldKind::Float => SearchFieldType::Double,
        ModelFieldKind::Image => SearchFieldType::File,
        ModelFieldKind::Integer => SearchFieldType::Integer,
        ModelFieldKind::NullableBoolean => SearchFieldType::Boolean,
        ModelFieldKind::PositiveInteger => SearchFieldType::Integer,
        ModelFieldKind::PositiveSmallInteger => SearchFieldType::Short,
        ModelFieldKind::Slug => SearchFieldType::Keyword,
        ModelFieldKind::SmallInteger => SearchFieldType::Short,
        ModelFieldKind::Text => SearchFieldType::Text,
        ModelFieldKind::Time => SearchFieldType::Time,
        ModelFieldKind::Url => SearchFieldType::Text,
        ModelFieldKind::Uuid => SearchFieldType::Keyword,
        ModelFieldKind::Json
        | ModelFieldKind::Binary
        | ModelFieldKind::Duration
        | ModelFieldKind::IpAddress
        | ModelFieldKind::Relation => return Err(FieldNotMappedError { kind }),
    };

    Ok(field_type)
}
