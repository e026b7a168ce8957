//! Record and collection traits
//!
//! A [`Collection`] describes what callers may do with its records: which
//! fields can be filtered (and how their operands are typed), which fields
//! the free-text search covers, and the closed set of sortable fields.

use crate::core::field::{FieldKind, FieldValue};
use crate::core::sort::SortField;
use serde::Serialize;
use uuid::Uuid;

/// A single row of a collection.
///
/// Records are serialized as-is into the `data` array of a page, so dates
/// should be `chrono::DateTime<Utc>` to come out as ISO-8601 strings.
pub trait Record: Clone + Serialize + Send + Sync + 'static {
    /// Unique identifier, also used as the tie-breaking sort key
    fn id(&self) -> Uuid;

    /// Value of a named field, `None` if the record has no such field
    fn field_value(&self, field: &str) -> Option<FieldValue>;
}

/// One row of a collection's filter allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// A queryable collection of records
///
/// # Example
///
/// ```rust,ignore
/// struct Tasks;
///
/// impl Collection for Tasks {
///     type Record = Task;
///     type Sort = TaskSort;
///
///     fn resource_name() -> &'static str {
///         "tasks"
///     }
///
///     fn filterable_fields() -> &'static [FieldSpec] {
///         &[
///             FieldSpec::new("status", FieldKind::String),
///             FieldSpec::new("due_date", FieldKind::DateTime),
///         ]
///     }
///
///     fn search_fields() -> &'static [&'static str] {
///         &["title", "description"]
///     }
/// }
/// ```
pub trait Collection: Send + Sync + 'static {
    /// The record type stored in this collection
    type Record: Record;

    /// The closed set of fields this collection can be sorted by
    type Sort: SortField;

    /// The plural resource name used in URLs (e.g., "tasks")
    fn resource_name() -> &'static str;

    /// Fields callers may filter on
    fn filterable_fields() -> &'static [FieldSpec];

    /// Fields covered by the free-text `search` parameter
    fn search_fields() -> &'static [&'static str] {
        &[]
    }

    /// Look up a filterable field by name
    fn filter_spec(name: &str) -> Option<FieldSpec> {
        Self::filterable_fields()
            .iter()
            .find(|spec| spec.name == name)
            .copied()
    }
}
