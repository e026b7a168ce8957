//! Sorting: closed sort-field enumerations and the resolved order-by

use crate::core::record::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Column used to break ties on the primary sort field
pub const TIEBREAK_COLUMN: &str = "id";

/// A closed enumeration of the fields a collection can be sorted by
///
/// Implement it with the [`sort_fields!`](crate::sort_fields) macro rather
/// than by hand.
pub trait SortField: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Every sortable field
    fn all() -> &'static [Self];

    /// Column (record field) name backing this variant
    fn column(self) -> &'static str;

    /// Field used when the caller gives none or an unknown one
    fn default_field() -> Self;

    /// Resolve a caller-supplied name
    fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|f| f.column() == name)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse `asc`/`desc` case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Asc),
            "desc" | "descending" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A sort field of collection `F` plus a direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<F: SortField> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: SortField> SortSpec<F> {
    pub fn new(field: F, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Resolve loosely typed caller input.
    ///
    /// An unknown or missing field falls back to `F::default_field()`; an
    /// unknown or missing direction falls back to descending.
    pub fn resolve(field: Option<&str>, direction: Option<&str>) -> Self {
        let field = field.and_then(F::parse).unwrap_or_else(F::default_field);
        let direction = direction
            .and_then(SortDirection::parse)
            .unwrap_or_default();
        Self { field, direction }
    }

    /// Lower into the storage-facing order-by
    pub fn order_by(&self) -> OrderBy {
        OrderBy {
            column: self.field.column(),
            direction: self.direction,
            tiebreak: TIEBREAK_COLUMN,
        }
    }
}

impl<F: SortField> Default for SortSpec<F> {
    fn default() -> Self {
        Self::new(F::default_field(), SortDirection::default())
    }
}

/// Storage-facing ordering: primary column, direction, and a unique
/// tie-breaking column that is always ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub direction: SortDirection,
    pub tiebreak: &'static str,
}

impl OrderBy {
    /// Compare two records.
    ///
    /// Missing values sort first ascending and last descending; ties fall
    /// back to the record id, ascending in both directions.
    pub fn compare<R: Record>(&self, a: &R, b: &R) -> Ordering {
        let av = a.field_value(self.column);
        let bv = b.field_value(self.column);

        let primary = match (&av, &bv) {
            (Some(x), Some(y)) => x.compare(y),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };

        let primary = match self.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };

        primary.then_with(|| a.id().cmp(&b.id()))
    }
}
