//! Page requests, page windows and the page envelope

use crate::config::QuerySettings;
use crate::core::tristate::Tristate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A list request as sent by callers
///
/// Every field is optional. Filter fields may be given either under
/// `filters` or at the top level of the body; both are merged, with
/// `filters` winning on conflicts.
///
/// # Example
/// ```json
/// {
///     "page": 2,
///     "limit": 10,
///     "filters": { "status": "open", "due_date": { "gte": "2024-01-01" } },
///     "search": "invoice",
///     "sort": { "field": "due_date", "direction": "asc" }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PageRequest {
    /// Page number (starts at 1); kept loose so malformed values normalize
    pub page: Tristate<Value>,

    /// Number of items per page; kept loose so malformed values normalize
    pub limit: Tristate<Value>,

    /// Filters keyed by field name
    pub filters: Tristate<IndexMap<String, Value>>,

    /// Free-text search across the collection's search fields
    pub search: Tristate<String>,

    /// Sort field and direction
    pub sort: Tristate<SortInput>,

    /// Filter fields given at the top level of the body
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl PageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = Tristate::Present(Value::from(page));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Tristate::Present(Value::from(limit));
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: Value) -> Self {
        let mut filters = match self.filters {
            Tristate::Present(filters) => filters,
            Tristate::Absent | Tristate::Null => IndexMap::new(),
        };
        filters.insert(field.into(), value);
        self.filters = Tristate::Present(filters);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Tristate::Present(term.into());
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: impl Into<String>) -> Self {
        self.sort = Tristate::Present(SortInput::Spec {
            field: Some(Value::String(field.into())),
            direction: Some(Value::String(direction.into())),
        });
        self
    }

    /// All filter entries, top-level ones first
    pub fn filter_map(&self) -> IndexMap<String, Value> {
        let mut merged = self.extra.clone();
        if let Some(filters) = self.filters.as_option() {
            for (field, value) in filters {
                merged.insert(field.clone(), value.clone());
            }
        }
        merged
    }

    /// Requested sort field and direction, unresolved
    pub fn sort_parts(&self) -> (Option<&str>, Option<&str>) {
        match self.sort.as_option() {
            Some(sort) => sort.parts(),
            None => (None, None),
        }
    }
}

/// Sort directive, either structured or as a `field:direction` string
///
/// Values of any other shape are kept as `Other` and resolve to the
/// collection's default sort.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SortInput {
    Spec {
        #[serde(default)]
        field: Option<Value>,
        #[serde(default)]
        direction: Option<Value>,
    },
    /// `field`, `field:asc` or `field:desc`
    Expr(String),
    Other(Value),
}

impl SortInput {
    /// Field and direction as strings; non-string parts read as missing
    pub fn parts(&self) -> (Option<&str>, Option<&str>) {
        match self {
            SortInput::Spec { field, direction } => (
                field.as_ref().and_then(Value::as_str),
                direction.as_ref().and_then(Value::as_str),
            ),
            SortInput::Expr(expr) => match expr.split_once(':') {
                Some((field, direction)) => (Some(field.trim()), Some(direction.trim())),
                None => (Some(expr.trim()), None),
            },
            SortInput::Other(_) => (None, None),
        }
    }
}

/// Normalized page/limit with the derived offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: usize,
    pub limit: usize,
    pub skip: usize,
}

impl PageWindow {
    /// Normalize raw page/limit input.
    ///
    /// Absent, null, non-integer and non-positive values fall back to the
    /// defaults (page 1, `settings.default_limit`); the limit is then capped
    /// at `settings.max_limit`.
    pub fn resolve(page: &Tristate<Value>, limit: &Tristate<Value>, settings: &QuerySettings) -> Self {
        let page = positive_int(page).unwrap_or(1);
        let limit = positive_int(limit)
            .unwrap_or(settings.default_limit)
            .clamp(1, settings.max_limit.max(1));

        Self {
            page,
            limit,
            skip: (page - 1).saturating_mul(limit),
        }
    }
}

fn positive_int(value: &Tristate<Value>) -> Option<usize> {
    let n = match value.as_option()? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    usize::try_from(n).ok().filter(|n| *n >= 1)
}

/// Page envelope returned by every list query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    /// Pagination metadata
    pub pagination: PaginationMeta,

    /// The records of this page
    pub data: Vec<T>,
}

impl<T> PageResult<T> {
    /// Reshape every record, keeping the metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            pagination: self.pagination,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub current: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of matching records (after filters)
    pub records: usize,

    /// Total number of pages
    pub pages: usize,
}

impl PaginationMeta {
    /// Create pagination metadata from calculation
    pub fn new(current: usize, limit: usize, records: usize) -> Self {
        // Ensure limit is at least 1 to avoid division by zero
        let limit = limit.max(1);
        let pages = if records == 0 { 0 } else { records.div_ceil(limit) };

        Self {
            current,
            limit,
            records,
            pages,
        }
    }

    /// Whether there is a next page
    pub fn has_next(&self) -> bool {
        self.current < self.pages
    }

    /// Whether there is a previous page
    pub fn has_prev(&self) -> bool {
        self.current > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings() -> QuerySettings {
        QuerySettings {
            default_limit: 20,
            max_limit: 100,
            ..QuerySettings::default()
        }
    }

    fn window(body: Value) -> PageWindow {
        let request: PageRequest = serde_json::from_value(body).unwrap();
        PageWindow::resolve(&request.page, &request.limit, &settings())
    }

    #[test]
    fn test_defaults() {
        let w = window(json!({}));
        assert_eq!((w.page, w.limit, w.skip), (1, 20, 0));
    }

    #[test]
    fn test_skip_is_page_minus_one_times_limit() {
        let w = window(json!({"page": 3, "limit": 10}));
        assert_eq!(w.skip, 20);
    }

    #[test]
    fn test_malformed_values_normalize() {
        for page in [json!(0), json!(-4), json!("abc"), json!(1.5), json!(null), json!(true)] {
            let w = window(json!({"page": page, "limit": "x"}));
            assert_eq!(w.page, 1);
            assert_eq!(w.limit, 20);
        }
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let w = window(json!({"page": "2", "limit": " 5 "}));
        assert_eq!((w.page, w.limit, w.skip), (2, 5, 5));
    }

    #[test]
    fn test_limit_is_capped() {
        let w = window(json!({"limit": 5000}));
        assert_eq!(w.limit, 100);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let w = window(json!({"page": i64::MAX, "limit": 100}));
        assert_eq!(w.skip, usize::MAX);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(1, 20, 145);
        assert_eq!(meta.records, 145);
        assert_eq!(meta.pages, 8);
        assert!(!meta.has_prev());
        assert!(meta.has_next());

        let empty = PaginationMeta::new(1, 20, 0);
        assert_eq!(empty.pages, 0);
        assert!(!empty.has_next());
    }

    #[test]
    fn test_top_level_filters_are_merged() {
        let request: PageRequest = serde_json::from_value(json!({
            "status": "open",
            "priority": 1,
            "filters": {"priority": 2},
            "page": 1
        }))
        .unwrap();

        let merged = request.filter_map();
        assert_eq!(merged.get("status"), Some(&json!("open")));
        assert_eq!(merged.get("priority"), Some(&json!(2)));
        assert!(!merged.contains_key("page"));
    }

    #[test]
    fn test_sort_input_forms() {
        let structured: PageRequest =
            serde_json::from_value(json!({"sort": {"field": "title", "direction": "asc"}})).unwrap();
        assert_eq!(structured.sort_parts(), (Some("title"), Some("asc")));

        let expr: PageRequest = serde_json::from_value(json!({"sort": "due_date:desc"})).unwrap();
        assert_eq!(expr.sort_parts(), (Some("due_date"), Some("desc")));

        let bare: PageRequest = serde_json::from_value(json!({"sort": "title"})).unwrap();
        assert_eq!(bare.sort_parts(), (Some("title"), None));

        let none: PageRequest = serde_json::from_value(json!({"sort": null})).unwrap();
        assert_eq!(none.sort_parts(), (None, None));
    }

    #[test]
    fn test_mistyped_sort_parts_read_as_missing() {
        let direction: PageRequest =
            serde_json::from_value(json!({"sort": {"field": "title", "direction": 5}})).unwrap();
        assert_eq!(direction.sort_parts(), (Some("title"), None));

        let field: PageRequest =
            serde_json::from_value(json!({"sort": {"field": ["title"], "direction": "asc"}}))
                .unwrap();
        assert_eq!(field.sort_parts(), (None, Some("asc")));

        for sort in [json!(5), json!(true), json!([1, 2, 3])] {
            let request: PageRequest = serde_json::from_value(json!({"sort": sort})).unwrap();
            assert_eq!(request.sort_parts(), (None, None));
        }
    }

    #[test]
    fn test_envelope_serialization() {
        let page = PageResult {
            pagination: PaginationMeta::new(2, 10, 25),
            data: vec![json!({"id": 1})],
        };
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(
            value,
            json!({
                "pagination": {"current": 2, "limit": 10, "records": 25, "pages": 3},
                "data": [{"id": 1}]
            })
        );
    }
}
