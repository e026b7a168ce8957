//! Shared test harness for record store testing
//!
//! Provides `TestTask`, the `TestTasks` collection over it, a deterministic
//! seed of 25 open and 10 closed tasks, and the `record_store_tests!` macro
//! every backend runs.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//!
//! record_store_tests!(seeded_store);
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod integration;

use chrono::{DateTime, Duration, TimeZone, Utc};
use indexmap::IndexMap;
use pagequery::core::filter::{FilterBuilder, FilterPolicy, WhereClause};
use pagequery::prelude::*;
use serde_json::Value;

pagequery::sort_fields! {
    pub enum TestTaskSort {
        CreatedAt => "created_at",
        DueDate => "due_date",
        Priority => "priority",
        Title => "title",
    }
    default CreatedAt
}

/// A task with fields spanning the filterable kinds.
///
/// - `title`: String (search, contains)
/// - `status`: String (equality, sets)
/// - `priority`: i64 (ranges, sorting with ties)
/// - `due_date`: optional DateTime (date ranges, null placement)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct TestTask {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub priority: i64,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pagequery::impl_record!(TestTask, id, {
    "title" => title,
    "status" => status,
    "priority" => priority,
    "due_date" => due_date,
    "created_at" => created_at,
});

pub struct TestTasks;

impl Collection for TestTasks {
    type Record = TestTask;
    type Sort = TestTaskSort;

    fn resource_name() -> &'static str {
        "test_tasks"
    }

    fn filterable_fields() -> &'static [FieldSpec] {
        const { &[
            FieldSpec::new("status", FieldKind::String),
            FieldSpec::new("priority", FieldKind::Integer),
            FieldSpec::new("due_date", FieldKind::DateTime),
            FieldSpec::new("title", FieldKind::String),
        ] }
    }

    fn search_fields() -> &'static [&'static str] {
        &["title", "status"]
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Task `n`: ids are `Uuid::from_u128(n)`, so id order is `n` order.
///
/// Every tenth task has no due date.
pub fn make_task(n: u128, status: &str) -> TestTask {
    TestTask {
        id: Uuid::from_u128(n),
        title: format!("Task {:02}", n),
        status: status.to_string(),
        priority: (n % 5) as i64,
        due_date: (n % 10 != 0).then(|| base_time() + Duration::days((n % 7) as i64)),
        created_at: base_time() + Duration::minutes(n as i64),
    }
}

/// Tasks 1..=25 are open, 26..=35 are closed.
pub fn seed_tasks() -> Vec<TestTask> {
    (1..=35)
        .map(|n| make_task(n, if n <= 25 { "open" } else { "closed" }))
        .collect()
}

pub fn where_clause(filters: Value, search: Option<&str>) -> WhereClause {
    let filters: IndexMap<String, Value> = serde_json::from_value(filters).unwrap();
    FilterBuilder::<TestTasks>::new(FilterPolicy::Reject)
        .filters(&filters)
        .unwrap()
        .search(search)
        .build()
}

pub fn order(column: &'static str, direction: SortDirection) -> OrderBy {
    OrderBy {
        column,
        direction,
        tiebreak: "id",
    }
}

pub fn ids(tasks: &[TestTask]) -> Vec<u128> {
    tasks.iter().map(|t| t.id.as_u128()).collect()
}

/// Generate the record store conformance suite for a backend.
///
/// `$seeded_store` must be an async fn taking `Vec<TestTask>` and returning
/// an `impl RecordStore<TestTask>` holding exactly those tasks.
#[macro_export]
macro_rules! record_store_tests {
    ($seeded_store:expr) => {
        mod record_store_tests {
            use super::*;
            use pagequery::core::store::RecordStore;
            use pagequery::core::sort::SortDirection;
            use serde_json::json;

            #[tokio::test]
            async fn test_count_all_and_filtered() {
                let store = $seeded_store(seed_tasks()).await;

                assert_eq!(store.count(&where_clause(json!({}), None)).await.unwrap(), 35);
                assert_eq!(
                    store
                        .count(&where_clause(json!({"status": "open"}), None))
                        .await
                        .unwrap(),
                    25
                );
            }

            #[tokio::test]
            async fn test_find_many_respects_skip_and_take() {
                let store = $seeded_store(seed_tasks()).await;
                let filter = where_clause(json!({"status": "open"}), None);
                let by_created = order("created_at", SortDirection::Asc);

                let page = store.find_many(&filter, &by_created, 10, 10).await.unwrap();
                assert_eq!(ids(&page), (11..=20).collect::<Vec<u128>>());

                let tail = store.find_many(&filter, &by_created, 20, 10).await.unwrap();
                assert_eq!(ids(&tail), (21..=25).collect::<Vec<u128>>());

                let past_end = store.find_many(&filter, &by_created, 30, 10).await.unwrap();
                assert!(past_end.is_empty());
            }

            #[tokio::test]
            async fn test_ties_break_on_id_ascending() {
                let store = $seeded_store(seed_tasks()).await;
                let all = where_clause(json!({}), None);

                let desc = store
                    .find_many(&all, &order("priority", SortDirection::Desc), 0, 100)
                    .await
                    .unwrap();
                for pair in desc.windows(2) {
                    assert!(pair[0].priority >= pair[1].priority);
                    if pair[0].priority == pair[1].priority {
                        assert!(pair[0].id < pair[1].id);
                    }
                }
            }

            #[tokio::test]
            async fn test_missing_values_first_ascending_last_descending() {
                let store = $seeded_store(seed_tasks()).await;
                let all = where_clause(json!({}), None);

                let asc = store
                    .find_many(&all, &order("due_date", SortDirection::Asc), 0, 3)
                    .await
                    .unwrap();
                assert_eq!(ids(&asc), vec![10, 20, 30]);

                let desc = store
                    .find_many(&all, &order("due_date", SortDirection::Desc), 32, 3)
                    .await
                    .unwrap();
                assert_eq!(ids(&desc), vec![10, 20, 30]);
            }

            #[tokio::test]
            async fn test_set_and_range_predicates() {
                let store = $seeded_store(seed_tasks()).await;

                let in_set = where_clause(json!({"priority": [0, 4]}), None);
                let rows = store
                    .find_many(&in_set, &order("created_at", SortDirection::Asc), 0, 100)
                    .await
                    .unwrap();
                assert!(rows.iter().all(|t| t.priority == 0 || t.priority == 4));
                assert_eq!(store.count(&in_set).await.unwrap(), rows.len());

                let dates = where_clause(
                    json!({"due_date": {"gte": "2024-01-02", "lte": "2024-01-03T00:00:00Z"}}),
                    None,
                );
                let rows = store
                    .find_many(&dates, &order("created_at", SortDirection::Asc), 0, 100)
                    .await
                    .unwrap();
                assert!(!rows.is_empty());
                for t in &rows {
                    let due = t.due_date.unwrap();
                    assert!(due >= base_time() + chrono::Duration::days(1));
                    assert!(due <= base_time() + chrono::Duration::days(2));
                }
            }

            #[tokio::test]
            async fn test_contains_and_search_are_case_insensitive() {
                let store = $seeded_store(seed_tasks()).await;

                let contains = where_clause(json!({"title": {"contains": "TASK 0"}}), None);
                assert_eq!(store.count(&contains).await.unwrap(), 9);

                let search = where_clause(json!({}), Some("CLOSED"));
                assert_eq!(store.count(&search).await.unwrap(), 10);
            }

            #[tokio::test]
            async fn test_empty_set_matches_nothing() {
                let store = $seeded_store(seed_tasks()).await;
                let none = where_clause(json!({"status": {"in": []}}), None);
                assert_eq!(store.count(&none).await.unwrap(), 0);
            }
        }
    };
}
