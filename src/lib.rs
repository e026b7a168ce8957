//! # pagequery
//!
//! Filtered, sorted and paginated list queries over arbitrary record
//! collections, exposed as REST list endpoints.
//!
//! ## Features
//!
//! - **Allow-listed filters**: each collection declares which fields can be
//!   filtered and how their operands are typed
//! - **Closed sort fields**: sortable columns are an enum, never a raw string
//! - **Stable paging**: ties on the sort field are broken by record id
//! - **Uniform envelope**: every list returns `{ pagination, data }`
//! - **Pluggable storage**: in-memory out of the box, PostgreSQL behind the
//!   `postgres` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagequery::prelude::*;
//!
//! sort_fields! {
//!     pub enum TaskSort {
//!         CreatedAt => "created_at",
//!         DueDate => "due_date",
//!     }
//!     default CreatedAt
//! }
//!
//! #[derive(Clone, Serialize)]
//! pub struct Task {
//!     id: Uuid,
//!     title: String,
//!     status: String,
//!     due_date: Option<DateTime<Utc>>,
//!     created_at: DateTime<Utc>,
//! }
//!
//! impl_record!(Task, id, {
//!     "title" => title,
//!     "status" => status,
//!     "due_date" => due_date,
//!     "created_at" => created_at,
//! });
//!
//! pub struct Tasks;
//!
//! impl Collection for Tasks {
//!     type Record = Task;
//!     type Sort = TaskSort;
//!
//!     fn resource_name() -> &'static str {
//!         "tasks"
//!     }
//!
//!     fn filterable_fields() -> &'static [FieldSpec] {
//!         &[
//!             FieldSpec::new("status", FieldKind::String),
//!             FieldSpec::new("due_date", FieldKind::DateTime),
//!         ]
//!     }
//! }
//!
//! ServerBuilder::new()
//!     .register_collection::<Tasks, _>(InMemoryRecordStore::new())?
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

pub mod collections;
pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        engine::{PaginatedQueryEngine, QueryPlan},
        error::{QueryError, QueryResult},
        field::{FieldKind, FieldValue},
        filter::{FilterPolicy, WhereClause},
        query::{PageRequest, PageResult, PaginationMeta},
        record::{Collection, FieldSpec, Record},
        sort::{OrderBy, SortDirection, SortField},
        store::RecordStore,
    };

    // === Macros ===
    pub use crate::{impl_record, sort_fields};

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryRecordStore;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresRecordStore;

    // === Config ===
    pub use crate::config::{QueryConfig, QuerySettings};

    // === Server ===
    pub use crate::server::{CollectionDescriptor, CollectionRegistry, ServerBuilder};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
