//! Core module containing the query engine and the types it works on

pub mod engine;
pub mod error;
pub mod field;
pub mod filter;
pub mod query;
pub mod record;
pub mod sort;
pub mod store;
pub mod tristate;

pub use engine::{PaginatedQueryEngine, QueryPlan};
pub use error::{QueryError, QueryResult};
pub use field::{FieldKind, FieldValue};
pub use filter::{FilterBuilder, FilterPolicy, Predicate, WhereClause};
pub use query::{PageRequest, PageResult, PageWindow, PaginationMeta, SortInput};
pub use record::{Collection, FieldSpec, Record};
pub use sort::{OrderBy, SortDirection, SortField, SortSpec};
pub use store::RecordStore;
pub use tristate::Tristate;
