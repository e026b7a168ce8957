//! PostgreSQL record store using sqlx.
//!
//! Renders a [`WhereClause`] and [`OrderBy`] into parameterized SQL with
//! `sqlx::QueryBuilder`. Column names only ever come from a collection's
//! static allow-list; every operand is bound, never interpolated.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! pagequery = { version = "0.1", features = ["postgres"] }
//! ```

use crate::config::is_valid_collection_name;
use crate::core::error::{ConfigError, QueryResult, StorageError};
use crate::core::field::FieldValue;
use crate::core::filter::{Predicate, WhereClause};
use crate::core::record::Record;
use crate::core::sort::{OrderBy, SortDirection};
use crate::core::store::RecordStore;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::marker::PhantomData;

const BACKEND: &str = "postgres";

/// Record store reading one table per collection.
///
/// The table needs an `id uuid` primary key plus one column per filterable
/// or sortable field, named like the field.
pub struct PostgresRecordStore<R> {
    pool: PgPool,
    table: String,
    _marker: PhantomData<fn() -> R>,
}

impl<R> Clone for PostgresRecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            table: self.table.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R> PostgresRecordStore<R> {
    /// Create a store over `table` with the given connection pool.
    pub fn new(pool: PgPool, table: impl Into<String>) -> QueryResult<Self> {
        let table = table.into();
        if !is_valid_collection_name(&table) {
            return Err(ConfigError::InvalidValue {
                field: "table".to_string(),
                message: format!("'{}' is not a valid table name", table),
            }
            .into());
        }

        Ok(Self {
            pool,
            table,
            _marker: PhantomData,
        })
    }

    /// Connect to `url` and create a store over `table`.
    pub async fn connect(url: &str, table: impl Into<String>) -> QueryResult<Self> {
        let pool = PgPool::connect(url)
            .await
            .map_err(|e| StorageError::ConnectionError {
                backend: BACKEND.to_string(),
                message: e.to_string(),
            })?;
        Self::new(pool, table)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn select(&self, projection: &str) -> QueryBuilder<'static, Postgres> {
        QueryBuilder::new(format!("SELECT {} FROM {}", projection, quoted(&self.table)))
    }
}

#[async_trait]
impl<R> RecordStore<R> for PostgresRecordStore<R>
where
    R: Record + for<'r> FromRow<'r, PgRow> + Unpin,
{
    async fn find_many(
        &self,
        filter: &WhereClause,
        order: &OrderBy,
        skip: usize,
        take: usize,
    ) -> QueryResult<Vec<R>> {
        let mut builder = self.select("*");
        push_where(&mut builder, filter);
        push_order(&mut builder, order);
        push_window(&mut builder, skip, take);

        tracing::trace!(table = %self.table, sql = builder.sql(), "find_many");

        let rows = builder
            .build_query_as::<R>()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(rows)
    }

    async fn count(&self, filter: &WhereClause) -> QueryResult<usize> {
        let mut builder = self.select("COUNT(*)");
        push_where(&mut builder, filter);

        let total: i64 = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(usize::try_from(total).unwrap_or_default())
    }
}

fn storage_error(e: sqlx::Error) -> StorageError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StorageError::ConnectionError {
                backend: BACKEND.to_string(),
                message: e.to_string(),
            }
        }
        other => StorageError::QueryError {
            backend: BACKEND.to_string(),
            message: other.to_string(),
        },
    }
}

fn quoted(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}

fn push_where(builder: &mut QueryBuilder<'static, Postgres>, filter: &WhereClause) {
    if filter.is_empty() {
        return;
    }

    builder.push(" WHERE ");
    let mut first = true;

    for field_filter in &filter.filters {
        if !first {
            builder.push(" AND ");
        }
        first = false;
        push_predicate(builder, field_filter.field, &field_filter.predicate);
    }

    if let Some(search) = &filter.search {
        if !first {
            builder.push(" AND ");
        }
        builder.push("(");
        for (i, field) in search.fields.iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            push_contains(builder, field, &search.term);
        }
        builder.push(")");
    }
}

fn push_predicate(builder: &mut QueryBuilder<'static, Postgres>, name: &str, predicate: &Predicate) {
    let column = quoted(name);

    match predicate {
        Predicate::Eq(FieldValue::Null) => {
            builder.push("FALSE");
        }
        Predicate::Eq(value) => {
            builder.push(&column);
            builder.push(" = ");
            push_value(builder, value);
        }
        Predicate::Contains(needle) => push_contains(builder, name, needle),
        Predicate::Range { gte, lte } => {
            builder.push("(");
            let mut first = true;
            if let Some(low) = gte {
                builder.push(&column);
                builder.push(" >= ");
                push_value(builder, low);
                first = false;
            }
            if let Some(high) = lte {
                if !first {
                    builder.push(" AND ");
                }
                builder.push(&column);
                builder.push(" <= ");
                push_value(builder, high);
            }
            if gte.is_none() && lte.is_none() {
                builder.push("TRUE");
            }
            builder.push(")");
        }
        Predicate::In(values) if values.is_empty() => {
            builder.push("FALSE");
        }
        Predicate::In(values) => {
            builder.push(&column);
            builder.push(" IN (");
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    builder.push(", ");
                }
                push_value(builder, value);
            }
            builder.push(")");
        }
    }
}

fn push_contains(builder: &mut QueryBuilder<'static, Postgres>, name: &str, needle: &str) {
    builder.push("strpos(lower(");
    builder.push(quoted(name));
    builder.push("), lower(");
    builder.push_bind(needle.to_string());
    builder.push(")) > 0");
}

fn push_value(builder: &mut QueryBuilder<'static, Postgres>, value: &FieldValue) {
    match value {
        FieldValue::String(s) => builder.push_bind(s.clone()),
        FieldValue::Integer(i) => builder.push_bind(*i),
        FieldValue::Float(f) => builder.push_bind(*f),
        FieldValue::Boolean(b) => builder.push_bind(*b),
        FieldValue::Uuid(u) => builder.push_bind(*u),
        FieldValue::DateTime(dt) => builder.push_bind(*dt),
        FieldValue::Null => builder.push("NULL"),
    };
}

fn push_order(builder: &mut QueryBuilder<'static, Postgres>, order: &OrderBy) {
    let nulls = match order.direction {
        SortDirection::Asc => "NULLS FIRST",
        SortDirection::Desc => "NULLS LAST",
    };

    builder.push(" ORDER BY ");
    builder.push(quoted(order.column));
    builder.push(format!(" {} {}", order.direction.as_sql(), nulls));

    if order.column != order.tiebreak {
        builder.push(", ");
        builder.push(quoted(order.tiebreak));
        builder.push(" ASC");
    }
}

fn push_window(builder: &mut QueryBuilder<'static, Postgres>, skip: usize, take: usize) {
    builder.push(" LIMIT ");
    builder.push_bind(i64::try_from(take).unwrap_or(i64::MAX));
    builder.push(" OFFSET ");
    builder.push_bind(i64::try_from(skip).unwrap_or(i64::MAX));
}
