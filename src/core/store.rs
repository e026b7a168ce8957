//! Storage seam used by the query engine

use crate::core::error::QueryResult;
use crate::core::filter::WhereClause;
use crate::core::record::Record;
use crate::core::sort::OrderBy;
use async_trait::async_trait;
use std::sync::Arc;

/// A backend able to answer the two questions a page needs
///
/// Both calls receive the same [`WhereClause`]; `find_many` must apply it,
/// then the ordering (including its tie-breaker), then skip/take. Failures
/// should surface as `QueryError::Storage`.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Matching records in order, at most `take` of them after skipping `skip`
    async fn find_many(
        &self,
        filter: &WhereClause,
        order: &OrderBy,
        skip: usize,
        take: usize,
    ) -> QueryResult<Vec<R>>;

    /// Number of records matching the filter, ignoring pagination
    async fn count(&self, filter: &WhereClause) -> QueryResult<usize>;
}

#[async_trait]
impl<R: Record, S: RecordStore<R> + ?Sized> RecordStore<R> for Arc<S> {
    async fn find_many(
        &self,
        filter: &WhereClause,
        order: &OrderBy,
        skip: usize,
        take: usize,
    ) -> QueryResult<Vec<R>> {
        (**self).find_many(filter, order, skip, take).await
    }

    async fn count(&self, filter: &WhereClause) -> QueryResult<usize> {
        (**self).count(filter).await
    }
}
