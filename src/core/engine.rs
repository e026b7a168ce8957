//! The paginated query engine
//!
//! A query is answered in two steps. [`PaginatedQueryEngine::plan`] turns a
//! loosely typed [`PageRequest`] into a [`QueryPlan`]: the normalized page
//! window, the where clause built from the collection's allow-list, and the
//! resolved sort. Executing the plan asks the store for the page of rows
//! and the total count concurrently and wraps both in a [`PageResult`].

use crate::config::QuerySettings;
use crate::core::error::QueryResult;
use crate::core::filter::{FilterBuilder, WhereClause};
use crate::core::query::{PageRequest, PageResult, PageWindow, PaginationMeta};
use crate::core::record::Collection;
use crate::core::sort::{OrderBy, SortField, SortSpec};
use crate::core::store::RecordStore;
use std::marker::PhantomData;

/// A validated, normalized list query for one collection
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan<F: SortField> {
    pub window: PageWindow,
    pub filter: WhereClause,
    pub sort: SortSpec<F>,
}

impl<F: SortField> QueryPlan<F> {
    pub fn order_by(&self) -> OrderBy {
        self.sort.order_by()
    }
}

/// Answers list queries for collection `C`
pub struct PaginatedQueryEngine<C: Collection> {
    settings: QuerySettings,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Collection> PaginatedQueryEngine<C> {
    pub fn new(settings: QuerySettings) -> Self {
        Self {
            settings,
            _marker: PhantomData,
        }
    }

    pub fn settings(&self) -> &QuerySettings {
        &self.settings
    }

    /// Validate and normalize a request without touching storage
    pub fn plan(&self, request: &PageRequest) -> QueryResult<QueryPlan<C::Sort>> {
        let window = PageWindow::resolve(&request.page, &request.limit, &self.settings);

        let filter = FilterBuilder::<C>::new(self.settings.filter_policy)
            .filters(&request.filter_map())?
            .search(request.search.as_option().map(String::as_str))
            .build();

        let (field, direction) = request.sort_parts();
        let sort = SortSpec::resolve(field, direction);

        Ok(QueryPlan {
            window,
            filter,
            sort,
        })
    }

    /// Plan and execute a request against `store`
    pub async fn query<S>(
        &self,
        store: &S,
        request: &PageRequest,
    ) -> QueryResult<PageResult<C::Record>>
    where
        S: RecordStore<C::Record> + ?Sized,
    {
        let plan = self.plan(request)?;
        self.execute(store, &plan).await
    }

    /// Execute an already planned query
    ///
    /// Rows and count are fetched concurrently; if either fails the whole
    /// query fails and no partial page is returned.
    pub async fn execute<S>(
        &self,
        store: &S,
        plan: &QueryPlan<C::Sort>,
    ) -> QueryResult<PageResult<C::Record>>
    where
        S: RecordStore<C::Record> + ?Sized,
    {
        let PageWindow { page, limit, skip } = plan.window;
        let order = plan.order_by();

        let (mut data, records) = tokio::try_join!(
            store.find_many(&plan.filter, &order, skip, limit),
            store.count(&plan.filter),
        )?;
        data.truncate(limit);

        tracing::debug!(
            collection = C::resource_name(),
            page,
            limit,
            records,
            returned = data.len(),
            "list query served"
        );

        Ok(PageResult {
            pagination: PaginationMeta::new(page, limit, records),
            data,
        })
    }
}

impl<C: Collection> Clone for PaginatedQueryEngine<C> {
    fn clone(&self) -> Self {
        Self::new(self.settings)
    }
}

impl<C: Collection> Default for PaginatedQueryEngine<C> {
    fn default() -> Self {
        Self::new(QuerySettings::default())
    }
}
