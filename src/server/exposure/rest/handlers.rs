//! HTTP handlers for collection list endpoints

use crate::core::error::{QueryError, QueryResult, RequestError, ValidationError};
use crate::core::query::{PageRequest, PageResult, SortInput};
use crate::core::record::Collection;
use crate::core::store::RecordStore;
use crate::core::tristate::Tristate;
use crate::core::PaginatedQueryEngine;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Per-collection handler state
pub struct CollectionState<C: Collection, S: ?Sized> {
    pub engine: PaginatedQueryEngine<C>,
    pub store: Arc<S>,
}

impl<C: Collection, S: ?Sized> Clone for CollectionState<C, S> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            store: self.store.clone(),
        }
    }
}

/// Query-string form of a list request
///
/// `GET /tasks?page=2&limit=10&search=report&sort=due_date:asc&filter={"status":"open"}`
///
/// Any other key is a filter on the field of that name, as in a PATCH body:
/// `GET /tasks?status=open&priority=3`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    /// `field` or `field:direction`
    pub sort: Option<String>,
    /// JSON object of filters
    pub filter: Option<String>,
    /// Filter fields given directly as query keys
    #[serde(flatten)]
    pub extra: IndexMap<String, String>,
}

impl ListParams {
    pub fn into_request(self) -> QueryResult<PageRequest> {
        let filters = match self.filter.as_deref().map(str::trim) {
            None | Some("") => Tristate::Absent,
            Some(raw) => {
                let parsed: IndexMap<String, Value> =
                    serde_json::from_str(raw).map_err(|e| ValidationError::InvalidJson {
                        message: format!("filter: {}", e),
                    })?;
                Tristate::Present(parsed)
            }
        };

        Ok(PageRequest {
            page: self.page.map(Value::String).into(),
            limit: self.limit.map(Value::String).into(),
            filters,
            search: self.search.into(),
            sort: self.sort.map(SortInput::Expr).into(),
            extra: self
                .extra
                .into_iter()
                .map(|(field, value)| (field, Value::String(value)))
                .collect(),
        })
    }
}

/// `PATCH /{collection}` with an optional JSON body
pub async fn query_collection<C, S>(
    State(state): State<CollectionState<C, S>>,
    body: Result<Option<Json<PageRequest>>, JsonRejection>,
) -> Result<Json<PageResult<C::Record>>, QueryError>
where
    C: Collection,
    S: RecordStore<C::Record> + ?Sized + 'static,
{
    let request = match body {
        Ok(Some(Json(request))) => request,
        Ok(None) => PageRequest::default(),
        Err(rejection) => {
            return Err(RequestError::InvalidBody {
                message: rejection.body_text(),
            }
            .into());
        }
    };

    let page = state.engine.query(state.store.as_ref(), &request).await?;
    Ok(Json(page))
}

/// `GET /{collection}` with query-string parameters
pub async fn list_collection<C, S>(
    State(state): State<CollectionState<C, S>>,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResult<C::Record>>, QueryError>
where
    C: Collection,
    S: RecordStore<C::Record> + ?Sized + 'static,
{
    let request = params.into_request()?;
    let page = state.engine.query(state.store.as_ref(), &request).await?;
    Ok(Json(page))
}
