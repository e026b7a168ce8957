//! Integration test infrastructure for record stores.
//!
//! Builds the real REST router for the `test_tasks` collection over any
//! store, so that every backend is validated through the full HTTP layer.
//!
//! # Architecture
//!
//! ```text
//! axum_test::TestServer
//!     └─ Router (built by build_test_router)
//!         ├─ GET   /health, /healthz
//!         ├─ GET   /test_tasks   → list_collection
//!         └─ PATCH /test_tasks   → query_collection
//! ```

#[macro_use]
pub mod rest_tests;

use super::TestTasks;
use axum::Router;
use pagequery::config::QueryConfig;
use pagequery::core::store::RecordStore;
use pagequery::server::ServerBuilder;
use std::sync::Arc;

/// Build the REST router serving `store` as `test_tasks`.
pub fn build_test_router<S>(store: Arc<S>, config: QueryConfig) -> Router
where
    S: RecordStore<super::TestTask> + ?Sized + 'static,
{
    ServerBuilder::new()
        .with_config(config)
        .register_shared_collection::<TestTasks, S>(store)
        .and_then(ServerBuilder::build)
        .expect("test router should build")
}
