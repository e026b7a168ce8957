//! REST API exposure
//!
//! Consumes a `ServerHost` and produces an Axum `Router` with health routes,
//! one list endpoint pair per registered collection, and a fallback that
//! reports unknown collections as 404.

pub mod handlers;

use super::super::host::ServerHost;
use crate::core::error::{QueryError, RequestError};
use anyhow::Result;
use axum::http::Uri;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// # Returns
    ///
    /// Returns a fully configured Axum router with:
    /// - Health check routes
    /// - `GET` and `PATCH` list routes for every collection
    /// - Custom routes
    /// - An HTTP trace layer
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let collection_routes = host.collections.build_routes(&host.config);
        let mut app = Self::health_routes().merge(collection_routes);

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app
            .fallback(Self::unknown_collection)
            .layer(TraceLayer::new_for_http()))
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "pagequery"
        }))
    }

    async fn unknown_collection(uri: Uri) -> QueryError {
        let collection = uri
            .path()
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string();
        RequestError::CollectionNotFound { collection }.into()
    }
}
