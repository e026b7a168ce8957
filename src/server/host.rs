//! Server host for transport-agnostic API exposure
//!
//! The host holds everything an exposure needs to build its router: the
//! deployment configuration and the registered collections.

use crate::config::QueryConfig;
use crate::server::collection_registry::CollectionRegistry;
use anyhow::Result;
use std::sync::Arc;

/// Host context containing all server state
///
/// # Example
///
/// ```rust,ignore
/// let host = ServerHost::from_builder_components(config, collections)?;
/// let app = RestExposure::build_router(Arc::new(host), vec![])?;
/// ```
pub struct ServerHost {
    /// Limits and filter policy for every collection
    pub config: Arc<QueryConfig>,

    /// Collections with their stores
    pub collections: CollectionRegistry,
}

impl ServerHost {
    /// Build the host from builder components
    pub fn from_builder_components(
        config: QueryConfig,
        collections: CollectionRegistry,
    ) -> Result<Self> {
        Ok(Self {
            config: Arc::new(config),
            collections,
        })
    }

    /// Get collection names registered in the host
    pub fn collection_names(&self) -> Vec<&str> {
        self.collections.collection_names()
    }

    /// Check if host has anything to serve
    pub fn is_ready(&self) -> bool {
        !self.collections.collection_names().is_empty()
    }
}
