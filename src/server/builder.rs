//! ServerBuilder for fluent API to build HTTP servers

use super::collection_registry::{CollectionRegistry, CollectionRoutes};
use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::{QueryConfig, is_valid_collection_name};
use crate::core::record::Collection;
use crate::core::store::RecordStore;
use anyhow::{Result, bail};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for creating HTTP servers with one list endpoint per collection
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(QueryConfig::from_yaml_file("pagequery.yaml")?)
///     .register_collection::<Tasks, _>(InMemoryRecordStore::new())?
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: QueryConfig,
    collections: CollectionRegistry,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with the default configuration
    pub fn new() -> Self {
        Self {
            config: QueryConfig::default(),
            collections: CollectionRegistry::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the deployment configuration
    ///
    /// Applies to every collection, whether registered before or after.
    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this to add routes that are not collection listings, such as
    /// detail or write endpoints for the same records.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Register collection `C` backed by `store`
    ///
    /// Fails if the collection name is not a lowercase identifier or is
    /// already registered.
    pub fn register_collection<C, S>(self, store: S) -> Result<Self>
    where
        C: Collection,
        S: RecordStore<C::Record> + 'static,
    {
        self.register_shared_collection::<C, S>(Arc::new(store))
    }

    /// Register collection `C` backed by a shared, possibly unsized, store
    pub fn register_shared_collection<C, S>(mut self, store: Arc<S>) -> Result<Self>
    where
        C: Collection,
        S: RecordStore<C::Record> + ?Sized + 'static,
    {
        let name = C::resource_name();
        if !is_valid_collection_name(name) {
            bail!("invalid collection name '{}'", name);
        }
        if self.collections.contains(name) {
            bail!("collection '{}' is already registered", name);
        }

        self.collections
            .register(Box::new(CollectionRoutes::<C, S>::new(store)));
        tracing::debug!(collection = name, "collection registered");

        Ok(self)
    }

    /// Build the transport-agnostic host
    pub fn build_host(self) -> Result<ServerHost> {
        ServerHost::from_builder_components(self.config, self.collections)
    }

    /// Build the final REST router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        RestExposure::build_router(host, custom_routes)
    }

    /// Build the router and serve it on `addr` until Ctrl+C or SIGTERM
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
