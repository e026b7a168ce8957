//! Collection registry for managing collection descriptors and their list routes

use crate::config::QueryConfig;
use crate::core::record::Collection;
use crate::core::store::RecordStore;
use crate::core::PaginatedQueryEngine;
use crate::server::exposure::rest::handlers::{CollectionState, list_collection, query_collection};
use axum::Router;
use axum::routing::get;
use indexmap::IndexMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Trait that describes how to build routes for a collection
pub trait CollectionDescriptor: Send + Sync {
    /// The collection name, also its URL segment (e.g., "tasks")
    fn collection_name(&self) -> &str;

    /// Build the list routes for this collection
    ///
    /// Should return a Router with:
    /// - GET /{collection}
    /// - PATCH /{collection}
    fn build_routes(&self, config: &QueryConfig) -> Router;
}

/// Descriptor binding collection `C` to a record store
pub struct CollectionRoutes<C: Collection, S: ?Sized> {
    store: Arc<S>,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Collection, S: ?Sized> CollectionRoutes<C, S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }
}

impl<C, S> CollectionDescriptor for CollectionRoutes<C, S>
where
    C: Collection,
    S: RecordStore<C::Record> + ?Sized + 'static,
{
    fn collection_name(&self) -> &str {
        C::resource_name()
    }

    fn build_routes(&self, config: &QueryConfig) -> Router {
        let settings = config.settings_for(C::resource_name());
        let state = CollectionState {
            engine: PaginatedQueryEngine::<C>::new(settings),
            store: self.store.clone(),
        };

        tracing::debug!(
            collection = C::resource_name(),
            default_limit = settings.default_limit,
            max_limit = settings.max_limit,
            "registering list routes"
        );

        Router::new()
            .route(
                &format!("/{}", C::resource_name()),
                get(list_collection::<C, S>).patch(query_collection::<C, S>),
            )
            .with_state(state)
    }
}

/// Registry for all collections served by the application
///
/// Registration order is kept so that route listings are stable.
#[derive(Default)]
pub struct CollectionRegistry {
    descriptors: IndexMap<String, Box<dyn CollectionDescriptor>>,
}

impl CollectionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            descriptors: IndexMap::new(),
        }
    }

    /// Register a collection descriptor
    ///
    /// The collection name is used as the key; registering the same name
    /// twice replaces the earlier descriptor.
    pub fn register(&mut self, descriptor: Box<dyn CollectionDescriptor>) {
        let name = descriptor.collection_name().to_string();
        self.descriptors.insert(name, descriptor);
    }

    /// Build a router with all registered collection routes
    pub fn build_routes(&self, config: &QueryConfig) -> Router {
        let mut router = Router::new();

        for descriptor in self.descriptors.values() {
            router = router.merge(descriptor.build_routes(config));
        }

        router
    }

    /// Get all registered collection names
    pub fn collection_names(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }
}
