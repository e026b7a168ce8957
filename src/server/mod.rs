//! Server module for building HTTP servers with auto-registered list routes
//!
//! This module provides a `ServerBuilder` that registers, for each
//! collection, a `GET` and a `PATCH` list endpoint plus health routes.

pub mod builder;
pub mod collection_registry;
pub mod exposure;
pub mod host;

pub use builder::ServerBuilder;
pub use collection_registry::{CollectionDescriptor, CollectionRegistry, CollectionRoutes};
pub use exposure::RestExposure;
pub use host::ServerHost;
