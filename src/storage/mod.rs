//! Record store implementations for different backends

#[cfg(feature = "in-memory")]
pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "in-memory")]
pub use in_memory::InMemoryRecordStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresRecordStore;
