//! # Nearby Repository
//!
//! This crate provides traits and implementations for the collaborators of the
//! nearby product discovery system: the document store (catalog, spatial and
//! text queries, intents, notifications, search logs) and the cache backend
//! behind the result cache. It includes an in-memory document store, an
//! in-memory cache, and a Redis cache.

pub mod cache;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod text;
pub mod types;

pub use cache::{CacheSource, MemoryCacheBackend, RedisCacheBackend};
pub use errors::RepositoryError;
pub use interfaces::{
    CacheBackend, CatalogRepository, IntentRepository, NotificationRepository,
    SearchLogRepository, SpatialIndexProvider, TextIndexProvider,
};
pub use memory::MemoryDocumentStore;
pub use types::{ProductHit, StoreHit, TextMatchRequest, DEFAULT_MAX_EDITS};
