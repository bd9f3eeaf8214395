//! Interface definitions for the document store and cache collaborators.
//!
//! This module defines the abstract traits the service layer depends on,
//! allowing for dependency injection and swappable backend implementations.

mod cache_backend;
mod catalog;
mod intents;
mod notifications;
mod search_logs;
mod spatial_index;
mod text_index;

pub use cache_backend::CacheBackend;
pub use catalog::CatalogRepository;
pub use intents::IntentRepository;
pub use notifications::NotificationRepository;
pub use search_logs::SearchLogRepository;
pub use spatial_index::SpatialIndexProvider;
pub use text_index::TextIndexProvider;
