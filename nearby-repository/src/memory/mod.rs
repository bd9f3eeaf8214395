//! In-memory document store implementation.

mod document_store;

pub use document_store::MemoryDocumentStore;
