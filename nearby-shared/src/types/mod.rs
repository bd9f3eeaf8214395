//! This module defines the core data structures shared by the repository and
//! service crates: catalog entities, intents, notifications, search logs and
//! the search request/response types.

pub mod geo;
pub mod intent;
pub mod notification;
pub mod product;
pub mod search_log;
pub mod search_query;
pub mod search_result;
pub mod store;
