//! Store types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::geo::GeoPoint;

/// A vendor's physical location.
///
/// The location is immutable except through an explicit relocation; stores are
/// never hard-deleted by this system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub address: String,
    pub phone: String,
    pub location: GeoPoint,
    /// The vendor account that owns this store.
    pub owner_id: Uuid,
}

impl Store {
    /// Create a store with a fresh id.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        address: impl Into<String>,
        phone: impl Into<String>,
        location: GeoPoint,
        owner_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            address: address.into(),
            phone: phone.into(),
            location,
            owner_id,
        }
    }

    pub fn summary(&self) -> StoreSummary {
        StoreSummary::from(self)
    }
}

/// The subset of a store shown next to intents and alternatives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub location: GeoPoint,
}

impl From<&Store> for StoreSummary {
    fn from(store: &Store) -> Self {
        Self {
            id: store.id,
            name: store.name.clone(),
            address: store.address.clone(),
            location: store.location,
        }
    }
}
