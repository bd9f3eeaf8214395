//! Shared fixtures for the nearby integration tests.

#![allow(dead_code)]

use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use nearby::cache::ResultCache;
use nearby::config::EvaluationMode;
use nearby::{Dependencies, Settings};
use nearby_repository::{MemoryCacheBackend, MemoryDocumentStore};
use nearby_shared::{GeoPoint, Product, Store};

pub struct Fixture {
    pub store: Arc<MemoryDocumentStore>,
    pub cache_backend: Option<Arc<MemoryCacheBackend>>,
    pub deps: Dependencies,
}

/// Services over a fresh in-memory document store.
pub fn fixture(mode: EvaluationMode, cached: bool) -> Fixture {
    fixture_with(Settings {
        evaluation_mode: mode,
        ..Settings::default()
    }, cached)
}

pub fn fixture_with(settings: Settings, cached: bool) -> Fixture {
    let store = Arc::new(MemoryDocumentStore::new());
    let cache_backend = cached.then(|| Arc::new(MemoryCacheBackend::new()));
    let cache = match &cache_backend {
        Some(backend) => ResultCache::new(Some(backend.clone())),
        None => ResultCache::disabled(),
    };
    let deps = Dependencies::with_store(&settings, store.clone(), cache);

    Fixture {
        store,
        cache_backend,
        deps,
    }
}

pub fn point(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint::from_lat_lng(lat, lng).unwrap()
}

pub async fn add_store(deps: &Dependencies, name: &str, lat: f64, lng: f64) -> Store {
    let store = Store::new(
        name,
        "general",
        format!("{} street", name),
        "+91 00000 00000",
        point(lat, lng),
        Uuid::new_v4(),
    );
    deps.catalog.add_store(store).await.unwrap()
}

pub async fn add_product(
    deps: &Dependencies,
    store: &Store,
    name: &str,
    price: Decimal,
    stock: u32,
) -> Product {
    let product = Product::new(store.id, name, "", "tools", price, stock);
    deps.catalog.add_product(product).await.unwrap()
}

/// Let spawned fire-and-forget tasks run.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
