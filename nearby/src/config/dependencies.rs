//! Dependency initialization and wiring for the nearby service.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use nearby_repository::MemoryDocumentStore;

use crate::cache::{CacheInvalidator, ResultCache};
use crate::catalog::CatalogService;
use crate::config::{EvaluationMode, Settings};
use crate::evaluator::{EvaluationDispatch, EvaluationWorker, IntentEvaluator};
use crate::intents::{IntentConfig, IntentLedger};
use crate::notifications::NotificationFeed;
use crate::search::{SearchBackends, SearchConfig, SearchOrchestrator};
use crate::trending::TrendingService;

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub search: Arc<SearchOrchestrator>,
    pub intents: Arc<IntentLedger>,
    pub evaluator: Arc<IntentEvaluator>,
    pub catalog: Arc<CatalogService>,
    pub notifications: NotificationFeed,
    pub trending: Arc<TrendingService>,
    pub invalidator: CacheInvalidator,
    /// The evaluation worker, present in queued evaluation mode. The caller
    /// is responsible for spawning it.
    pub worker: Option<EvaluationWorker>,
    /// Broadcast to stop the evaluation worker.
    pub shutdown_tx: broadcast::Sender<()>,
}

impl Dependencies {
    /// Initialize all dependencies from settings.
    ///
    /// The cache backend is connected exactly once. If it cannot be reached
    /// the service runs without a result cache.
    pub async fn new(settings: &Settings) -> Self {
        info!(
            use_cache = settings.use_cache,
            cache_backend = ?settings.cache_backend,
            evaluation_mode = ?settings.evaluation_mode,
            default_search_radius_m = settings.default_search_radius_m,
            "Initializing dependencies"
        );

        let cache = ResultCache::connect(settings.cache_source(), settings.cache_timeout).await;
        Self::with_store(settings, Arc::new(MemoryDocumentStore::new()), cache)
    }

    /// Wire all components over the given document store and result cache.
    pub fn with_store(
        settings: &Settings,
        store: Arc<MemoryDocumentStore>,
        cache: ResultCache,
    ) -> Self {
        let feed = NotificationFeed::new(store.clone());
        let invalidator = CacheInvalidator::new(cache.clone());

        let search = SearchOrchestrator::with_config(
            SearchBackends {
                spatial: store.clone(),
                text: store.clone(),
                catalog: store.clone(),
                search_logs: store.clone(),
            },
            cache.clone(),
            SearchConfig {
                default_radius_m: settings.default_search_radius_m,
                cache_ttl: settings.search_cache_ttl,
                query_timeout: settings.search_timeout,
                alternatives_radius_m: settings.alternatives_radius_m,
                alternatives_limit: settings.alternatives_limit,
            },
        );

        let intents = IntentLedger::with_config(
            store.clone(),
            store.clone(),
            feed.clone(),
            IntentConfig {
                reserve_ttl: settings.reserve_expiry,
            },
        );

        let evaluator = Arc::new(IntentEvaluator::with_currency(
            store.clone(),
            feed.clone(),
            settings.currency_symbol.clone(),
        ));

        let (shutdown_tx, _) = broadcast::channel(1);
        let (dispatch, worker) = match settings.evaluation_mode {
            EvaluationMode::Inline => (EvaluationDispatch::Inline(Arc::clone(&evaluator)), None),
            EvaluationMode::Queued => {
                let (dispatch, worker) = EvaluationWorker::channel(
                    Arc::clone(&evaluator),
                    settings.evaluation_queue_size,
                    shutdown_tx.subscribe(),
                );
                (dispatch, Some(worker))
            }
        };

        let catalog = CatalogService::new(store.clone(), invalidator.clone(), dispatch);
        let trending = TrendingService::new(store, cache, settings.trending_cache_ttl);

        Self {
            search: Arc::new(search),
            intents: Arc::new(intents),
            evaluator,
            catalog: Arc::new(catalog),
            notifications: feed,
            trending: Arc::new(trending),
            invalidator,
            worker,
            shutdown_tx,
        }
    }
}
