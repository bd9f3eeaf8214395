//! Integration tests for the intent ledger and intent evaluation.

mod common;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use nearby::config::EvaluationMode;
use nearby::evaluator::{EvaluationReport, IntentEvaluator, PRICE_DROP_TITLE, STOCK_CHANGE_TITLE};
use nearby::intents::{IntentConfig, IntentLedger, ACKNOWLEDGEMENT_TITLE};
use nearby::notifications::NotificationFeed;
use nearby::{ServiceError, Settings};
use nearby_repository::{
    CatalogRepository, IntentRepository, MemoryDocumentStore, NotificationRepository,
    RepositoryError,
};
use nearby_shared::{
    Intent, IntentKind, IntentStatus, NewNotification, Notification, Product, ProductUpdate,
    Store, Watermark,
};

use common::{add_product, add_store, fixture, fixture_with};

async fn titled(f: &common::Fixture, user: Uuid, title: &str) -> usize {
    f.deps
        .notifications
        .list(user)
        .await
        .unwrap()
        .iter()
        .filter(|n| n.title == title)
        .count()
}

// Intent repository that serves fixed watches and fails the watermark
// update for one of them
struct FlakyIntents {
    watches: Vec<Intent>,
    failing: Uuid,
    advanced: Mutex<Vec<Uuid>>,
}

#[async_trait]
impl IntentRepository for FlakyIntents {
    async fn insert_intent(&self, _intent: &Intent) -> Result<(), RepositoryError> {
        Err(RepositoryError::unknown("not used"))
    }

    async fn get_intent(&self, _id: Uuid) -> Result<Option<Intent>, RepositoryError> {
        Err(RepositoryError::unknown("not used"))
    }

    async fn insert_if_no_open(&self, _intent: &Intent) -> Result<bool, RepositoryError> {
        Err(RepositoryError::unknown("not used"))
    }

    async fn watching_product(&self, _product_id: Uuid) -> Result<Vec<Intent>, RepositoryError> {
        Ok(self.watches.clone())
    }

    async fn list_for_user(&self, _user_id: Uuid) -> Result<Vec<Intent>, RepositoryError> {
        Err(RepositoryError::unknown("not used"))
    }

    async fn cancel(&self, _id: Uuid, _user_id: Uuid) -> Result<bool, RepositoryError> {
        Err(RepositoryError::unknown("not used"))
    }

    async fn advance_watermark(
        &self,
        id: Uuid,
        _expected: Option<Watermark>,
        _next: Watermark,
    ) -> Result<bool, RepositoryError> {
        if id == self.failing {
            return Err(RepositoryError::connection("write concern timeout"));
        }
        self.advanced.lock().unwrap().push(id);
        Ok(true)
    }

    async fn rewind_watermark(
        &self,
        _id: Uuid,
        _applied: Watermark,
        _previous: Option<Watermark>,
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::unknown("not used"))
    }

    async fn delete_expired_reservations(
        &self,
        _user_id: Uuid,
        _now: DateTime<Utc>,
    ) -> Result<usize, RepositoryError> {
        Err(RepositoryError::unknown("not used"))
    }
}

// Notification store whose next append fails until re-armed
struct DroppingFeed {
    inner: Arc<MemoryDocumentStore>,
    drop_next: AtomicBool,
}

#[async_trait]
impl NotificationRepository for DroppingFeed {
    async fn append(&self, notification: NewNotification) -> Result<Notification, RepositoryError> {
        if self.drop_next.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::connection("socket closed"));
        }
        self.inner.append(notification).await
    }

    async fn list_recent(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Notification>, RepositoryError> {
        self.inner.list_recent(user_id, limit).await
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, RepositoryError> {
        self.inner.mark_read(id, user_id).await
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<u64, RepositoryError> {
        self.inner.unread_count(user_id).await
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, RepositoryError> {
        self.inner.mark_all_read(user_id).await
    }
}

#[tokio::test]
async fn test_create_intent_acknowledges_the_user() {
    let f = fixture(EvaluationMode::Inline, false);
    let shop = add_store(&f.deps, "Corner Shop", 28.0, 77.0).await;
    let widget = add_product(&f.deps, &shop, "Blue Widget", dec!(500), 10).await;
    let user = Uuid::new_v4();

    let intent = f
        .deps
        .intents
        .create_intent(user, shop.id, widget.id, IntentKind::PriceDrop)
        .await
        .unwrap();

    assert_eq!(intent.status, IntentStatus::Active);
    assert_eq!(intent.meta.initial_price, dec!(500));
    assert_eq!(intent.meta.initial_stock, 10);
    assert!(intent.expires_at.is_none());

    let feed = f.deps.notifications.list(user).await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].title, ACKNOWLEDGEMENT_TITLE);
    assert_eq!(feed[0].message, "We'll notify you when the price drops");
    assert_eq!(feed[0].link, format!("/store/{}", shop.id));
    assert!(!feed[0].is_read);
}

#[tokio::test]
async fn test_reservations_expire_after_two_days() {
    let f = fixture(EvaluationMode::Inline, false);
    let shop = add_store(&f.deps, "Corner Shop", 28.0, 77.0).await;
    let widget = add_product(&f.deps, &shop, "Blue Widget", dec!(500), 10).await;

    let before = Utc::now();
    let intent = f
        .deps
        .intents
        .create_intent(Uuid::new_v4(), shop.id, widget.id, IntentKind::Reserve)
        .await
        .unwrap();

    let expires_at = intent.expires_at.unwrap();
    assert!(expires_at >= before + Duration::days(2));
    assert!(expires_at <= Utc::now() + Duration::days(2));
}

#[tokio::test]
async fn test_create_intent_rejections() {
    let f = fixture(EvaluationMode::Inline, false);
    let shop = add_store(&f.deps, "Corner Shop", 28.0, 77.0).await;
    let other_shop = add_store(&f.deps, "Other Shop", 28.0, 77.0).await;
    let widget = add_product(&f.deps, &shop, "Blue Widget", dec!(500), 10).await;
    let user = Uuid::new_v4();

    let err = f
        .deps
        .intents
        .create_intent(user, shop.id, Uuid::new_v4(), IntentKind::PriceDrop)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert_eq!(err.public_message(), "Product not found");

    let err = f
        .deps
        .intents
        .create_intent(user, other_shop.id, widget.id, IntentKind::PriceDrop)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));

    let first = f
        .deps
        .intents
        .create_intent(user, shop.id, widget.id, IntentKind::PriceDrop)
        .await
        .unwrap();
    let err = f
        .deps
        .intents
        .create_intent(user, shop.id, widget.id, IntentKind::PriceDrop)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    // Other kinds and other users are independent.
    f.deps
        .intents
        .create_intent(user, shop.id, widget.id, IntentKind::StockChange)
        .await
        .unwrap();
    f.deps
        .intents
        .create_intent(Uuid::new_v4(), shop.id, widget.id, IntentKind::PriceDrop)
        .await
        .unwrap();

    // Cancelling frees the slot.
    f.deps.intents.cancel_intent(first.id, user).await.unwrap();
    f.deps
        .intents
        .create_intent(user, shop.id, widget.id, IntentKind::PriceDrop)
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_keep_one_open_intent() {
    let f = fixture(EvaluationMode::Inline, false);
    let shop = add_store(&f.deps, "Corner Shop", 28.0, 77.0).await;
    let widget = add_product(&f.deps, &shop, "Blue Widget", dec!(500), 10).await;
    let user = Uuid::new_v4();
    let (store_id, product_id) = (shop.id, widget.id);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let ledger = f.deps.intents.clone();
            tokio::spawn(async move {
                ledger
                    .create_intent(user, store_id, product_id, IntentKind::PriceDrop)
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert!(matches!(e, ServiceError::Conflict(_)), "unexpected {e:?}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(f.store.list_for_user(user).await.unwrap().len(), 1);
    assert_eq!(titled(&f, user, ACKNOWLEDGEMENT_TITLE).await, 1);
}

#[tokio::test]
async fn test_oversized_reservation_lifetime_saturates() {
    let store = Arc::new(MemoryDocumentStore::new());
    let shop = Store::new(
        "Corner Shop",
        "general",
        "1 Main St",
        "+91 00000 00000",
        common::point(28.0, 77.0),
        Uuid::new_v4(),
    );
    store.insert_store(&shop).await.unwrap();
    let widget = Product::new(shop.id, "Blue Widget", "", "tools", dec!(500), 10);
    store.insert_product(&widget).await.unwrap();

    let ledger = IntentLedger::with_config(
        store.clone(),
        store.clone(),
        NotificationFeed::new(store.clone()),
        IntentConfig {
            reserve_ttl: std::time::Duration::from_secs(9_000_000_000_000),
        },
    );

    let intent = ledger
        .create_intent(Uuid::new_v4(), shop.id, widget.id, IntentKind::Reserve)
        .await
        .unwrap();
    assert_eq!(intent.expires_at, Some(DateTime::<Utc>::MAX_UTC));

    // Too large to be represented at all: rejected instead of panicking.
    let ledger = IntentLedger::with_config(
        store.clone(),
        store.clone(),
        NotificationFeed::new(store),
        IntentConfig {
            reserve_ttl: std::time::Duration::from_secs(u64::MAX),
        },
    );
    let err = ledger
        .create_intent(Uuid::new_v4(), shop.id, widget.id, IntentKind::Reserve)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Internal(_)));
}

#[tokio::test]
async fn test_cancel_requires_ownership() {
    let f = fixture(EvaluationMode::Inline, false);
    let shop = add_store(&f.deps, "Corner Shop", 28.0, 77.0).await;
    let widget = add_product(&f.deps, &shop, "Blue Widget", dec!(500), 10).await;
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    let intent = f
        .deps
        .intents
        .create_intent(owner, shop.id, widget.id, IntentKind::Reserve)
        .await
        .unwrap();

    let err = f
        .deps
        .intents
        .cancel_intent(intent.id, stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let stored = f.store.get_intent(intent.id).await.unwrap().unwrap();
    assert_eq!(stored.status, IntentStatus::Active);

    f.deps.intents.cancel_intent(intent.id, owner).await.unwrap();
    let stored = f.store.get_intent(intent.id).await.unwrap().unwrap();
    assert_eq!(stored.status, IntentStatus::Cancelled);

    // Cancelling twice is reported, not ignored.
    let err = f
        .deps
        .intents
        .cancel_intent(intent.id, owner)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    assert!(f.deps.intents.list_my_intents(owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_reaps_expired_reservations() {
    let f = fixture(EvaluationMode::Inline, false);
    let shop = add_store(&f.deps, "Corner Shop", 28.0, 77.0).await;
    let widget = add_product(&f.deps, &shop, "Blue Widget", dec!(500), 10).await;
    let user = Uuid::new_v4();
    let neighbour = Uuid::new_v4();

    let expired = Intent::new(
        user,
        shop.id,
        &widget,
        IntentKind::Reserve,
        Duration::seconds(-1),
        Utc::now(),
    );
    let neighbours_expired = Intent::new(
        neighbour,
        shop.id,
        &widget,
        IntentKind::Reserve,
        Duration::seconds(-1),
        Utc::now(),
    );
    f.store.insert_intent(&expired).await.unwrap();
    f.store.insert_intent(&neighbours_expired).await.unwrap();

    let live = f
        .deps
        .intents
        .create_intent(user, shop.id, widget.id, IntentKind::StockChange)
        .await
        .unwrap();

    let views = f.deps.intents.list_my_intents(user).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].intent.id, live.id);
    assert_eq!(views[0].product.as_ref().unwrap().name, "Blue Widget");
    assert_eq!(views[0].store.as_ref().unwrap().name, "Corner Shop");

    assert!(f.store.get_intent(expired.id).await.unwrap().is_none());
    assert_eq!(f.deps.intents.list_my_intents(user).await.unwrap().len(), 1);

    // Only the caller's reservations are reaped.
    assert!(f
        .store
        .get_intent(neighbours_expired.id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_deleted_products_list_without_summary() {
    let f = fixture(EvaluationMode::Inline, false);
    let shop = add_store(&f.deps, "Corner Shop", 28.0, 77.0).await;
    let widget = add_product(&f.deps, &shop, "Blue Widget", dec!(500), 10).await;
    let user = Uuid::new_v4();

    f.deps
        .intents
        .create_intent(user, shop.id, widget.id, IntentKind::PriceDrop)
        .await
        .unwrap();
    f.deps.catalog.delete_product(widget.id).await.unwrap();

    let views = f.deps.intents.list_my_intents(user).await.unwrap();
    assert_eq!(views.len(), 1);
    assert!(views[0].product.is_none());
    assert!(views[0].store.is_some());
}

#[tokio::test]
async fn test_price_drop_notifies_once_per_new_low() {
    let f = fixture(EvaluationMode::Inline, false);
    let shop = add_store(&f.deps, "Corner Shop", 28.0, 77.0).await;
    let widget = add_product(&f.deps, &shop, "Blue Widget", dec!(100), 10).await;
    let user = Uuid::new_v4();

    let intent = f
        .deps
        .intents
        .create_intent(user, shop.id, widget.id, IntentKind::PriceDrop)
        .await
        .unwrap();

    let updated = f
        .deps
        .catalog
        .update_product(widget.id, ProductUpdate::price(dec!(90)))
        .await
        .unwrap();
    assert_eq!(titled(&f, user, PRICE_DROP_TITLE).await, 1);

    let stored = f.store.get_intent(intent.id).await.unwrap().unwrap();
    assert_eq!(stored.status, IntentStatus::Triggered);
    assert_eq!(stored.meta.last_notified_price, Some(dec!(90)));

    // Same price again, through the catalog and directly.
    f.deps
        .catalog
        .update_product(widget.id, ProductUpdate::price(dec!(90)))
        .await
        .unwrap();
    let report = f.deps.evaluator.evaluate_product_change(&updated).await;
    assert_eq!(report.notified, 0);
    assert_eq!(titled(&f, user, PRICE_DROP_TITLE).await, 1);

    // A price rise does not notify either.
    f.deps
        .catalog
        .update_product(widget.id, ProductUpdate::price(dec!(95)))
        .await
        .unwrap();
    assert_eq!(titled(&f, user, PRICE_DROP_TITLE).await, 1);

    f.deps
        .catalog
        .update_product(widget.id, ProductUpdate::price(dec!(80)))
        .await
        .unwrap();
    assert_eq!(titled(&f, user, PRICE_DROP_TITLE).await, 2);

    let feed = f.deps.notifications.list(user).await.unwrap();
    assert_eq!(feed[0].message, "Price dropped to ₹80");
    assert_eq!(feed[0].link, format!("/store/{}", shop.id));
}

#[tokio::test]
async fn test_stock_change_ignores_sell_out() {
    let f = fixture(EvaluationMode::Inline, false);
    let shop = add_store(&f.deps, "Corner Shop", 28.0, 77.0).await;
    let widget = add_product(&f.deps, &shop, "Blue Widget", dec!(100), 10).await;
    let user = Uuid::new_v4();

    f.deps
        .intents
        .create_intent(user, shop.id, widget.id, IntentKind::StockChange)
        .await
        .unwrap();

    f.deps
        .catalog
        .update_product(widget.id, ProductUpdate::stock(0))
        .await
        .unwrap();
    assert_eq!(titled(&f, user, STOCK_CHANGE_TITLE).await, 0);

    f.deps
        .catalog
        .update_product(widget.id, ProductUpdate::stock(5))
        .await
        .unwrap();
    assert_eq!(titled(&f, user, STOCK_CHANGE_TITLE).await, 1);

    let feed = f.deps.notifications.list(user).await.unwrap();
    assert_eq!(feed[0].message, "Stock changed to 5 units");
}

#[tokio::test]
async fn test_cancelled_and_reserve_intents_are_not_evaluated() {
    let f = fixture(EvaluationMode::Inline, false);
    let shop = add_store(&f.deps, "Corner Shop", 28.0, 77.0).await;
    let widget = add_product(&f.deps, &shop, "Blue Widget", dec!(100), 10).await;
    let user = Uuid::new_v4();

    let watch = f
        .deps
        .intents
        .create_intent(user, shop.id, widget.id, IntentKind::PriceDrop)
        .await
        .unwrap();
    f.deps
        .intents
        .create_intent(user, shop.id, widget.id, IntentKind::Reserve)
        .await
        .unwrap();
    f.deps.intents.cancel_intent(watch.id, user).await.unwrap();

    let updated = f
        .deps
        .catalog
        .update_product(widget.id, ProductUpdate::price(dec!(50)))
        .await
        .unwrap();

    let report = f.deps.evaluator.evaluate_product_change(&updated).await;
    assert_eq!(report, EvaluationReport::default());
    assert_eq!(titled(&f, user, PRICE_DROP_TITLE).await, 0);
}

#[tokio::test]
async fn test_concurrent_evaluations_notify_once() {
    let f = fixture(EvaluationMode::Queued, false);
    let shop = add_store(&f.deps, "Corner Shop", 28.0, 77.0).await;
    let mut widget = add_product(&f.deps, &shop, "Blue Widget", dec!(100), 10).await;
    let user = Uuid::new_v4();

    f.deps
        .intents
        .create_intent(user, shop.id, widget.id, IntentKind::PriceDrop)
        .await
        .unwrap();

    widget.price = dec!(90);
    let (a, b) = tokio::join!(
        f.deps.evaluator.evaluate_product_change(&widget),
        f.deps.evaluator.evaluate_product_change(&widget)
    );

    assert_eq!(a.notified + b.notified, 1);
    assert_eq!(titled(&f, user, PRICE_DROP_TITLE).await, 1);
}

#[tokio::test]
async fn test_failed_intent_does_not_stop_evaluation() {
    let store = Arc::new(MemoryDocumentStore::new());
    let product = Product::new(Uuid::new_v4(), "Blue Widget", "", "tools", dec!(100), 10);
    let make = |kind| {
        Intent::new(
            Uuid::new_v4(),
            product.store_id,
            &product,
            kind,
            Duration::days(2),
            Utc::now(),
        )
    };
    let failing = make(IntentKind::PriceDrop);
    let healthy = make(IntentKind::PriceDrop);
    let intents = Arc::new(FlakyIntents {
        watches: vec![failing.clone(), healthy.clone()],
        failing: failing.id,
        advanced: Mutex::new(Vec::new()),
    });

    let evaluator = IntentEvaluator::new(intents.clone(), NotificationFeed::new(store.clone()));
    let mut cheaper = product.clone();
    cheaper.price = dec!(70);

    let report = evaluator.evaluate_product_change(&cheaper).await;
    assert_eq!(
        report,
        EvaluationReport {
            examined: 2,
            notified: 1,
            failed: 1,
        }
    );
    assert_eq!(*intents.advanced.lock().unwrap(), vec![healthy.id]);

    let feed = NotificationFeed::new(store);
    assert_eq!(feed.list(healthy.user_id).await.unwrap().len(), 1);
    assert!(feed.list(failing.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_notification_fires_again_on_next_evaluation() {
    let store = Arc::new(MemoryDocumentStore::new());
    let notifications = Arc::new(DroppingFeed {
        inner: store.clone(),
        drop_next: AtomicBool::new(true),
    });
    let product = Product::new(Uuid::new_v4(), "Blue Widget", "", "tools", dec!(100), 10);
    let watch = Intent::new(
        Uuid::new_v4(),
        product.store_id,
        &product,
        IntentKind::PriceDrop,
        Duration::days(2),
        Utc::now(),
    );
    store.insert_intent(&watch).await.unwrap();

    let evaluator = IntentEvaluator::new(store.clone(), NotificationFeed::new(notifications));
    let mut cheaper = product.clone();
    cheaper.price = dec!(90);

    let first = evaluator.evaluate_product_change(&cheaper).await;
    assert_eq!(
        first,
        EvaluationReport {
            examined: 1,
            notified: 0,
            failed: 1,
        }
    );
    let stored = store.get_intent(watch.id).await.unwrap().unwrap();
    assert_eq!(stored.status, IntentStatus::Active);
    assert_eq!(stored.meta.last_notified_price, None);

    let second = evaluator.evaluate_product_change(&cheaper).await;
    assert_eq!(
        second,
        EvaluationReport {
            examined: 1,
            notified: 1,
            failed: 0,
        }
    );

    let stored = store.get_intent(watch.id).await.unwrap().unwrap();
    assert_eq!(stored.status, IntentStatus::Triggered);
    assert_eq!(stored.meta.last_notified_price, Some(dec!(90)));

    let feed = NotificationFeed::new(store);
    let drops = feed.list(watch.user_id).await.unwrap();
    assert_eq!(drops.len(), 1);
    assert_eq!(drops[0].title, PRICE_DROP_TITLE);
    assert_eq!(drops[0].message, "Price dropped to ₹90");
}

#[tokio::test]
async fn test_queued_evaluation_runs_on_the_worker() {
    let mut f = fixture(EvaluationMode::Queued, false);
    let shop = add_store(&f.deps, "Corner Shop", 28.0, 77.0).await;
    let widget = add_product(&f.deps, &shop, "Blue Widget", dec!(100), 10).await;
    let user = Uuid::new_v4();

    f.deps
        .intents
        .create_intent(user, shop.id, widget.id, IntentKind::PriceDrop)
        .await
        .unwrap();

    let worker = f.deps.worker.take().unwrap();
    let processed = worker.processed_counter();

    // Queued before the worker starts: the mutation returns without evaluating.
    f.deps
        .catalog
        .update_product(widget.id, ProductUpdate::price(dec!(90)))
        .await
        .unwrap();
    f.deps
        .catalog
        .update_product(widget.id, ProductUpdate::stock(3))
        .await
        .unwrap();
    f.deps
        .catalog
        .update_product(widget.id, ProductUpdate {
            description: Some("now in blue".to_string()),
            ..ProductUpdate::default()
        })
        .await
        .unwrap();
    assert_eq!(titled(&f, user, PRICE_DROP_TITLE).await, 0);

    let handle = tokio::spawn(worker.run());
    f.deps.shutdown_tx.send(()).unwrap();
    let total = handle.await.unwrap();

    assert_eq!(total, 2);
    assert_eq!(processed.load(Ordering::Relaxed), 2);
    assert_eq!(titled(&f, user, PRICE_DROP_TITLE).await, 1);
}

#[tokio::test]
async fn test_full_evaluation_queue_does_not_block_mutations() {
    let mut f = fixture_with(
        Settings {
            evaluation_mode: EvaluationMode::Queued,
            evaluation_queue_size: 1,
            ..Settings::default()
        },
        false,
    );
    let shop = add_store(&f.deps, "Corner Shop", 28.0, 77.0).await;
    let widget = add_product(&f.deps, &shop, "Blue Widget", dec!(100), 10).await;
    let user = Uuid::new_v4();

    f.deps
        .intents
        .create_intent(user, shop.id, widget.id, IntentKind::PriceDrop)
        .await
        .unwrap();

    // No worker is draining the queue, so only the first change fits.
    let updates = [
        ProductUpdate::price(dec!(90)),
        ProductUpdate::price(dec!(80)),
        ProductUpdate::stock(3),
    ];
    for update in updates {
        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            f.deps.catalog.update_product(widget.id, update),
        )
        .await
        .expect("mutation waited on the evaluation queue")
        .unwrap();
    }

    let worker = f.deps.worker.take().unwrap();
    let handle = tokio::spawn(worker.run());
    f.deps.shutdown_tx.send(()).unwrap();
    assert_eq!(handle.await.unwrap(), 1);

    let feed = f.deps.notifications.list(user).await.unwrap();
    assert_eq!(feed[0].title, PRICE_DROP_TITLE);
    assert_eq!(feed[0].message, "Price dropped to ₹90");
}
