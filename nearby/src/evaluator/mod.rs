//! Intent evaluation after product changes.
//!
//! When a product's price or stock changes, every open watch on it is compared
//! against its watermark: the last value its owner was notified about, or the
//! value snapshotted at creation. A watch that fires advances its watermark
//! with a compare-and-set, and only the winner of that update notifies, so a
//! condition never notifies twice even under concurrent evaluations. If the
//! notification cannot be written the watermark is rewound, leaving the
//! change to fire on the next evaluation.

mod worker;

pub use worker::{EvaluationDispatch, EvaluationWorker, ProductChanged};

use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use nearby_repository::IntentRepository;
use nearby_shared::{Intent, IntentKind, NewNotification, Product, Watermark};

use crate::errors::ServiceError;
use crate::notifications::{store_link, NotificationFeed};

/// Title of price drop notifications.
pub const PRICE_DROP_TITLE: &str = "Price dropped";

/// Title of stock change notifications.
pub const STOCK_CHANGE_TITLE: &str = "Stock updated";

/// Outcome of evaluating one product change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationReport {
    /// Open watches looked at.
    pub examined: usize,
    /// Watches that fired and notified their owner.
    pub notified: usize,
    /// Watches whose evaluation failed.
    pub failed: usize,
}

/// The watermark a watch advances to for the product's current state, if the
/// watch fires.
///
/// A price watch fires when the price is below the reference price. A stock
/// watch fires when the stock differs from the reference and is not zero.
/// Reservations never fire.
pub fn fired_watermark(intent: &Intent, product: &Product) -> Option<Watermark> {
    match intent.kind {
        IntentKind::PriceDrop if product.price < intent.meta.reference_price() => {
            Some(Watermark::Price(product.price))
        }
        IntentKind::StockChange
            if product.stock != intent.meta.reference_stock() && product.stock > 0 =>
        {
            Some(Watermark::Stock(product.stock))
        }
        _ => None,
    }
}

/// Evaluates open watches against product changes.
pub struct IntentEvaluator {
    intents: Arc<dyn IntentRepository>,
    feed: NotificationFeed,
    currency_symbol: String,
}

impl IntentEvaluator {
    pub fn new(intents: Arc<dyn IntentRepository>, feed: NotificationFeed) -> Self {
        Self::with_currency(intents, feed, "₹")
    }

    /// Create an evaluator that formats prices with `currency_symbol`.
    pub fn with_currency(
        intents: Arc<dyn IntentRepository>,
        feed: NotificationFeed,
        currency_symbol: impl Into<String>,
    ) -> Self {
        Self {
            intents,
            feed,
            currency_symbol: currency_symbol.into(),
        }
    }

    /// Evaluate every open watch on `product` against its current state.
    ///
    /// Never fails: a watch that cannot be evaluated is logged and counted in
    /// the report, and the remaining watches are still evaluated.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn evaluate_product_change(&self, product: &Product) -> EvaluationReport {
        let mut report = EvaluationReport::default();

        let watches = match self.intents.watching_product(product.id).await {
            Ok(watches) => watches,
            Err(e) => {
                error!(product_id = %product.id, error = %e, "Failed to load watches");
                report.failed += 1;
                return report;
            }
        };

        for intent in &watches {
            report.examined += 1;
            match self.evaluate_intent(intent, product).await {
                Ok(true) => report.notified += 1,
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    error!(
                        intent_id = %intent.id,
                        product_id = %product.id,
                        error = %e,
                        "Failed to evaluate intent"
                    );
                }
            }
        }

        if report.notified > 0 || report.failed > 0 {
            info!(
                examined = report.examined,
                notified = report.notified,
                failed = report.failed,
                "Evaluated product change"
            );
        }
        report
    }

    /// Returns true if the intent fired and its owner was notified.
    async fn evaluate_intent(&self, intent: &Intent, product: &Product) -> Result<bool, ServiceError> {
        if intent.product_id != product.id {
            return Ok(false);
        }
        let Some(next) = fired_watermark(intent, product) else {
            return Ok(false);
        };

        let expected = intent.meta.last_notified(intent.kind);
        if !self
            .intents
            .advance_watermark(intent.id, expected, next)
            .await?
        {
            debug!(intent_id = %intent.id, "Watermark moved concurrently, skipping");
            return Ok(false);
        }

        if let Err(e) = self.feed.notify(self.notification(intent, next)).await {
            self.rewind(intent, next, expected).await;
            return Err(e);
        }
        Ok(true)
    }

    /// Give the watermark back after a failed notification so the next
    /// evaluation of the same state fires again.
    async fn rewind(&self, intent: &Intent, applied: Watermark, previous: Option<Watermark>) {
        match self.intents.rewind_watermark(intent.id, applied, previous).await {
            Ok(true) => debug!(intent_id = %intent.id, "Watermark rewound after failed notification"),
            Ok(false) => warn!(intent_id = %intent.id, "Watermark moved on before it could be rewound"),
            Err(e) => error!(
                intent_id = %intent.id,
                error = %e,
                "Failed to rewind watermark, notification is lost"
            ),
        }
    }

    fn notification(&self, intent: &Intent, watermark: Watermark) -> NewNotification {
        let (title, message) = match watermark {
            Watermark::Price(price) => (
                PRICE_DROP_TITLE,
                format!("Price dropped to {}{}", self.currency_symbol, price),
            ),
            Watermark::Stock(stock) => (
                STOCK_CHANGE_TITLE,
                format!("Stock changed to {} units", stock),
            ),
        };
        NewNotification::new(intent.user_id, title, message, store_link(intent.store_id))
    }
}
