//! Intent types.
//!
//! An intent is a user's registered interest in a product: a reservation, a
//! price-drop watch, or a stock-change watch. Watches carry a watermark (the
//! last price or stock value the owner was notified about) so that the same
//! condition never notifies twice.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::types::product::{Product, ProductSummary};
use crate::types::store::StoreSummary;

/// The kind of interest a user registered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    /// Hold the product for the user until the reservation expires.
    Reserve,
    /// Notify when the price falls below the last notified (or initial) price.
    PriceDrop,
    /// Notify when stock moves to a different, non-zero level.
    StockChange,
}

impl IntentKind {
    /// Returns true for kinds evaluated on product mutations.
    pub fn is_watch(&self) -> bool {
        matches!(self, IntentKind::PriceDrop | IntentKind::StockChange)
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntentKind::Reserve => "RESERVE",
            IntentKind::PriceDrop => "PRICE_DROP",
            IntentKind::StockChange => "STOCK_CHANGE",
        };
        f.write_str(s)
    }
}

/// Lifecycle status of an intent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentStatus {
    #[default]
    Active,
    /// A watch condition fired at least once. Still watched.
    Triggered,
    /// Cancelled by the owner. Terminal.
    Cancelled,
}

impl IntentStatus {
    /// Returns true if the intent is still outstanding (not cancelled).
    pub fn is_open(&self) -> bool {
        !matches!(self, IntentStatus::Cancelled)
    }
}

/// A value an intent last notified its owner about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum Watermark {
    Price(Decimal),
    Stock(u32),
}

/// Snapshot of the product state at intent creation plus notification watermarks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntentMeta {
    pub initial_price: Decimal,
    pub initial_stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_notified_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_notified_stock: Option<u32>,
}

impl IntentMeta {
    /// Snapshot the current state of `product`.
    pub fn snapshot(product: &Product) -> Self {
        Self {
            initial_price: product.price,
            initial_stock: product.stock,
            last_notified_price: None,
            last_notified_stock: None,
        }
    }

    /// The price a drop is measured against.
    pub fn reference_price(&self) -> Decimal {
        self.last_notified_price.unwrap_or(self.initial_price)
    }

    /// The stock level a change is measured against.
    pub fn reference_stock(&self) -> u32 {
        self.last_notified_stock.unwrap_or(self.initial_stock)
    }

    /// The stored watermark relevant to `kind`, if the intent ever notified.
    pub fn last_notified(&self, kind: IntentKind) -> Option<Watermark> {
        match kind {
            IntentKind::PriceDrop => self.last_notified_price.map(Watermark::Price),
            IntentKind::StockChange => self.last_notified_stock.map(Watermark::Stock),
            IntentKind::Reserve => None,
        }
    }

    /// Record a new watermark.
    pub fn record(&mut self, watermark: Watermark) {
        match watermark {
            Watermark::Price(price) => self.last_notified_price = Some(price),
            Watermark::Stock(stock) => self.last_notified_stock = Some(stock),
        }
    }

    /// Put the watermark for `kind` back to `previous`.
    pub fn restore(&mut self, kind: IntentKind, previous: Option<Watermark>) {
        match (kind, previous) {
            (_, Some(watermark)) => self.record(watermark),
            (IntentKind::PriceDrop, None) => self.last_notified_price = None,
            (IntentKind::StockChange, None) => self.last_notified_stock = None,
            (IntentKind::Reserve, None) => {}
        }
    }
}

/// A user's registered interest in a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub store_id: Uuid,
    pub product_id: Uuid,
    pub kind: IntentKind,
    pub status: IntentStatus,
    pub meta: IntentMeta,
    /// Set if and only if `kind` is `Reserve`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Intent {
    /// Create an active intent snapshotting `product`.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The owner of the intent
    /// * `store_id` - The store the intent was registered from
    /// * `product` - The product's current state
    /// * `kind` - The kind of interest
    /// * `reserve_ttl` - Lifetime of a reservation, ignored for watches. An
    ///   expiry past the representable range saturates to the latest instant.
    /// * `now` - Creation time
    pub fn new(
        user_id: Uuid,
        store_id: Uuid,
        product: &Product,
        kind: IntentKind,
        reserve_ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let expires_at = match kind {
            IntentKind::Reserve => Some(
                now.checked_add_signed(reserve_ttl)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            ),
            IntentKind::PriceDrop | IntentKind::StockChange => None,
        };

        Self {
            id: Uuid::new_v4(),
            user_id,
            store_id,
            product_id: product.id,
            kind,
            status: IntentStatus::Active,
            meta: IntentMeta::snapshot(product),
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true for a reservation whose expiry is at or before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.kind == IntentKind::Reserve && self.expires_at.is_some_and(|at| at <= now)
    }
}

/// An intent populated with the product and store it refers to.
///
/// `product` or `store` is `None` when the referenced record no longer exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntentView {
    #[serde(flatten)]
    pub intent: Intent,
    pub product: Option<ProductSummary>,
    pub store: Option<StoreSummary>,
}
