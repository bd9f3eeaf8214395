//! Product types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of image references a product may carry.
pub const MAX_PRODUCT_IMAGES: usize = 5;

/// An item sold by exactly one store.
///
/// Price and stock are mutated arbitrarily often; every such mutation is
/// followed by intent evaluation and search cache invalidation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub stock: u32,
    /// Image URLs managed by the media store.
    #[serde(default)]
    pub images: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a product with a fresh id and no images.
    pub fn new(
        store_id: Uuid,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        price: Decimal,
        stock: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            store_id,
            name: name.into(),
            description: description.into(),
            category: category.into(),
            price,
            stock,
            images: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Validate the product invariants.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name cannot be empty".to_string());
        }

        if self.price <= Decimal::ZERO {
            return Err(format!("Price must be positive, got {}", self.price));
        }

        if self.images.len() > MAX_PRODUCT_IMAGES {
            return Err(format!(
                "A product can have at most {} images, got {}",
                MAX_PRODUCT_IMAGES,
                self.images.len()
            ));
        }

        Ok(())
    }

    pub fn summary(&self) -> ProductSummary {
        ProductSummary::from(self)
    }
}

/// Partial update of a product. Fields that are `None` are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl ProductUpdate {
    /// An update that only changes the price.
    pub fn price(price: Decimal) -> Self {
        Self {
            price: Some(price),
            ..Default::default()
        }
    }

    /// An update that only changes the stock level.
    pub fn stock(stock: u32) -> Self {
        Self {
            stock: Some(stock),
            ..Default::default()
        }
    }

    /// Apply the update to `product`, bumping `updated_at`.
    ///
    /// Returns `true` when the price or stock changed, i.e. when outstanding
    /// watches on the product need to be evaluated.
    pub fn apply(self, product: &mut Product) -> bool {
        let mut watched_change = false;

        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(images) = self.images {
            product.images = images;
        }
        if let Some(price) = self.price {
            watched_change |= product.price != price;
            product.price = price;
        }
        if let Some(stock) = self.stock {
            watched_change |= product.stock != stock;
            product.stock = stock;
        }

        product.updated_at = Utc::now();
        watched_change
    }
}

/// The subset of a product shown in search results and intent listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            stock: product.stock,
            images: product.images.clone(),
        }
    }
}
