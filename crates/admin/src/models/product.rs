//! Product domain types.

use chrono::{DateTime, Utc};

use fernway_core::{Price, ProductId};

/// A reference to an asset stored in the image host.
///
/// The URL and the host's file ID always travel together; a product is never
/// persisted with one and not the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Public URL serving the asset.
    pub url: String,
    /// Opaque file identifier used to delete the asset later.
    pub file_id: String,
}

/// A catalog product (domain type).
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Non-negative price.
    pub price: Price,
    /// Hosted image reference.
    pub image: ImageRef,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}
