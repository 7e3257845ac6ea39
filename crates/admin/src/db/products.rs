//! Product repository for database operations.
//!
//! Image URL and file ID columns are NOT NULL and only ever written as a
//! pair, so a stored product always carries a complete image reference.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use fernway_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::{ImageRef, Product};
use crate::services::products::{ProductDraft, ProductStore};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    image_url: String,
    image_file_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price,
            image: ImageRef {
                url: row.image_url,
                file_id: row.image_file_id,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, image_url, image_file_id,
                   created_at, updated_at
            FROM shop.products
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, image_url, image_file_id,
                   created_at, updated_at
            FROM shop.products
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a new product with its image reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        draft: &ProductDraft,
        image: &ImageRef,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO shop.products (name, description, price, image_url, image_file_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, price, image_url, image_file_id,
                      created_at, updated_at
            ",
        )
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price.amount())
        .bind(&image.url)
        .bind(&image.file_id)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Overwrite a product's scalar fields, and its image reference if a new
    /// one is given. Scalars are always overwritten, image change or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has that ID.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
        image: Option<&ImageRef>,
    ) -> Result<(), RepositoryError> {
        let result = if let Some(image) = image {
            sqlx::query(
                r"
                UPDATE shop.products
                SET name = $1, description = $2, price = $3,
                    image_url = $4, image_file_id = $5, updated_at = now()
                WHERE id = $6
                ",
            )
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price.amount())
            .bind(&image.url)
            .bind(&image.file_id)
            .bind(id.as_i32())
            .execute(self.pool)
            .await?
        } else {
            sqlx::query(
                r"
                UPDATE shop.products
                SET name = $1, description = $2, price = $3, updated_at = now()
                WHERE id = $4
                ",
            )
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price.amount())
            .bind(id.as_i32())
            .execute(self.pool)
            .await?
        };

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a product record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.products WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

impl ProductStore for ProductRepository<'_> {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.list_all().await
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.get_by_id(id).await
    }

    async fn insert(
        &self,
        draft: &ProductDraft,
        image: &ImageRef,
    ) -> Result<Product, RepositoryError> {
        Self::insert(self, draft, image).await
    }

    async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
        image: Option<&ImageRef>,
    ) -> Result<(), RepositoryError> {
        Self::update(self, id, draft, image).await
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        Self::delete(self, id).await
    }
}
