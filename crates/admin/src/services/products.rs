//! Product flow: create/read/update/delete coordinated with the image host.
//!
//! Every stored product carries a complete image reference, so mutations
//! order their external calls to keep the record and the hosted asset in
//! step:
//!
//! - create: upload first, persist second; if persistence fails the upload
//!   is compensated with a best-effort delete so the asset is not leaked
//! - update with a new image: delete the old asset, upload the new one,
//!   then overwrite the record; a failure in either external call aborts
//!   and leaves the record untouched (no cross-service transaction)
//! - delete: remove the hosted asset first; the record is only removed once
//!   the asset is gone
//!
//! Concurrent mutations of the same product are not serialized here; the
//! store's last write wins.

use fernway_core::{Price, ProductId};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::{ImageRef, Product};
use crate::services::imagekit::{ImageHost, ImageHostError};

/// Errors that can occur in the product flow.
#[derive(Debug, Error)]
pub enum ProductFlowError {
    /// No product with the requested ID.
    #[error("product not found")]
    NotFound,

    /// Create was attempted without an image file.
    #[error("an image file is required")]
    MissingImage,

    /// The image host rejected or failed a call.
    #[error("image host error: {0}")]
    Host(#[from] ImageHostError),

    /// The product store failed.
    #[error("database error: {0}")]
    Store(RepositoryError),
}

impl From<RepositoryError> for ProductFlowError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

/// Scalar product fields submitted by the create/edit forms.
///
/// Always written in full on update, whether or not the image changed.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
}

/// An image file received from a multipart form, buffered in memory.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Seam for product persistence.
///
/// The production implementation is `db::ProductRepository`; service tests
/// use an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait ProductStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn insert(
        &self,
        draft: &ProductDraft,
        image: &ImageRef,
    ) -> Result<Product, RepositoryError>;
    async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
        image: Option<&ImageRef>,
    ) -> Result<(), RepositoryError>;
    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError>;
}

/// Product flow service over a store and an image host.
pub struct ProductService<S, H> {
    store: S,
    host: H,
    folder: String,
}

impl<S: ProductStore, H: ImageHost> ProductService<S, H> {
    /// Create a new product service uploading into `folder` on the host.
    pub const fn new(store: S, host: H, folder: String) -> Self {
        Self {
            store,
            host,
            folder,
        }
    }

    /// List all products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ProductFlowError::Store` if the store query fails.
    pub async fn list(&self) -> Result<Vec<Product>, ProductFlowError> {
        Ok(self.store.list().await?)
    }

    /// Get a product for display or editing.
    ///
    /// # Errors
    ///
    /// Returns `ProductFlowError::NotFound` if no product has that ID.
    pub async fn get(&self, id: ProductId) -> Result<Product, ProductFlowError> {
        self.store
            .get(id)
            .await?
            .ok_or(ProductFlowError::NotFound)
    }

    /// Create a product with a mandatory initial image.
    ///
    /// The image is uploaded first; only after a successful upload is the
    /// record persisted. If persistence then fails, the just-uploaded asset
    /// is deleted again (best effort) before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns `ProductFlowError::MissingImage` if no image file was
    /// supplied, `ProductFlowError::Host` if the upload fails, and
    /// `ProductFlowError::Store` if persistence fails.
    pub async fn create(
        &self,
        draft: &ProductDraft,
        image: Option<ImageUpload>,
    ) -> Result<Product, ProductFlowError> {
        let image = match image {
            Some(upload) if !upload.bytes.is_empty() => upload,
            _ => return Err(ProductFlowError::MissingImage),
        };

        let uploaded = self
            .host
            .upload(image.bytes, &image.filename, &self.folder)
            .await?;
        let image_ref = ImageRef {
            url: uploaded.url,
            file_id: uploaded.file_id,
        };

        match self.store.insert(draft, &image_ref).await {
            Ok(product) => Ok(product),
            Err(store_err) => {
                // Compensate the upload so the asset isn't orphaned
                if let Err(host_err) = self.host.delete_file(&image_ref.file_id).await {
                    tracing::warn!(
                        file_id = %image_ref.file_id,
                        error = %host_err,
                        "Failed to clean up uploaded image after insert failure"
                    );
                }
                Err(store_err.into())
            }
        }
    }

    /// Overwrite a product's fields, replacing its image if a new file is
    /// supplied.
    ///
    /// With a new image, the old asset is deleted and the replacement
    /// uploaded before the record is touched; if either external call fails
    /// the record keeps its previous (possibly now-dangling) reference.
    /// Scalar fields are overwritten unconditionally either way.
    ///
    /// # Errors
    ///
    /// Returns `ProductFlowError::NotFound` if no product has that ID,
    /// `ProductFlowError::Host` if an image host call fails, and
    /// `ProductFlowError::Store` if persistence fails.
    pub async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
        new_image: Option<ImageUpload>,
    ) -> Result<(), ProductFlowError> {
        let existing = self
            .store
            .get(id)
            .await?
            .ok_or(ProductFlowError::NotFound)?;

        let replacement = match new_image {
            Some(upload) if !upload.bytes.is_empty() => {
                self.host.delete_file(&existing.image.file_id).await?;
                let uploaded = self
                    .host
                    .upload(upload.bytes, &upload.filename, &self.folder)
                    .await?;
                Some(ImageRef {
                    url: uploaded.url,
                    file_id: uploaded.file_id,
                })
            }
            _ => None,
        };

        self.store.update(id, draft, replacement.as_ref()).await?;
        Ok(())
    }

    /// Delete a product and its hosted image.
    ///
    /// The asset is deleted first; if that fails the record is left in
    /// place. Deleting a product that no longer exists is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ProductFlowError::Host` if the asset deletion fails and
    /// `ProductFlowError::Store` if the record removal fails.
    pub async fn delete(&self, id: ProductId) -> Result<(), ProductFlowError> {
        let Some(product) = self.store.get(id).await? else {
            return Ok(());
        };

        self.host.delete_file(&product.image.file_id).await?;
        self.store.delete(id).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};

    use chrono::Utc;

    use super::*;
    use crate::services::imagekit::UploadedImage;

    const FOLDER: &str = "/shop-products";

    // =========================================================================
    // Fakes
    // =========================================================================

    /// In-memory product store.
    #[derive(Default)]
    struct MemStore {
        products: Mutex<Vec<Product>>,
        next_id: AtomicI32,
        fail_insert: bool,
    }

    impl MemStore {
        fn count(&self) -> usize {
            self.products.lock().unwrap().len()
        }

        fn by_id(&self, id: ProductId) -> Option<Product> {
            self.products
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id)
                .cloned()
        }
    }

    impl ProductStore for &MemStore {
        async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
            Ok(self.products.lock().unwrap().clone())
        }

        async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
            Ok(self.by_id(id))
        }

        async fn insert(
            &self,
            draft: &ProductDraft,
            image: &ImageRef,
        ) -> Result<Product, RepositoryError> {
            if self.fail_insert {
                return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
            }
            let id = ProductId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            let now = Utc::now();
            let product = Product {
                id,
                name: draft.name.clone(),
                description: draft.description.clone(),
                price: draft.price,
                image: image.clone(),
                created_at: now,
                updated_at: now,
            };
            self.products.lock().unwrap().push(product.clone());
            Ok(product)
        }

        async fn update(
            &self,
            id: ProductId,
            draft: &ProductDraft,
            image: Option<&ImageRef>,
        ) -> Result<(), RepositoryError> {
            let mut products = self.products.lock().unwrap();
            let product = products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(RepositoryError::NotFound)?;
            product.name = draft.name.clone();
            product.description = draft.description.clone();
            product.price = draft.price;
            if let Some(image) = image {
                product.image = image.clone();
            }
            product.updated_at = Utc::now();
            Ok(())
        }

        async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
            self.products.lock().unwrap().retain(|p| p.id != id);
            Ok(())
        }
    }

    /// Image host fake that records uploads and deletions.
    #[derive(Default)]
    struct FakeHost {
        counter: AtomicU32,
        uploaded: Mutex<Vec<String>>,
        deleted: Mutex<Vec<String>>,
        fail_upload: bool,
        fail_delete: bool,
    }

    impl FakeHost {
        fn host_error() -> ImageHostError {
            ImageHostError::Api {
                status: 503,
                message: "unavailable".to_string(),
            }
        }

        fn deleted_ids(&self) -> Vec<String> {
            self.deleted.lock().unwrap().clone()
        }

        /// True if the asset was uploaded and never deleted.
        fn serves(&self, file_id: &str) -> bool {
            let uploaded = self.uploaded.lock().unwrap();
            let deleted = self.deleted.lock().unwrap();
            uploaded.iter().any(|id| id == file_id) && !deleted.iter().any(|id| id == file_id)
        }
    }

    impl ImageHost for &FakeHost {
        async fn upload(
            &self,
            _bytes: Vec<u8>,
            filename: &str,
            folder: &str,
        ) -> Result<UploadedImage, ImageHostError> {
            assert_eq!(folder, FOLDER);
            if self.fail_upload {
                return Err(FakeHost::host_error());
            }
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            let file_id = format!("file-{n}");
            self.uploaded.lock().unwrap().push(file_id.clone());
            Ok(UploadedImage {
                url: format!("https://ik.example.com/{file_id}/{filename}"),
                file_id,
            })
        }

        async fn delete_file(&self, file_id: &str) -> Result<(), ImageHostError> {
            if self.fail_delete {
                return Err(FakeHost::host_error());
            }
            self.deleted.lock().unwrap().push(file_id.to_string());
            Ok(())
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn draft(name: &str) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            description: "A fine product".to_string(),
            price: Price::parse("9.99").unwrap(),
        }
    }

    fn png() -> ImageUpload {
        ImageUpload {
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
            filename: "image.png".to_string(),
        }
    }

    fn service<'a>(
        store: &'a MemStore,
        host: &'a FakeHost,
    ) -> ProductService<&'a MemStore, &'a FakeHost> {
        ProductService::new(store, host, FOLDER.to_string())
    }

    async fn seed(store: &MemStore, host: &FakeHost, name: &str) -> Product {
        service(store, host)
            .create(&draft(name), Some(png()))
            .await
            .unwrap()
    }

    // =========================================================================
    // Create
    // =========================================================================

    #[tokio::test]
    async fn test_create_without_image_persists_nothing() {
        let store = MemStore::default();
        let host = FakeHost::default();

        let err = service(&store, &host)
            .create(&draft("Widget"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ProductFlowError::MissingImage));
        assert_eq!(store.count(), 0);
        assert!(host.uploaded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_with_empty_image_part_is_missing_image() {
        let store = MemStore::default();
        let host = FakeHost::default();

        let empty = ImageUpload {
            bytes: Vec::new(),
            filename: "image.png".to_string(),
        };
        let err = service(&store, &host)
            .create(&draft("Widget"), Some(empty))
            .await
            .unwrap_err();

        assert!(matches!(err, ProductFlowError::MissingImage));
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn test_create_uploads_then_persists() {
        let store = MemStore::default();
        let host = FakeHost::default();

        let product = service(&store, &host)
            .create(&draft("Widget"), Some(png()))
            .await
            .unwrap();

        assert_eq!(product.name, "Widget");
        assert!(!product.image.url.is_empty());
        assert!(host.serves(&product.image.file_id));
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn test_create_upload_failure_persists_nothing() {
        let store = MemStore::default();
        let host = FakeHost {
            fail_upload: true,
            ..FakeHost::default()
        };

        let err = service(&store, &host)
            .create(&draft("Widget"), Some(png()))
            .await
            .unwrap_err();

        assert!(matches!(err, ProductFlowError::Host(_)));
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn test_create_rolls_back_upload_when_insert_fails() {
        let store = MemStore {
            fail_insert: true,
            ..MemStore::default()
        };
        let host = FakeHost::default();

        let err = service(&store, &host)
            .create(&draft("Widget"), Some(png()))
            .await
            .unwrap_err();

        assert!(matches!(err, ProductFlowError::Store(_)));
        assert_eq!(store.count(), 0);
        // The uploaded asset was compensated away
        assert_eq!(host.deleted_ids(), vec!["file-1".to_string()]);
    }

    // =========================================================================
    // Update
    // =========================================================================

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let store = MemStore::default();
        let host = FakeHost::default();

        let err = service(&store, &host)
            .update(ProductId::new(99), &draft("Widget"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ProductFlowError::NotFound));
    }

    #[tokio::test]
    async fn test_update_overwrites_scalars_without_touching_image() {
        let store = MemStore::default();
        let host = FakeHost::default();
        let product = seed(&store, &host, "Widget").await;

        service(&store, &host)
            .update(product.id, &draft("Gadget"), None)
            .await
            .unwrap();

        let updated = store.by_id(product.id).unwrap();
        assert_eq!(updated.name, "Gadget");
        assert_eq!(updated.image, product.image);
        assert!(host.deleted_ids().is_empty());
    }

    #[tokio::test]
    async fn test_update_with_new_image_replaces_old_asset() {
        let store = MemStore::default();
        let host = FakeHost::default();
        let product = seed(&store, &host, "Widget").await;
        let old_file_id = product.image.file_id.clone();

        service(&store, &host)
            .update(product.id, &draft("Widget"), Some(png()))
            .await
            .unwrap();

        let updated = store.by_id(product.id).unwrap();
        assert_ne!(updated.image.file_id, old_file_id);
        assert!(!host.serves(&old_file_id));
        assert!(host.serves(&updated.image.file_id));
    }

    #[tokio::test]
    async fn test_update_aborts_when_old_delete_fails() {
        let store = MemStore::default();
        let host = FakeHost::default();
        let product = seed(&store, &host, "Widget").await;

        let failing = FakeHost {
            fail_delete: true,
            ..FakeHost::default()
        };
        let err = ProductService::new(&store, &failing, FOLDER.to_string())
            .update(product.id, &draft("Gadget"), Some(png()))
            .await
            .unwrap_err();

        assert!(matches!(err, ProductFlowError::Host(_)));
        // Record untouched, including scalars
        let unchanged = store.by_id(product.id).unwrap();
        assert_eq!(unchanged.name, "Widget");
        assert_eq!(unchanged.image, product.image);
    }

    #[tokio::test]
    async fn test_update_aborts_when_new_upload_fails() {
        let store = MemStore::default();
        let host = FakeHost::default();
        let product = seed(&store, &host, "Widget").await;

        let failing = FakeHost {
            fail_upload: true,
            ..FakeHost::default()
        };
        let err = ProductService::new(&store, &failing, FOLDER.to_string())
            .update(product.id, &draft("Gadget"), Some(png()))
            .await
            .unwrap_err();

        assert!(matches!(err, ProductFlowError::Host(_)));
        let unchanged = store.by_id(product.id).unwrap();
        assert_eq!(unchanged.image, product.image);
    }

    // =========================================================================
    // Delete
    // =========================================================================

    #[tokio::test]
    async fn test_delete_removes_asset_then_record() {
        let store = MemStore::default();
        let host = FakeHost::default();
        let product = seed(&store, &host, "Widget").await;

        service(&store, &host).delete(product.id).await.unwrap();

        assert_eq!(store.count(), 0);
        assert!(!host.serves(&product.image.file_id));
        assert_eq!(host.deleted_ids(), vec![product.image.file_id]);
    }

    #[tokio::test]
    async fn test_delete_keeps_record_when_asset_delete_fails() {
        let store = MemStore::default();
        let host = FakeHost::default();
        let product = seed(&store, &host, "Widget").await;

        let failing = FakeHost {
            fail_delete: true,
            ..FakeHost::default()
        };
        let err = ProductService::new(&store, &failing, FOLDER.to_string())
            .delete(product.id)
            .await
            .unwrap_err();

        assert!(matches!(err, ProductFlowError::Host(_)));
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_product_is_noop() {
        let store = MemStore::default();
        let host = FakeHost::default();

        service(&store, &host)
            .delete(ProductId::new(99))
            .await
            .unwrap();

        assert!(host.deleted_ids().is_empty());
    }
}
