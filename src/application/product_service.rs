use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::pagination::{paginate, CursorCache, Page, PageRequest};
use crate::domain::ports::{BlobStore, ProductRepository};
use crate::domain::product::{
    ImageUpload, Product, ProductCursor, ProductDraft, ProductRecord, Review, ReviewDraft,
};

pub trait ProductCatalog: Send + Sync {
    fn list_products(&self, page: i64) -> Result<Page<Product>, DomainError>;
    fn get_product(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn create_product(
        &self,
        draft: ProductDraft,
        image: Option<ImageUpload>,
    ) -> Result<Product, DomainError>;
    /// Keeps the current image unless a new one is given.
    fn update_product(
        &self,
        id: Uuid,
        draft: ProductDraft,
        image: Option<ImageUpload>,
    ) -> Result<Product, DomainError>;
    fn delete_product(&self, id: Uuid) -> Result<(), DomainError>;
    fn add_review(&self, product_id: Uuid, review: ReviewDraft) -> Result<Review, DomainError>;
    fn list_reviews(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError>;
}

pub struct ProductService<R, B> {
    repo: R,
    blobs: Arc<B>,
    cursors: CursorCache<(), ProductCursor>,
    page_size: i64,
}

impl<R: ProductRepository, B: BlobStore> ProductService<R, B> {
    pub fn new(repo: R, blobs: Arc<B>, page_size: i64) -> Self {
        Self {
            repo,
            blobs,
            cursors: CursorCache::new(),
            page_size,
        }
    }

    fn upload(&self, image: &ImageUpload) -> Result<String, DomainError> {
        let key = image_key(Utc::now(), &image.file_name);
        let url = self.blobs.put(&key, &image.bytes)?;
        log::info!("Stored product image {} ({} bytes)", key, image.bytes.len());
        Ok(url)
    }

    fn require(&self, id: Uuid) -> Result<Product, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)
    }
}

impl<R: ProductRepository, B: BlobStore> ProductCatalog for ProductService<R, B> {
    fn list_products(&self, page: i64) -> Result<Page<Product>, DomainError> {
        paginate(
            &self.repo,
            &self.cursors,
            &(),
            PageRequest {
                page,
                page_size: self.page_size,
            },
        )
    }

    fn get_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.repo.find_by_id(id)
    }

    fn create_product(
        &self,
        draft: ProductDraft,
        image: Option<ImageUpload>,
    ) -> Result<Product, DomainError> {
        draft.validate()?;
        let image_url = match &image {
            Some(image) => self.upload(image)?,
            None => String::new(),
        };
        let product = self.repo.insert(ProductRecord { draft, image_url })?;
        self.cursors.clear();
        Ok(product)
    }

    fn update_product(
        &self,
        id: Uuid,
        draft: ProductDraft,
        image: Option<ImageUpload>,
    ) -> Result<Product, DomainError> {
        draft.validate()?;
        let current = self.require(id)?;
        let image_url = match &image {
            Some(image) => self.upload(image)?,
            None => current.image_url,
        };
        let product = self.repo.update(id, ProductRecord { draft, image_url })?;
        // The sort key (code) may have changed.
        self.cursors.clear();
        Ok(product)
    }

    fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete(id)?;
        self.cursors.clear();
        Ok(())
    }

    fn add_review(&self, product_id: Uuid, review: ReviewDraft) -> Result<Review, DomainError> {
        review.validate()?;
        self.require(product_id)?;
        self.repo.add_review(
            product_id,
            ReviewDraft {
                reviewer_name: review.reviewer_name.trim().to_string(),
                ..review
            },
        )
    }

    fn list_reviews(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError> {
        self.require(product_id)?;
        self.repo.list_reviews(product_id)
    }
}

/// Blob key of a product image: `products/<unix-millis>_<file name>`.
pub fn image_key(now: DateTime<Utc>, file_name: &str) -> String {
    let name: String = file_name
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') || c.is_control() { '_' } else { c })
        .collect();
    let name = if name.is_empty() { "image".to_string() } else { name };
    format!("products/{}_{}", now.timestamp_millis(), name)
}
