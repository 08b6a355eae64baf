use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub unmissable_offer: bool,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable product fields, shared by the create and edit forms.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub code: String,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub unmissable_offer: bool,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.code.trim().is_empty() {
            return Err(DomainError::InvalidInput("Product code is required".into()));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("Product name is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "Product description is required".into(),
            ));
        }
        if self.price <= BigDecimal::zero() {
            return Err(DomainError::InvalidInput(
                "Price must be a positive number".into(),
            ));
        }
        Ok(())
    }
}

/// Product fields as written to the store.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub draft: ProductDraft,
    pub image_url: String,
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductCursor {
    pub code: String,
    pub id: Uuid,
}

impl From<&Product> for ProductCursor {
    fn from(product: &Product) -> Self {
        Self {
            code: product.code.clone(),
            id: product.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub reviewer_name: String,
    pub rating: i16,
    pub comment: String,
    pub review_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub reviewer_name: String,
    pub rating: i16,
    pub comment: String,
}

impl ReviewDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.reviewer_name.trim().is_empty() {
            return Err(DomainError::InvalidInput("Reviewer name is required".into()));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(DomainError::InvalidInput(
                "Rating must be between 1 and 5".into(),
            ));
        }
        if self.comment.chars().count() < 10 {
            return Err(DomainError::InvalidInput(
                "Comment must be at least 10 characters".into(),
            ));
        }
        Ok(())
    }
}
