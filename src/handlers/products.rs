use std::str::FromStr;

use actix_web::{web, HttpRequest, HttpResponse};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::session::AdminSession;
use super::{audited, listing_response, PageParams, Succeeded};
use crate::context::AppContext;
use crate::domain::product::{ImageUpload, Product, ProductDraft, Review, ReviewDraft};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImagePayload {
    pub file_name: String,
    /// File content, standard base64.
    pub data: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub code: String,
    pub name: String,
    pub description: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    #[serde(default)]
    pub unmissable_offer: bool,
    /// Replaces the current image when present.
    pub image: Option<ImagePayload>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub unmissable_offer: bool,
    /// Empty when the product has no image.
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            code: product.code,
            name: product.name,
            description: product.description,
            price: product.price.to_string(),
            unmissable_offer: product.unmissable_offer,
            image_url: product.image_url,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSavedResponse {
    pub succeeded: bool,
    pub product: ProductResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListProductsResponse {
    pub items: Vec<ProductResponse>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    pub reviewer_name: String,
    pub rating: i16,
    pub comment: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub reviewer_name: String,
    pub rating: i16,
    pub comment: String,
    pub review_date: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            product_id: review.product_id,
            reviewer_name: review.reviewer_name,
            rating: review.rating,
            comment: review.comment,
            review_date: review.review_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewAddedResponse {
    pub succeeded: bool,
    pub review: ReviewResponse,
}

impl ProductRequest {
    fn into_parts(self) -> Result<(ProductDraft, Option<ImageUpload>), AppError> {
        let price = BigDecimal::from_str(self.price.trim())
            .map_err(|_| AppError::BadRequest("Price must be a positive number".into()))?;
        let image = self
            .image
            .map(|image| {
                let bytes = STANDARD
                    .decode(image.data.trim())
                    .map_err(|_| AppError::BadRequest("Image data is not valid base64".into()))?;
                Ok::<_, AppError>(ImageUpload {
                    file_name: image.file_name,
                    bytes,
                })
            })
            .transpose()?;
        let draft = ProductDraft {
            code: self.code,
            name: self.name,
            description: self.description,
            price,
            unmissable_offer: self.unmissable_offer,
        };
        Ok((draft, image))
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
#[utoipa::path(
    get,
    path = "/products",
    params(("page" = Option<i64>, Query, description = "1-based page number")),
    responses(
        (status = 200, description = "Products ordered by code", body = ListProductsResponse),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn list_products(
    _admin: AdminSession,
    ctx: web::Data<AppContext>,
    params: web::Query<PageParams>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let page = params.page;
    let products = ctx.products.clone();
    let result = web::block(move || products.list_products(page))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body = ListProductsResponse {
        total_pages: result.total_pages(),
        total: result.total,
        page: result.page,
        page_size: result.page_size,
        items: result.items.into_iter().map(ProductResponse::from).collect(),
    };
    Ok(listing_response(&req, result.reset, body))
}

/// POST /products
///
/// The image, when given, is stored under `products/<unix-millis>_<file name>`.
#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductSavedResponse),
        (status = 400, description = "Invalid product"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn create_product(
    _admin: AdminSession,
    ctx: web::Data<AppContext>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let (draft, image) = body.into_inner().into_parts()?;
    let products = ctx.products.clone();
    let product = web::block(move || {
        audited("create product").run(|| products.create_product(draft, image))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ProductSavedResponse {
        succeeded: true,
        product: product.into(),
    }))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn get_product(
    _admin: AdminSession,
    ctx: web::Data<AppContext>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let products = ctx.products.clone();
    let product = web::block(move || products.get_product(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??
        .ok_or(AppError::NotFound)?;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// PUT /products/{id}
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductSavedResponse),
        (status = 400, description = "Invalid product"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn update_product(
    _admin: AdminSession,
    ctx: web::Data<AppContext>,
    path: web::Path<Uuid>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let (draft, image) = body.into_inner().into_parts()?;
    let products = ctx.products.clone();
    let product = web::block(move || {
        audited("update product").run(|| products.update_product(id, draft, image))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductSavedResponse {
        succeeded: true,
        product: product.into(),
    }))
}

/// DELETE /products/{id}
///
/// The product's reviews are deleted with it.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = Succeeded),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn delete_product(
    _admin: AdminSession,
    ctx: web::Data<AppContext>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let products = ctx.products.clone();
    web::block(move || audited("delete product").run(|| products.delete_product(id)))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(Succeeded::yes()))
}

/// GET /products/{id}/reviews
///
/// Newest first.
#[utoipa::path(
    get,
    path = "/products/{id}/reviews",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Reviews of the product", body = [ReviewResponse]),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn list_reviews(
    _admin: AdminSession,
    ctx: web::Data<AppContext>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let products = ctx.products.clone();
    let reviews = web::block(move || products.list_reviews(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(
        reviews
            .into_iter()
            .map(ReviewResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// POST /products/{id}/reviews
#[utoipa::path(
    post,
    path = "/products/{id}/reviews",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review added", body = ReviewAddedResponse),
        (status = 400, description = "Invalid review"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn add_review(
    _admin: AdminSession,
    ctx: web::Data<AppContext>,
    path: web::Path<Uuid>,
    body: web::Json<ReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner();
    let draft = ReviewDraft {
        reviewer_name: body.reviewer_name,
        rating: body.rating,
        comment: body.comment,
    };
    let products = ctx.products.clone();
    let review = web::block(move || audited("add review").run(|| products.add_review(id, draft)))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ReviewAddedResponse {
        succeeded: true,
        review: review.into(),
    }))
}
