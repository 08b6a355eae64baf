use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::session::AdminSession;
use super::{audited, listing_response};
use crate::context::AppContext;
use crate::domain::order::{Order, OrderItem, OrderStatus, ShippingAddress};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub code: String,
    pub name: String,
    /// Decimal price as a string, e.g. "9.99"
    pub price: String,
    pub quantity: i32,
    pub image_url: String,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            code: item.code,
            name: item.name,
            price: item.price.to_string(),
            quantity: item.quantity,
            image_url: item.image_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_code: String,
    pub order_date: DateTime<Utc>,
    pub user_id: String,
    pub items: Vec<OrderItemResponse>,
    pub payment_method: String,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    pub total_price: String,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            order_code: order.order_code,
            order_date: order.order_date,
            user_id: order.user_id,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            payment_method: order.payment_method,
            shipping_address: order.shipping_address,
            status: order.status,
            total_price: order.total_price.to_string(),
            created_at: order.created_at,
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// One of `pending`, `approve`, `reject`; all orders when absent.
    pub status: Option<String>,
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateStatusResponse {
    pub succeeded: bool,
    pub order: OrderResponse,
}

fn parse_status(raw: &str) -> Result<OrderStatus, AppError> {
    Ok(raw.trim().to_ascii_lowercase().parse::<OrderStatus>()?)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders
///
/// Newest orders first, optionally only those with one status.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "1-based page number"),
        ("status" = Option<String>, Query, description = "pending, approve or reject"),
    ),
    responses(
        (status = 200, description = "A page of orders", body = ListOrdersResponse),
        (status = 400, description = "Unknown status"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    _admin: AdminSession,
    ctx: web::Data<AppContext>,
    params: web::Query<ListOrdersParams>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let params = params.into_inner();
    let status = params
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(parse_status)
        .transpose()?;
    let orders = ctx.orders.clone();
    let result = web::block(move || orders.list_orders(params.page, status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body = ListOrdersResponse {
        total_pages: result.total_pages(),
        total: result.total,
        page: result.page,
        page_size: result.page_size,
        items: result.items.into_iter().map(OrderResponse::from).collect(),
    };
    Ok(listing_response(&req, result.reset, body))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order(
    _admin: AdminSession,
    ctx: web::Data<AppContext>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let orders = ctx.orders.clone();
    let order = web::block(move || orders.get_order(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??
        .ok_or(AppError::NotFound)?;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PUT /orders/{id}/status
#[utoipa::path(
    put,
    path = "/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = UpdateStatusResponse),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn update_status(
    _admin: AdminSession,
    ctx: web::Data<AppContext>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let status = parse_status(&body.status)?;
    let orders = ctx.orders.clone();
    let order = web::block(move || {
        audited("change order status").run(|| orders.update_status(id, status))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(UpdateStatusResponse {
        succeeded: true,
        order: order.into(),
    }))
}
