use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderItem, OrderStatus, ShippingAddress};
use crate::domain::product::{Product, Review};
use crate::domain::user::User;
use crate::schema::{order_items, orders, products, reviews, users};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub is_admin: bool,
    pub is_super_admin: bool,
    pub blocked: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            is_admin: row.is_admin,
            is_super_admin: row.is_super_admin,
            blocked: row.blocked,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub display_name: &'a str,
    pub is_admin: bool,
    pub created_by: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub order_code: String,
    pub order_date: DateTime<Utc>,
    pub user_id: String,
    pub payment_method: String,
    pub shipping_address: Value,
    pub status: String,
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub code: String,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: i32,
    pub image_url: String,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            code: row.code,
            name: row.name,
            price: row.price,
            quantity: row.quantity,
            image_url: row.image_url,
        }
    }
}

impl OrderRow {
    pub fn into_order(self, items: Vec<OrderItemRow>) -> Result<Order, DomainError> {
        let status: OrderStatus = self
            .status
            .parse()
            .map_err(|e: DomainError| DomainError::Internal(format!("order {}: {}", self.id, e)))?;
        let shipping_address = serde_json::from_value::<ShippingAddress>(self.shipping_address)
            .unwrap_or_else(|e| {
                log::warn!("Order {} has an unreadable shipping address: {}", self.id, e);
                ShippingAddress::default()
            });
        Ok(Order {
            id: self.id,
            order_code: self.order_code,
            order_date: self.order_date,
            user_id: self.user_id,
            items: items.into_iter().map(OrderItem::from).collect(),
            payment_method: self.payment_method,
            shipping_address,
            status,
            total_price: self.total_price,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
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

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            code: row.code,
            name: row.name,
            description: row.description,
            price: row.price,
            unmissable_offer: row.unmissable_offer,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Writable product columns; shared by insert and update.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductFields<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub price: &'a BigDecimal,
    pub unmissable_offer: bool,
    pub image_url: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = reviews)]
#[diesel(belongs_to(ProductRow, foreign_key = product_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub reviewer_name: String,
    pub rating: i16,
    pub comment: String,
    pub review_date: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            product_id: row.product_id,
            reviewer_name: row.reviewer_name,
            rating: row.rating,
            comment: row.comment,
            review_date: row.review_date,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReviewRow<'a> {
    pub id: Uuid,
    pub product_id: Uuid,
    pub reviewer_name: &'a str,
    pub rating: i16,
    pub comment: &'a str,
}
