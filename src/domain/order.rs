use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Approve,
    Reject,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approve => "approve",
            OrderStatus::Reject => "reject",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "approve" => Ok(OrderStatus::Approve),
            "reject" => Ok(OrderStatus::Reject),
            other => Err(DomainError::InvalidInput(format!(
                "Unknown order status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddress {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub address_details: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub code: String,
    pub name: String,
    pub price: BigDecimal,
    pub quantity: i32,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub order_code: String,
    pub order_date: DateTime<Utc>,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub payment_method: String,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

/// Resume position in the orders listing (newest `order_date` first, then id).
#[derive(Debug, Clone, PartialEq)]
pub struct OrderCursor {
    pub order_date: DateTime<Utc>,
    pub id: Uuid,
}

impl From<&Order> for OrderCursor {
    fn from(order: &Order) -> Self {
        Self {
            order_date: order.order_date,
            id: order.id,
        }
    }
}
