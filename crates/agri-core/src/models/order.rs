//! Order domain model.
//!
//! An order's `total_price` is frozen when the order is placed. Changing
//! the product price afterwards leaves existing orders untouched.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tenant::TenantId;
use crate::error::AgriError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AgriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(AgriError::validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub product_id: Uuid,
    pub quantity: i64,
    pub total_price: f64,
    /// Opaque buyer reference; there is no buyer entity.
    pub buyer_id: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Purchase request as submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub product_id: Uuid,
    pub quantity: i64,
    pub buyer_id: i64,
}

/// Fully priced order ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub product_id: Uuid,
    pub quantity: i64,
    pub total_price: f64,
    pub buyer_id: i64,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}
