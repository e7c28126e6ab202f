//! Order Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::{CancelActor, OrderStatus, ShippingStatus};

/// Order entity
///
/// Created once, then mutated only through the lifecycle transitions.
/// Orders are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub listing_id: i64,
    pub buyer_id: i64,
    /// Owner of the listing at the moment the order was placed
    pub seller_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub shipping_status: ShippingStatus,
    pub address_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub canceled_at: Option<DateTime<Utc>>,
    pub canceled_by: Option<CancelActor>,
    pub cancel_reason: Option<String>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Counts towards revenue (everything except cancelled orders)
    pub fn is_revenue(&self) -> bool {
        self.status != OrderStatus::Cancelled
    }

    pub fn cancelled_by_seller(&self) -> bool {
        self.status == OrderStatus::Cancelled && self.canceled_by == Some(CancelActor::Seller)
    }
}

/// Create order payload (the buyer is the caller)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub listing_id: i64,
    pub quantity: i32,
    pub address_id: Option<i64>,
}

/// Advance shipping payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingUpdate {
    pub shipping_status: ShippingStatus,
}

/// Cancel order payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderCancel {
    pub reason: Option<String>,
}

/// Order joined with the labels reports group by
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderFact {
    #[serde(flatten)]
    pub order: Order,
    pub category_id: Option<i64>,
    pub category_title: Option<String>,
    pub seller_name: Option<String>,
}
