//! Order status types
//!
//! An order carries two orthogonal status fields: the commercial
//! [`OrderStatus`] and the physical [`ShippingStatus`]. Only the pairs
//! listed in [`is_legal_pair`] may ever be persisted:
//!
//! | status      | shipping_status | reached by                     |
//! |-------------|-----------------|--------------------------------|
//! | `paid`      | `preparing`     | create                         |
//! | `paid`      | `shipped`       | advance (seller)               |
//! | `delivered` | `delivered`     | advance (seller)               |
//! | `cancelled` | `cancelled`     | cancel (buyer/seller) from paid |
//! | `returned`  | `delivered`     | return (buyer) from delivered  |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Commercial status of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Payment is simulated, so a freshly created order is already paid
    #[default]
    Paid,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Returned => "returned",
        }
    }

    /// No transition of any kind leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Returned)
    }
}

/// Physical fulfillment status of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    #[default]
    Preparing,
    Shipped,
    Delivered,
    Cancelled,
}

impl ShippingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// The single status a seller may advance to from this one
    pub fn next(&self) -> Option<ShippingStatus> {
        match self {
            Self::Preparing => Some(Self::Shipped),
            Self::Shipped => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }
}

/// Which side of the trade cancelled an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CancelActor {
    Buyer,
    Seller,
}

impl CancelActor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
        }
    }
}

/// Whether `(status, shipping)` is one of the documented combinations
pub fn is_legal_pair(status: OrderStatus, shipping: ShippingStatus) -> bool {
    matches!(
        (status, shipping),
        (OrderStatus::Paid, ShippingStatus::Preparing)
            | (OrderStatus::Paid, ShippingStatus::Shipped)
            | (OrderStatus::Delivered, ShippingStatus::Delivered)
            | (OrderStatus::Cancelled, ShippingStatus::Cancelled)
            | (OrderStatus::Returned, ShippingStatus::Delivered)
    )
}

/// Error when parsing a status string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(Self::Paid),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "returned" => Ok(Self::Returned),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl FromStr for ShippingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preparing" => Ok(Self::Preparing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl FromStr for CancelActor {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ShippingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
