//! Listing Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a listing offers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    /// Physical goods, quantity-tracked when `stock` is set
    #[default]
    Sale,
    Service,
    Rental,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Service => "service",
            Self::Rental => "rental",
        }
    }
}

impl std::str::FromStr for ListingKind {
    type Err = crate::order::UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(Self::Sale),
            "service" => Ok(Self::Service),
            "rental" => Ok(Self::Rental),
            other => Err(crate::order::UnknownStatus(other.to_string())),
        }
    }
}

/// Listing entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: i64,
    pub seller_id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    /// Unit price, exact decimal
    pub price: Decimal,
    pub currency: String,
    pub kind: ListingKind,
    /// Units on hand; only meaningful for `Sale` listings
    pub stock: Option<i32>,
    pub shippable: bool,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Units that can still be ordered, `None` when availability is unlimited
    pub fn available(&self) -> Option<i32> {
        match self.kind {
            ListingKind::Sale => self.stock,
            ListingKind::Service | ListingKind::Rental => None,
        }
    }

    /// Whether stock moves with orders on this listing
    pub fn tracks_stock(&self) -> bool {
        self.available().is_some()
    }
}
