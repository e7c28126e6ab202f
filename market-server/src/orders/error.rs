//! Order lifecycle errors

use shared::order::{OrderStatus, ShippingStatus};
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Rejections raised by the order state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Listing not found: {0}")]
    ListingNotFound(i64),

    #[error("{0}")]
    Forbidden(String),

    #[error("Buyers cannot order their own listing")]
    SelfPurchase,

    #[error("Order {order_id} is already {status}")]
    Terminal { order_id: i64, status: OrderStatus },

    #[error("Cannot move shipping from {from} to {to}")]
    InvalidTransition {
        from: ShippingStatus,
        to: ShippingStatus,
    },

    #[error("Order {order_id} cannot be cancelled once {status}")]
    CancelNotAllowed { order_id: i64, status: OrderStatus },

    #[error("Order {order_id} is {status}; only delivered orders can be returned")]
    ReturnNotAllowed { order_id: i64, status: OrderStatus },

    #[error("Only {available} left for listing {listing_id}, requested {requested}")]
    InsufficientStock {
        listing_id: i64,
        available: i32,
        requested: i32,
    },

    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(i32),
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message).with_detail("order_id", id)
            }
            OrderError::ListingNotFound(id) => {
                AppError::with_message(ErrorCode::ListingNotFound, message)
                    .with_detail("listing_id", id)
            }
            OrderError::Forbidden(_) => AppError::permission_denied(message),
            OrderError::SelfPurchase => AppError::with_message(ErrorCode::SelfPurchase, message),
            OrderError::Terminal { order_id, status } => {
                AppError::with_message(ErrorCode::OrderTerminal, message)
                    .with_detail("order_id", order_id)
                    .with_detail("status", status.as_str())
            }
            OrderError::InvalidTransition { from, to } => {
                AppError::with_message(ErrorCode::InvalidTransition, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            OrderError::CancelNotAllowed { order_id, status } => {
                AppError::with_message(ErrorCode::InvalidTransition, message)
                    .with_detail("order_id", order_id)
                    .with_detail("status", status.as_str())
            }
            OrderError::ReturnNotAllowed { order_id, status } => {
                AppError::with_message(ErrorCode::ReturnNotAllowed, message)
                    .with_detail("order_id", order_id)
                    .with_detail("status", status.as_str())
            }
            OrderError::InsufficientStock {
                listing_id,
                available,
                requested,
            } => AppError::with_message(ErrorCode::InsufficientStock, message)
                .with_detail("listing_id", listing_id)
                .with_detail("available", available)
                .with_detail("requested", requested),
            OrderError::InvalidQuantity(quantity) => {
                AppError::with_message(ErrorCode::InvalidQuantity, message)
                    .with_detail("quantity", quantity)
            }
        }
    }
}
