//! Unified error codes for the marketplace
//!
//! This module defines all error codes returned by market-server and
//! understood by its clients. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 6xxx: Catalog errors (listings, categories)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is cancelled or returned, no further transition allowed
    OrderTerminal = 4002,
    /// Requested status change is not a legal step from the current status
    InvalidTransition = 4003,
    /// Listing does not have enough stock for the requested quantity
    InsufficientStock = 4004,
    /// Quantity must be a positive integer
    InvalidQuantity = 4005,
    /// Only delivered orders can be returned
    ReturnNotAllowed = 4006,
    /// Buyer and seller are the same user
    SelfPurchase = 4007,

    // ==================== 6xxx: Catalog ====================
    /// Listing not found
    ListingNotFound = 6001,
    /// Category not found
    CategoryNotFound = 6101,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderTerminal => "Order is already cancelled or returned",
            ErrorCode::InvalidTransition => "Order status transition is not allowed",
            ErrorCode::InsufficientStock => "Listing does not have enough stock",
            ErrorCode::InvalidQuantity => "Quantity must be positive",
            ErrorCode::ReturnNotAllowed => "Only delivered orders can be returned",
            ErrorCode::SelfPurchase => "Sellers cannot order their own listings",

            // Catalog
            ErrorCode::ListingNotFound => "Listing not found",
            ErrorCode::CategoryNotFound => "Category not found",

            // System
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderTerminal),
            4003 => Ok(ErrorCode::InvalidTransition),
            4004 => Ok(ErrorCode::InsufficientStock),
            4005 => Ok(ErrorCode::InvalidQuantity),
            4006 => Ok(ErrorCode::ReturnNotAllowed),
            4007 => Ok(ErrorCode::SelfPurchase),

            // Catalog
            6001 => Ok(ErrorCode::ListingNotFound),
            6101 => Ok(ErrorCode::CategoryNotFound),

            // System
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
