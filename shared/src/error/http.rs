//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::OrderNotFound | Self::ListingNotFound | Self::CategoryNotFound => {
                StatusCode::NOT_FOUND
            }

            // 409 Conflict
            Self::OrderTerminal
            | Self::InvalidTransition
            | Self::InsufficientStock
            | Self::ReturnNotAllowed => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::PermissionDenied | Self::AdminRequired | Self::SelfPurchase => {
                StatusCode::FORBIDDEN
            }

            // 500 Internal Server Error
            Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (validation and malformed input)
            Self::ValidationFailed | Self::InvalidQuantity => StatusCode::BAD_REQUEST,
        }
    }
}
