//! Shared types for the marketplace server
//!
//! Wire-level types used by the server and its API clients: error codes,
//! the response envelope, domain models and order status enums.

pub mod error;
pub mod models;
pub mod order;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
