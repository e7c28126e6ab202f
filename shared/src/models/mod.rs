//! Data models
//!
//! Shared between market-server and its API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (PostgreSQL BIGSERIAL).

pub mod category;
pub mod listing;
pub mod order;
pub mod user;

// Re-exports
pub use category::*;
pub use listing::*;
pub use order::*;
pub use user::*;
