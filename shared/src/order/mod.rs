//! Order lifecycle types
//!
//! Status enums shared by the server state machine and API clients.

pub mod types;

// Re-exports
pub use types::{CancelActor, OrderStatus, ShippingStatus, UnknownStatus, is_legal_pair};
