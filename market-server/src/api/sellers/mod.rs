//! Seller API module

mod handler;

pub use handler::WindowQuery;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/sellers/{id}/performance", get(handler::performance))
}
