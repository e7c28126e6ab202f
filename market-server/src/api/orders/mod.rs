//! Order API Module
//!
//! Every route needs an authenticated caller; who may do what is decided
//! by the order lifecycle itself.

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/shipping", patch(handler::advance_shipping))
        .route("/{id}/cancel", patch(handler::cancel))
        .route("/{id}/return", patch(handler::mark_returned))
}
