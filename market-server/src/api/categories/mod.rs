//! Category API module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/categories", routes())
        .route("/api/category/{slug}/listings", get(handler::listings_by_slug))
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}/subtree", get(handler::subtree))
}
