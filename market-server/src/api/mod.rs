//! HTTP API
//!
//! # Structure
//!
//! - [`health`] - liveness
//! - [`categories`] - category listing, subtree resolution, listings by slug
//! - [`orders`] - order lifecycle
//! - [`sellers`] - seller performance score
//! - [`admin`] - dashboard reports
//! - [`extract`] - `Json` / `Path` / `Query` wrappers rejecting with `AppError`

pub mod admin;
pub mod categories;
pub mod extract;
pub mod health;
pub mod orders;
pub mod sellers;

use axum::Router;
use http::{HeaderValue, Method, header};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Public
        .merge(health::router())
        .merge(categories::router())
        // Authenticated through the CurrentUser extractor
        .merge(orders::router())
        .merge(sellers::router())
        // Admin role required
        .merge(admin::router())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Build the application with middleware; used by the server and by tests
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router().layer(
        ServiceBuilder::new()
            // Request ID - generated first so the trace span can see it
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            // Trace - request logging at INFO
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CompressionLayer::new())
            // CORS - only configured origins, cookies allowed
            .layer(cors_layer(&state.config.cors_origins)),
    )
}
