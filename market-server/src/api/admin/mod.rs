//! Admin dashboard API
//!
//! # Routes
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/admin/stats | GET | counts, revenue, health, monthly category finance |
//! | /api/admin/agents-performance | GET | GPS and revenue per agent, best first |
//! | /api/admin/revenue/agents | GET | revenue per seller for `year` / `month` |
//! | /api/admin/revenue/monthly | GET | revenue per calendar month |
//! | /api/admin/revenue/categories | GET | revenue per category |
//!
//! Every route requires the admin role.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/stats", get(handler::stats))
        .route("/agents-performance", get(handler::agents_performance))
        .route("/revenue/agents", get(handler::revenue_by_agent))
        .route("/revenue/monthly", get(handler::revenue_by_month))
        .route("/revenue/categories", get(handler::revenue_by_category))
}
