//! Market Server - marketplace order lifecycle and seller scoring
//!
//! # Architecture
//!
//! - **Catalog** (`catalog`): category tree resolution and subtree-scoped listings
//! - **Orders** (`orders`): the order state machine and its HTTP-facing operations
//! - **Scoring** (`scoring`): Good Provider Score per seller and agent ranking
//! - **Reporting** (`reporting`): revenue buckets and marketplace health
//! - **Persistence** (`db`): `MarketStore` with in-memory and PostgreSQL backends
//! - **HTTP API** (`api`): axum routes
//!
//! # Module layout
//!
//! ```text
//! market-server/src/
//! ├── core/          # config, state, server, errors
//! ├── auth/          # JWT verification, CurrentUser extractor
//! ├── db/            # MarketStore, MemoryStore, PgStore
//! ├── catalog/       # category tree
//! ├── orders/        # state machine + service
//! ├── scoring/       # GPS
//! ├── reporting/     # dashboard aggregates
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging, calendar helpers
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod db;
pub mod orders;
pub mod reporting;
pub mod scoring;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use db::{MarketStore, MemoryStore, PgStore};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

// Security logging macro - accepts tracing field syntax
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Install the logger described by `config`
pub fn setup_environment(config: &Config) {
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );
}
