//! Persistence layer
//!
//! [`MarketStore`] is the only way handlers and engines reach stored data.
//! Two implementations:
//!
//! - [`MemoryStore`] - one mutex over all tables (tests, local development)
//! - [`PgStore`] - PostgreSQL via sqlx, row locks inside transactions

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::models::{Category, Listing, Order, OrderFact, Role, User};
use shared::{AppError, ErrorCode};
use thiserror::Error;

use crate::orders::{OrderError, PlaceOrder, Transition, TransitionStep};

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    /// The state machine refused the requested step
    #[error(transparent)]
    Rejected(#[from] OrderError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for RepoError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        RepoError::Database(format!("migration failed: {}", err))
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Rejected(order_err) => order_err.into(),
            RepoError::Database(msg) | RepoError::Corrupt(msg) => {
                tracing::error!(error = %msg, "Repository error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Half-open time filter on `created_at`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn since(from: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            until: None,
        }
    }

    pub fn between(from: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            until: Some(until),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.until.is_none_or(|until| at < until)
    }
}

/// Marketplace persistence
///
/// Reads are plain lookups. The two write methods are atomic: each loads
/// and locks what it touches, runs a state-machine function, then writes
/// the order and the listing stock together or not at all.
#[async_trait]
pub trait MarketStore: Send + Sync {
    /// Short backend name for health output
    fn kind(&self) -> &'static str;

    // ========== Catalog ==========

    async fn list_categories(&self) -> RepoResult<Vec<Category>>;
    async fn find_category(&self, id: i64) -> RepoResult<Option<Category>>;
    async fn find_category_by_slug(&self, slug: &str) -> RepoResult<Option<Category>>;
    async fn find_listing(&self, id: i64) -> RepoResult<Option<Listing>>;
    /// Listings whose category is one of `category_ids`, newest first
    async fn listings_in_categories(&self, category_ids: &[i64]) -> RepoResult<Vec<Listing>>;
    async fn count_listings(&self) -> RepoResult<i64>;

    // ========== Users ==========

    async fn find_user(&self, id: i64) -> RepoResult<Option<User>>;
    async fn list_users_by_role(&self, role: Role) -> RepoResult<Vec<User>>;
    async fn count_users(&self) -> RepoResult<i64>;

    // ========== Orders ==========

    async fn find_order(&self, id: i64) -> RepoResult<Option<Order>>;
    async fn orders_for_seller(&self, seller_id: i64, range: TimeRange) -> RepoResult<Vec<Order>>;
    /// Orders annotated with category and seller labels, oldest first
    async fn order_facts(&self, range: TimeRange) -> RepoResult<Vec<OrderFact>>;

    /// Create guard + stock reservation + insert, as one unit
    async fn place_order(&self, cmd: PlaceOrder, now: DateTime<Utc>) -> RepoResult<Order>;

    /// Run `step` against the locked order, then persist the order and
    /// put `restock` units back on a stock-tracked listing, as one unit
    ///
    /// The returned `restock` is what was actually put back: 0 when the
    /// listing does not track stock.
    async fn transition_order(
        &self,
        order_id: i64,
        step: &TransitionStep<'_>,
    ) -> RepoResult<Transition>;
}
