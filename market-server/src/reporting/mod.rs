//! Dashboard reports
//!
//! Loads order facts for a period and hands them to the pure
//! [`aggregate`] functions.

pub mod aggregate;

pub use aggregate::{
    Bucket, HealthScore, HealthStatus, MonthlyFinance, OTHER_CATEGORY, health_score,
    monthly_category_finance, revenue_by_agent, revenue_by_category, revenue_by_month,
    total_revenue,
};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::OrderFact;

use crate::db::{MarketStore, TimeRange};
use crate::utils::AppResult;
use crate::utils::time::period_range;

/// Admin dashboard summary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub total_listings: i64,
    pub total_revenue: Decimal,
    pub health: HealthScore,
    pub finance_data: Vec<MonthlyFinance>,
}

/// Optional calendar filter used by the revenue reports
#[derive(Debug, Clone, Copy, Default)]
pub struct Period {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl Period {
    pub fn range(&self, now: DateTime<Utc>) -> AppResult<TimeRange> {
        Ok(period_range(self.year, self.month, now)?
            .map(|(from, until)| TimeRange::between(from, until))
            .unwrap_or_default())
    }
}

async fn facts_for(
    store: &dyn MarketStore,
    period: Period,
    now: DateTime<Utc>,
) -> AppResult<Vec<OrderFact>> {
    let range = period.range(now)?;
    Ok(store.order_facts(range).await?)
}

/// Counts, revenue, health and per-month category finance over all orders
pub async fn admin_stats(store: &dyn MarketStore) -> AppResult<AdminStats> {
    let total_users = store.count_users().await?;
    let total_listings = store.count_listings().await?;
    let facts = store.order_facts(TimeRange::default()).await?;

    let stats = AdminStats {
        total_users,
        total_listings,
        total_revenue: total_revenue(&facts),
        health: health_score(facts.iter().map(|f| &f.order)),
        finance_data: monthly_category_finance(&facts),
    };
    tracing::debug!(
        orders = facts.len(),
        revenue = %stats.total_revenue,
        health = ?stats.health.status,
        "Admin stats computed"
    );
    Ok(stats)
}

pub async fn agent_revenue(
    store: &dyn MarketStore,
    period: Period,
    now: DateTime<Utc>,
) -> AppResult<Vec<Bucket>> {
    Ok(revenue_by_agent(&facts_for(store, period, now).await?))
}

pub async fn monthly_revenue(
    store: &dyn MarketStore,
    period: Period,
    now: DateTime<Utc>,
) -> AppResult<Vec<Bucket>> {
    Ok(revenue_by_month(&facts_for(store, period, now).await?))
}

pub async fn category_revenue(
    store: &dyn MarketStore,
    period: Period,
    now: DateTime<Utc>,
) -> AppResult<Vec<Bucket>> {
    Ok(revenue_by_category(&facts_for(store, period, now).await?))
}
