//! Seller performance scoring
//!
//! - [`gps`] - the pure score over an order slice
//! - [`seller_performance`] - one seller over a trailing window
//! - [`rank_agents`] - every agent, scored concurrently and ranked

pub mod gps;

pub use gps::{GpsBreakdown, GpsReport, Metric, compute_gps};

use chrono::{DateTime, Duration, Utc};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{Order, Role, User};

use crate::db::{MarketStore, TimeRange};
use crate::utils::AppResult;
use crate::utils::time::window_start;

/// Scoring knobs taken from configuration
#[derive(Debug, Clone, Copy)]
pub struct ScoringPolicy {
    pub window_days: u32,
    pub late_after: Duration,
}

impl ScoringPolicy {
    pub fn from_config(config: &crate::core::Config) -> Self {
        Self {
            window_days: config.scoring_window_days,
            late_after: Duration::days(config.late_shipment_days),
        }
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            window_days: 30,
            late_after: Duration::days(gps::DEFAULT_LATE_DAYS),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerPerformance {
    pub seller_id: i64,
    pub window_days: u32,
    #[serde(flatten)]
    pub report: GpsReport,
}

/// One row of the admin agent ranking
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformance {
    pub agent: User,
    pub gps: GpsReport,
    /// Sum over the agent's non-cancelled orders in the window
    pub total_revenue: Decimal,
}

/// Revenue of non-cancelled orders
pub fn revenue_of(orders: &[Order]) -> Decimal {
    orders
        .iter()
        .filter(|o| o.is_revenue())
        .map(|o| o.total_price)
        .sum()
}

/// Score one seller over the trailing `window_days` (policy default when `None`)
pub async fn seller_performance(
    store: &dyn MarketStore,
    policy: ScoringPolicy,
    seller_id: i64,
    window_days: Option<u32>,
    now: DateTime<Utc>,
) -> AppResult<SellerPerformance> {
    let window_days = window_days.unwrap_or(policy.window_days);
    let range = TimeRange::since(window_start(now, window_days));
    let orders = store.orders_for_seller(seller_id, range).await?;
    let report = compute_gps(&orders, policy.late_after);

    tracing::debug!(
        seller_id,
        window_days,
        orders = orders.len(),
        score = %report.score,
        "Seller scored"
    );

    Ok(SellerPerformance {
        seller_id,
        window_days,
        report,
    })
}

/// Score every agent and rank them, best first
///
/// Without `window_days` each agent is scored over all of their orders.
/// Ties keep the lower user id first.
pub async fn rank_agents(
    store: &dyn MarketStore,
    policy: ScoringPolicy,
    window_days: Option<u32>,
    now: DateTime<Utc>,
) -> AppResult<Vec<AgentPerformance>> {
    let range = window_days
        .map(|days| TimeRange::since(window_start(now, days)))
        .unwrap_or_default();

    let agents = store.list_users_by_role(Role::Agent).await?;
    let slices = try_join_all(
        agents
            .iter()
            .map(|agent| store.orders_for_seller(agent.id, range)),
    )
    .await?;

    let mut ranking: Vec<AgentPerformance> = agents
        .into_iter()
        .zip(slices)
        .map(|(agent, orders)| AgentPerformance {
            gps: compute_gps(&orders, policy.late_after),
            total_revenue: revenue_of(&orders),
            agent,
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.gps
            .score
            .cmp(&a.gps.score)
            .then_with(|| a.agent.id.cmp(&b.agent.id))
    });

    tracing::debug!(agents = ranking.len(), "Agents ranked");
    Ok(ranking)
}
