//! Revenue bucketing
//!
//! Every function here ignores cancelled orders for revenue. Returned
//! orders still count as revenue; they only show up as faults in
//! [`health_score`].

use std::collections::{BTreeMap, HashMap};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use shared::models::{Order, OrderFact};
use shared::order::OrderStatus;

use crate::utils::time::month_key;

/// Label for orders whose category is unknown
pub const OTHER_CATEGORY: &str = "Other";

/// Fault rate (percent) at or above which the marketplace is at risk
const AT_RISK_RATE: Decimal = Decimal::ONE;

/// One `{bucket, value}` pair of a revenue series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub bucket: String,
    /// Seller or category id behind the label, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub value: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Healthy,
    AtRisk,
}

/// Marketplace-wide fault summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScore {
    pub total_orders: usize,
    /// Cancelled by the seller plus returned
    pub faults: usize,
    /// Percent of orders with a fault, 2 decimal places
    pub fault_rate: Decimal,
    pub score: Decimal,
    pub status: HealthStatus,
}

/// Revenue of one calendar month split by category title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyFinance {
    pub month: String,
    pub by_category: BTreeMap<String, Decimal>,
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn revenue_facts(facts: &[OrderFact]) -> impl Iterator<Item = &OrderFact> {
    facts.iter().filter(|f| f.order.is_revenue())
}

fn category_label(fact: &OrderFact) -> String {
    fact.category_title
        .clone()
        .unwrap_or_else(|| OTHER_CATEGORY.to_string())
}

/// Highest revenue first; equal values by label, then id
fn rank(mut buckets: Vec<Bucket>) -> Vec<Bucket> {
    buckets.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then_with(|| a.bucket.cmp(&b.bucket))
            .then_with(|| a.id.cmp(&b.id))
    });
    buckets
}

/// Sum revenue per key, remembering the first label seen for each key
fn group<K, F>(facts: &[OrderFact], key_of: F) -> Vec<Bucket>
where
    K: Eq + std::hash::Hash + Copy + Into<Option<i64>>,
    F: Fn(&OrderFact) -> (K, String),
{
    let mut sums: HashMap<K, (String, Decimal)> = HashMap::new();
    for fact in revenue_facts(facts) {
        let (key, label) = key_of(fact);
        sums.entry(key).or_insert((label, Decimal::ZERO)).1 += fact.order.total_price;
    }

    sums.into_iter()
        .map(|(key, (bucket, value))| Bucket {
            bucket,
            id: key.into(),
            value,
        })
        .collect()
}

pub fn total_revenue(facts: &[OrderFact]) -> Decimal {
    revenue_facts(facts).map(|f| f.order.total_price).sum()
}

/// Revenue per `YYYY-MM`, oldest month first
pub fn revenue_by_month(facts: &[OrderFact]) -> Vec<Bucket> {
    let mut months: BTreeMap<String, Decimal> = BTreeMap::new();
    for fact in revenue_facts(facts) {
        *months.entry(month_key(fact.order.created_at)).or_default() += fact.order.total_price;
    }

    months
        .into_iter()
        .map(|(bucket, value)| Bucket {
            bucket,
            id: None,
            value,
        })
        .collect()
}

/// Revenue per seller, ranked
pub fn revenue_by_agent(facts: &[OrderFact]) -> Vec<Bucket> {
    rank(group(facts, |f| {
        let label = f
            .seller_name
            .clone()
            .unwrap_or_else(|| format!("Seller #{}", f.order.seller_id));
        (f.order.seller_id, label)
    }))
}

/// Revenue per category, ranked; unknown categories share one bucket
pub fn revenue_by_category(facts: &[OrderFact]) -> Vec<Bucket> {
    rank(group(facts, |f| (f.category_id, category_label(f))))
}

/// Monthly revenue split by category title, oldest month first
pub fn monthly_category_finance(facts: &[OrderFact]) -> Vec<MonthlyFinance> {
    let mut months: BTreeMap<String, BTreeMap<String, Decimal>> = BTreeMap::new();
    for fact in revenue_facts(facts) {
        *months
            .entry(month_key(fact.order.created_at))
            .or_default()
            .entry(category_label(fact))
            .or_default() += fact.order.total_price;
    }

    months
        .into_iter()
        .map(|(month, by_category)| MonthlyFinance { month, by_category })
        .collect()
}

/// Whether the order counts as a marketplace fault
pub fn is_fault(order: &Order) -> bool {
    order.status == OrderStatus::Returned || order.cancelled_by_seller()
}

/// `100 - faults / max(1, n) * 100`
pub fn health_score<'a>(orders: impl IntoIterator<Item = &'a Order>) -> HealthScore {
    let (total_orders, faults) = orders.into_iter().fold((0usize, 0usize), |(n, faults), order| {
        (n + 1, faults + usize::from(is_fault(order)))
    });

    let denominator = Decimal::from(total_orders.max(1) as u64);
    let rate = Decimal::from(faults as u64) * Decimal::ONE_HUNDRED / denominator;
    let status = if rate < AT_RISK_RATE {
        HealthStatus::Healthy
    } else {
        HealthStatus::AtRisk
    };

    HealthScore {
        total_orders,
        faults,
        fault_rate: round2(rate),
        score: round2(Decimal::ONE_HUNDRED - rate),
        status,
    }
}
