//! Good Provider Score
//!
//! Pure function over one seller's order slice. No I/O, no clock: the
//! caller decides which orders are in the window.
//!
//! | Component | Weight | Fault counted |
//! |-----------|--------|---------------|
//! | ODR (order defect rate) | 0.40 | returned |
//! | LSR (late shipment rate) | 0.20 | shipped later than the threshold |
//! | CR (cancellation rate) | 0.25 | cancelled by the seller |
//! | RR (response rate) | 0.15 | fixed at [`RESPONSE_RATE_SCORE`] |

use chrono::Duration;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use shared::models::Order;
use shared::order::OrderStatus;

/// Response-rate sub-score. Response times are not recorded yet, so this
/// stays constant until they are.
pub const RESPONSE_RATE_SCORE: Decimal = Decimal::from_parts(98, 0, 0, false, 0);

/// Shipping slower than this many days counts as late
pub const DEFAULT_LATE_DAYS: i64 = 3;

const ODR_WEIGHT: Decimal = Decimal::from_parts(40, 0, 0, false, 2);
const LSR_WEIGHT: Decimal = Decimal::from_parts(20, 0, 0, false, 2);
const CR_WEIGHT: Decimal = Decimal::from_parts(25, 0, 0, false, 2);
const RR_WEIGHT: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Fault count and resulting sub-score of one component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub count: usize,
    pub score: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GpsBreakdown {
    pub odr: Metric,
    pub lsr: Metric,
    pub cr: Metric,
    pub rr: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsReport {
    /// Weighted composite, 2 decimal places
    pub score: Decimal,
    pub total_orders: usize,
    pub breakdown: GpsBreakdown,
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Shipped more than `late_after` after creation
///
/// Orders without a ship date are never late.
pub fn is_late(order: &Order, late_after: Duration) -> bool {
    order
        .shipped_at
        .is_some_and(|shipped_at| shipped_at - order.created_at > late_after)
}

/// `100 - count / total * 100`
fn sub_score(count: usize, total: Decimal) -> Decimal {
    Decimal::ONE_HUNDRED - Decimal::from(count as u64) * Decimal::ONE_HUNDRED / total
}

/// Score a seller's orders
///
/// An empty slice uses a denominator of 1, so it scores like one perfect
/// order. The input order does not matter.
pub fn compute_gps(orders: &[Order], late_after: Duration) -> GpsReport {
    let total = Decimal::from(orders.len().max(1) as u64);

    let defective = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Returned)
        .count();
    let late = orders.iter().filter(|o| is_late(o, late_after)).count();
    let cancelled = orders.iter().filter(|o| o.cancelled_by_seller()).count();

    let odr = sub_score(defective, total);
    let lsr = sub_score(late, total);
    let cr = sub_score(cancelled, total);

    let score = odr * ODR_WEIGHT
        + lsr * LSR_WEIGHT
        + cr * CR_WEIGHT
        + RESPONSE_RATE_SCORE * RR_WEIGHT;

    GpsReport {
        score: round2(score),
        total_orders: orders.len(),
        breakdown: GpsBreakdown {
            odr: Metric {
                count: defective,
                score: round2(odr),
            },
            lsr: Metric {
                count: late,
                score: round2(lsr),
            },
            cr: Metric {
                count: cancelled,
                score: round2(cr),
            },
            rr: RESPONSE_RATE_SCORE,
        },
    }
}
