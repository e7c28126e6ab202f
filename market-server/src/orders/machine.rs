//! Order state machine
//!
//! Pure transition functions over order and listing values. Persistence
//! applies their results atomically; nothing here performs I/O.
//!
//! ```text
//! create ──► paid/preparing ──advance──► paid/shipped ──advance──► delivered/delivered
//!                 │                          │                          │
//!               cancel                     cancel                    return
//!                 ▼                          ▼                          ▼
//!         cancelled/cancelled        cancelled/cancelled        returned/delivered
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{Listing, Order};
use shared::order::{CancelActor, OrderStatus, ShippingStatus};

use super::error::OrderError;

/// Request to buy a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrder {
    pub listing_id: i64,
    pub buyer_id: i64,
    pub quantity: i32,
    pub address_id: Option<i64>,
}

/// Validated order that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub listing_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub address_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    /// Units to take off the listing's stock, zero for untracked listings
    pub reserve: i32,
}

impl OrderDraft {
    pub fn into_order(self, id: i64) -> Order {
        Order {
            id,
            listing_id: self.listing_id,
            buyer_id: self.buyer_id,
            seller_id: self.seller_id,
            quantity: self.quantity,
            unit_price: self.unit_price,
            total_price: self.total_price,
            status: OrderStatus::Paid,
            shipping_status: ShippingStatus::Preparing,
            address_id: self.address_id,
            created_at: self.created_at,
            shipped_at: None,
            delivered_at: None,
            canceled_at: None,
            canceled_by: None,
            cancel_reason: None,
            returned_at: None,
        }
    }
}

/// Result of a lifecycle step on an existing order
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// The order as it must be persisted
    pub order: Order,
    /// Units to put back on the listing (applied only if it tracks stock)
    pub restock: i32,
}

impl Transition {
    fn without_restock(order: Order) -> Self {
        Self { order, restock: 0 }
    }
}

/// One lifecycle step, run by the store while it holds the order
pub type TransitionStep<'a> =
    dyn Fn(&Order) -> Result<Transition, OrderError> + Send + Sync + 'a;

/// Create guard: validate a purchase against the listing as it is now
///
/// The seller is copied from the listing, so later ownership changes do
/// not move existing orders.
pub fn place(
    listing: &Listing,
    cmd: &PlaceOrder,
    now: DateTime<Utc>,
) -> Result<OrderDraft, OrderError> {
    if cmd.quantity <= 0 {
        return Err(OrderError::InvalidQuantity(cmd.quantity));
    }
    if cmd.buyer_id == listing.seller_id {
        return Err(OrderError::SelfPurchase);
    }

    let reserve = match listing.available() {
        Some(available) if available < cmd.quantity => {
            return Err(OrderError::InsufficientStock {
                listing_id: listing.id,
                available,
                requested: cmd.quantity,
            });
        }
        Some(_) => cmd.quantity,
        None => 0,
    };

    Ok(OrderDraft {
        listing_id: listing.id,
        buyer_id: cmd.buyer_id,
        seller_id: listing.seller_id,
        quantity: cmd.quantity,
        unit_price: listing.price,
        total_price: listing.price * Decimal::from(cmd.quantity),
        address_id: cmd.address_id,
        created_at: now,
        reserve,
    })
}

fn ensure_open(order: &Order) -> Result<(), OrderError> {
    if order.is_terminal() {
        return Err(OrderError::Terminal {
            order_id: order.id,
            status: order.status,
        });
    }
    Ok(())
}

/// Seller moves shipping one step forward: preparing → shipped → delivered
pub fn advance_shipping(
    order: &Order,
    actor_id: i64,
    target: ShippingStatus,
    now: DateTime<Utc>,
) -> Result<Transition, OrderError> {
    if actor_id != order.seller_id {
        return Err(OrderError::Forbidden(format!(
            "Only the seller can update shipping for order {}",
            order.id
        )));
    }
    ensure_open(order)?;

    if order.shipping_status.next() != Some(target) {
        return Err(OrderError::InvalidTransition {
            from: order.shipping_status,
            to: target,
        });
    }

    let mut next = order.clone();
    next.shipping_status = target;
    match target {
        ShippingStatus::Shipped => next.shipped_at = Some(now),
        ShippingStatus::Delivered => {
            next.delivered_at = Some(now);
            next.status = OrderStatus::Delivered;
        }
        // next() never yields these
        ShippingStatus::Preparing | ShippingStatus::Cancelled => {}
    }

    Ok(Transition::without_restock(next))
}

/// Buyer or seller cancels a paid order; its quantity goes back on the shelf
pub fn cancel(
    order: &Order,
    actor_id: i64,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> Result<Transition, OrderError> {
    let actor = if actor_id == order.seller_id {
        CancelActor::Seller
    } else if actor_id == order.buyer_id {
        CancelActor::Buyer
    } else {
        return Err(OrderError::Forbidden(format!(
            "Only the buyer or seller can cancel order {}",
            order.id
        )));
    };
    ensure_open(order)?;

    if order.status != OrderStatus::Paid {
        return Err(OrderError::CancelNotAllowed {
            order_id: order.id,
            status: order.status,
        });
    }

    let mut next = order.clone();
    next.status = OrderStatus::Cancelled;
    next.shipping_status = ShippingStatus::Cancelled;
    next.canceled_at = Some(now);
    next.canceled_by = Some(actor);
    next.cancel_reason = reason.filter(|r| !r.trim().is_empty());

    Ok(Transition {
        order: next,
        restock: order.quantity,
    })
}

/// Buyer reports a delivered order as defective
pub fn mark_returned(
    order: &Order,
    actor_id: i64,
    now: DateTime<Utc>,
) -> Result<Transition, OrderError> {
    if actor_id != order.buyer_id {
        return Err(OrderError::Forbidden(format!(
            "Only the buyer can return order {}",
            order.id
        )));
    }
    ensure_open(order)?;

    if order.status != OrderStatus::Delivered {
        return Err(OrderError::ReturnNotAllowed {
            order_id: order.id,
            status: order.status,
        });
    }

    let mut next = order.clone();
    next.status = OrderStatus::Returned;
    next.returned_at = Some(now);

    Ok(Transition::without_restock(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use shared::models::ListingKind;
    use shared::order::is_legal_pair;

    const SELLER: i64 = 10;
    const BUYER: i64 = 20;
    const STRANGER: i64 = 30;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap()
    }

    fn listing(stock: Option<i32>) -> Listing {
        Listing {
            id: 1,
            seller_id: SELLER,
            category_id: Some(3),
            title: "Desk lamp".into(),
            price: Decimal::new(4990, 2),
            currency: "TRY".into(),
            kind: ListingKind::Sale,
            stock,
            shippable: true,
            created_at: now(),
        }
    }

    fn cmd(quantity: i32) -> PlaceOrder {
        PlaceOrder {
            listing_id: 1,
            buyer_id: BUYER,
            quantity,
            address_id: Some(5),
        }
    }

    fn paid_order() -> Order {
        place(&listing(Some(10)), &cmd(2), now())
            .unwrap()
            .into_order(100)
    }

    fn delivered_order() -> Order {
        let order = paid_order();
        let shipped = advance_shipping(&order, SELLER, ShippingStatus::Shipped, now())
            .unwrap()
            .order;
        advance_shipping(&shipped, SELLER, ShippingStatus::Delivered, now())
            .unwrap()
            .order
    }

    #[test]
    fn test_place_computes_total_and_copies_seller() {
        let draft = place(&listing(Some(5)), &cmd(3), now()).unwrap();
        assert_eq!(draft.total_price, Decimal::new(14970, 2));
        assert_eq!(draft.unit_price, Decimal::new(4990, 2));
        assert_eq!(draft.seller_id, SELLER);
        assert_eq!(draft.reserve, 3);

        let order = draft.into_order(7);
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.shipping_status, ShippingStatus::Preparing);
        assert!(is_legal_pair(order.status, order.shipping_status));
    }

    #[test]
    fn test_place_decimal_total_has_no_drift() {
        let mut item = listing(None);
        item.price = Decimal::new(10, 2); // 0.10
        let draft = place(&item, &cmd(3), now()).unwrap();
        assert_eq!(draft.total_price, Decimal::new(30, 2));
        assert_eq!(draft.total_price.to_string(), "0.30");
    }

    #[test]
    fn test_place_rejects_bad_quantity_and_stock() {
        assert_eq!(
            place(&listing(Some(5)), &cmd(0), now()),
            Err(OrderError::InvalidQuantity(0))
        );
        assert_eq!(
            place(&listing(Some(5)), &cmd(-2), now()),
            Err(OrderError::InvalidQuantity(-2))
        );
        assert_eq!(
            place(&listing(Some(2)), &cmd(3), now()),
            Err(OrderError::InsufficientStock {
                listing_id: 1,
                available: 2,
                requested: 3
            })
        );
        assert!(matches!(
            place(&listing(Some(0)), &cmd(1), now()),
            Err(OrderError::InsufficientStock { .. })
        ));
    }

    #[test]
    fn test_place_unlimited_listing() {
        let draft = place(&listing(None), &cmd(50), now()).unwrap();
        assert_eq!(draft.reserve, 0);

        let mut service = listing(Some(0));
        service.kind = ListingKind::Service;
        let draft = place(&service, &cmd(4), now()).unwrap();
        assert_eq!(draft.reserve, 0);
    }

    #[test]
    fn test_place_rejects_self_purchase() {
        let own = PlaceOrder {
            buyer_id: SELLER,
            ..cmd(1)
        };
        assert_eq!(
            place(&listing(Some(5)), &own, now()),
            Err(OrderError::SelfPurchase)
        );
    }

    #[test]
    fn test_advance_sets_timestamps() {
        let order = paid_order();
        let later = now() + Duration::days(1);

        let shipped = advance_shipping(&order, SELLER, ShippingStatus::Shipped, later).unwrap();
        assert_eq!(shipped.restock, 0);
        assert_eq!(shipped.order.status, OrderStatus::Paid);
        assert_eq!(shipped.order.shipping_status, ShippingStatus::Shipped);
        assert_eq!(shipped.order.shipped_at, Some(later));

        let delivered =
            advance_shipping(&shipped.order, SELLER, ShippingStatus::Delivered, later).unwrap();
        assert_eq!(delivered.order.status, OrderStatus::Delivered);
        assert_eq!(delivered.order.delivered_at, Some(later));
        assert!(is_legal_pair(
            delivered.order.status,
            delivered.order.shipping_status
        ));
    }

    #[test]
    fn test_advance_only_by_seller() {
        let order = paid_order();
        for actor in [BUYER, STRANGER] {
            assert!(matches!(
                advance_shipping(&order, actor, ShippingStatus::Shipped, now()),
                Err(OrderError::Forbidden(_))
            ));
        }
    }

    #[test]
    fn test_advance_cannot_skip_or_repeat() {
        let order = paid_order();
        assert_eq!(
            advance_shipping(&order, SELLER, ShippingStatus::Delivered, now()),
            Err(OrderError::InvalidTransition {
                from: ShippingStatus::Preparing,
                to: ShippingStatus::Delivered
            })
        );
        assert!(matches!(
            advance_shipping(&order, SELLER, ShippingStatus::Preparing, now()),
            Err(OrderError::InvalidTransition { .. })
        ));
        assert!(matches!(
            advance_shipping(&order, SELLER, ShippingStatus::Cancelled, now()),
            Err(OrderError::InvalidTransition { .. })
        ));
        assert!(matches!(
            advance_shipping(&delivered_order(), SELLER, ShippingStatus::Delivered, now()),
            Err(OrderError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_advance_on_cancelled_is_conflict() {
        let cancelled = cancel(&paid_order(), BUYER, None, now()).unwrap().order;
        assert_eq!(
            advance_shipping(&cancelled, SELLER, ShippingStatus::Shipped, now()),
            Err(OrderError::Terminal {
                order_id: 100,
                status: OrderStatus::Cancelled
            })
        );
    }

    #[test]
    fn test_cancel_records_actor_and_restock() {
        let order = paid_order();
        let by_seller = cancel(&order, SELLER, Some("out of stock".into()), now()).unwrap();
        assert_eq!(by_seller.restock, 2);
        assert_eq!(by_seller.order.status, OrderStatus::Cancelled);
        assert_eq!(by_seller.order.shipping_status, ShippingStatus::Cancelled);
        assert_eq!(by_seller.order.canceled_by, Some(CancelActor::Seller));
        assert_eq!(by_seller.order.canceled_at, Some(now()));
        assert_eq!(by_seller.order.cancel_reason.as_deref(), Some("out of stock"));
        assert!(by_seller.order.cancelled_by_seller());

        let by_buyer = cancel(&order, BUYER, Some("  ".into()), now()).unwrap();
        assert_eq!(by_buyer.order.canceled_by, Some(CancelActor::Buyer));
        assert!(by_buyer.order.cancel_reason.is_none());
        assert!(!by_buyer.order.cancelled_by_seller());
    }

    #[test]
    fn test_cancel_after_shipping() {
        let shipped = advance_shipping(&paid_order(), SELLER, ShippingStatus::Shipped, now())
            .unwrap()
            .order;
        let cancelled = cancel(&shipped, BUYER, None, now()).unwrap();
        assert_eq!(cancelled.order.shipping_status, ShippingStatus::Cancelled);
        assert_eq!(cancelled.restock, 2);
    }

    #[test]
    fn test_cancel_twice_is_conflict() {
        let cancelled = cancel(&paid_order(), BUYER, None, now()).unwrap().order;
        assert_eq!(
            cancel(&cancelled, SELLER, None, now()),
            Err(OrderError::Terminal {
                order_id: 100,
                status: OrderStatus::Cancelled
            })
        );
    }

    #[test]
    fn test_cancel_guards() {
        assert!(matches!(
            cancel(&paid_order(), STRANGER, None, now()),
            Err(OrderError::Forbidden(_))
        ));
        assert_eq!(
            cancel(&delivered_order(), BUYER, None, now()),
            Err(OrderError::CancelNotAllowed {
                order_id: 100,
                status: OrderStatus::Delivered
            })
        );
    }

    #[test]
    fn test_return_requires_delivery() {
        assert_eq!(
            mark_returned(&paid_order(), BUYER, now()),
            Err(OrderError::ReturnNotAllowed {
                order_id: 100,
                status: OrderStatus::Paid
            })
        );

        let returned = mark_returned(&delivered_order(), BUYER, now()).unwrap();
        assert_eq!(returned.restock, 0);
        assert_eq!(returned.order.status, OrderStatus::Returned);
        assert_eq!(returned.order.shipping_status, ShippingStatus::Delivered);
        assert_eq!(returned.order.returned_at, Some(now()));
        assert!(is_legal_pair(
            returned.order.status,
            returned.order.shipping_status
        ));

        assert!(matches!(
            mark_returned(&returned.order, BUYER, now()),
            Err(OrderError::Terminal { .. })
        ));
    }

    #[test]
    fn test_return_only_by_buyer() {
        assert!(matches!(
            mark_returned(&delivered_order(), SELLER, now()),
            Err(OrderError::Forbidden(_))
        ));
    }

    #[test]
    fn test_terminal_orders_never_reopen() {
        let cancelled = cancel(&paid_order(), BUYER, None, now()).unwrap().order;
        let returned = mark_returned(&delivered_order(), BUYER, now()).unwrap().order;

        for order in [cancelled, returned] {
            assert!(advance_shipping(&order, SELLER, ShippingStatus::Shipped, now()).is_err());
            assert!(advance_shipping(&order, SELLER, ShippingStatus::Delivered, now()).is_err());
            assert!(cancel(&order, BUYER, None, now()).is_err());
            assert!(cancel(&order, SELLER, None, now()).is_err());
            assert!(mark_returned(&order, BUYER, now()).is_err());
        }
    }
}
