//! Order operations as seen by the HTTP layer
//!
//! Each operation runs one state-machine step through the store, which
//! applies it atomically together with any stock change.

use chrono::Utc;
use shared::models::{Order, OrderCreate};
use shared::order::ShippingStatus;

use super::machine::{self, PlaceOrder, Transition};
use crate::auth::CurrentUser;
use crate::db::MarketStore;
use crate::security_log;
use crate::utils::{AppError, AppResult};

/// Place an order for the caller
pub async fn create_order(
    store: &dyn MarketStore,
    buyer: CurrentUser,
    payload: OrderCreate,
) -> AppResult<Order> {
    let cmd = PlaceOrder {
        listing_id: payload.listing_id,
        buyer_id: buyer.id,
        quantity: payload.quantity,
        address_id: payload.address_id,
    };

    let order = store.place_order(cmd, Utc::now()).await?;
    tracing::info!(
        order_id = order.id,
        listing_id = order.listing_id,
        buyer_id = order.buyer_id,
        quantity = order.quantity,
        total = %order.total_price,
        "Order placed"
    );
    Ok(order)
}

/// Read one order; visible to its buyer, its seller and admins
pub async fn get_order(store: &dyn MarketStore, user: CurrentUser, id: i64) -> AppResult<Order> {
    let order = store
        .find_order(id)
        .await?
        .ok_or_else(|| AppError::from(super::OrderError::OrderNotFound(id)))?;

    if user.is_admin() || user.id == order.buyer_id || user.id == order.seller_id {
        Ok(order)
    } else {
        security_log!("WARN", "order_access_denied", user_id = user.id, order_id = id);
        Err(AppError::permission_denied(format!(
            "Order {} belongs to another account",
            id
        )))
    }
}

/// Seller moves the order to the next shipping status
pub async fn advance_shipping(
    store: &dyn MarketStore,
    user: CurrentUser,
    id: i64,
    target: ShippingStatus,
) -> AppResult<Order> {
    let now = Utc::now();
    let order = store
        .transition_order(id, &|order: &Order| {
            machine::advance_shipping(order, user.id, target, now)
        })
        .await?
        .order;
    tracing::info!(
        order_id = id,
        actor_id = user.id,
        shipping_status = %order.shipping_status,
        "Shipping status advanced"
    );
    Ok(order)
}

/// Buyer or seller cancels the order; stock is reconciled in the same write
pub async fn cancel_order(
    store: &dyn MarketStore,
    user: CurrentUser,
    id: i64,
    reason: Option<String>,
) -> AppResult<Order> {
    let now = Utc::now();
    let Transition { order, restock } = store
        .transition_order(id, &|order: &Order| {
            machine::cancel(order, user.id, reason.clone(), now)
        })
        .await?;
    tracing::info!(
        order_id = id,
        actor_id = user.id,
        canceled_by = ?order.canceled_by,
        restocked = restock,
        "Order cancelled"
    );
    Ok(order)
}

/// Buyer returns a delivered order
pub async fn return_order(store: &dyn MarketStore, user: CurrentUser, id: i64) -> AppResult<Order> {
    let now = Utc::now();
    let order = store
        .transition_order(id, &|order: &Order| machine::mark_returned(order, user.id, now))
        .await?
        .order;
    tracing::info!(order_id = id, actor_id = user.id, "Order returned");
    Ok(order)
}
