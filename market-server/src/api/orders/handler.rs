//! Order API Handlers

use axum::{Json, extract::State, http::StatusCode};
use shared::models::{Order, OrderCancel, OrderCreate, ShippingUpdate};

use crate::api::extract::{ValidJson, ValidPath};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::service;
use crate::utils::AppResult;

/// POST /api/orders - place an order as the caller
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidJson(payload): ValidJson<OrderCreate>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = service::create_order(state.store(), user, payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<Order>> {
    let order = service::get_order(state.store(), user, id).await?;
    Ok(Json(order))
}

/// PATCH /api/orders/{id}/shipping - seller advances the shipping status
pub async fn advance_shipping(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<ShippingUpdate>,
) -> AppResult<Json<Order>> {
    let order = service::advance_shipping(state.store(), user, id, payload.shipping_status).await?;
    Ok(Json(order))
}

/// PATCH /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
    payload: Option<ValidJson<OrderCancel>>,
) -> AppResult<Json<Order>> {
    let ValidJson(payload) = payload.unwrap_or_default();
    let order = service::cancel_order(state.store(), user, id, payload.reason).await?;
    Ok(Json(order))
}

/// PATCH /api/orders/{id}/return - buyer returns a delivered order
pub async fn mark_returned(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<Order>> {
    let order = service::return_order(state.store(), user, id).await?;
    Ok(Json(order))
}
