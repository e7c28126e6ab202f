//! HTTP surface tests driven through the full axum app

mod common;

use common::*;
use http::{Method, StatusCode};
use market_server::auth::{Claims, JwtService};
use serde_json::json;
use shared::ErrorCode;
use shared::models::Role;

#[tokio::test]
async fn test_health_reports_store_kind() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["store"], "memory");
}

// ========== Categories ==========

#[tokio::test]
async fn test_category_listing_and_top_only() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);

    let (_, body) = app
        .send(Method::GET, "/api/categories?topOnly=true", None, None)
        .await;
    let slugs: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, ["vehicles", "services"]);
}

#[tokio::test]
async fn test_subtree_includes_root_and_descendants() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::GET, "/api/categories/1/subtree", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([1, 2, 3]));

    let (status, body) = app
        .send(Method::GET, "/api/categories/99/subtree", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], ErrorCode::CategoryNotFound.code());
}

#[tokio::test]
async fn test_listings_by_slug_cover_the_subtree() {
    let app = TestApp::new();

    let (status, body) = app
        .send(Method::GET, "/api/category/vehicles/listings", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["id"], 1);
    assert_eq!(body["categoryIds"], json!([1, 2, 3]));
    assert_eq!(body["listings"].as_array().unwrap().len(), 1);
    assert_eq!(body["listings"][0]["id"], BIKE);

    let (status, _) = app
        .send(Method::GET, "/api/category/boats/listings", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ========== Authentication ==========

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/orders",
            None,
            Some(json!({ "listingId": BIKE, "quantity": 1 })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], ErrorCode::NotAuthenticated.code());
    assert_eq!(app.stock(BIKE).await, Some(5));
}

#[tokio::test]
async fn test_expired_and_garbage_tokens() {
    let app = TestApp::new();
    let jwt: std::sync::Arc<JwtService> = app.state.get_jwt_service();
    let now = chrono::Utc::now().timestamp();
    let expired = jwt
        .encode_claims(&Claims {
            sub: BUYER.to_string(),
            role: Role::User.as_str().to_string(),
            exp: now - 3600,
            iat: now - 7200,
            iss: jwt.config.issuer.clone(),
        })
        .unwrap();

    let (status, body) = app
        .send(Method::GET, "/api/orders/1", Some(&expired), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], ErrorCode::TokenExpired.code());

    let (status, body) = app
        .send(Method::GET, "/api/orders/1", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], ErrorCode::TokenInvalid.code());
}

// ========== Orders ==========

#[tokio::test]
async fn test_create_order_reserves_stock() {
    let app = TestApp::new();
    let (status, body) = app
        .post_as(
            BUYER,
            "/api/orders",
            json!({ "listingId": BIKE, "quantity": 2, "addressId": 77 }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "paid");
    assert_eq!(body["shippingStatus"], "preparing");
    assert_eq!(body["sellerId"], SELLER);
    assert_eq!(body["buyerId"], BUYER);
    assert_eq!(body["addressId"], 77);
    assert_eq!(body["totalPrice"], json!(51.0));
    assert_eq!(app.stock(BIKE).await, Some(3));
}

#[tokio::test]
async fn test_create_order_rejections() {
    let app = TestApp::new();

    let (status, body) = app
        .post_as(BUYER, "/api/orders", json!({ "listingId": BIKE, "quantity": 6 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], ErrorCode::InsufficientStock.code());

    let (status, body) = app
        .post_as(BUYER, "/api/orders", json!({ "listingId": BIKE, "quantity": 0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::InvalidQuantity.code());

    let (status, _) = app
        .post_as(BUYER, "/api/orders", json!({ "listingId": 404, "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post_as(SELLER, "/api/orders", json!({ "listingId": BIKE, "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(app.stock(BIKE).await, Some(5));
}

#[tokio::test]
async fn test_malformed_input_uses_error_envelope() {
    let app = TestApp::new();

    let (status, body) = app
        .post_as(BUYER, "/api/orders", json!({ "listingId": BIKE, "quantity": "three" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::ValidationFailed.code());
    assert!(body["message"].is_string());

    let (status, body) = app.get_as(BUYER, "/api/orders/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::ValidationFailed.code());

    let (status, body) = app
        .get_as(SELLER, &format!("/api/sellers/{}/performance?windowDays=soon", SELLER))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::ValidationFailed.code());

    let (status, body) = app
        .send(Method::GET, "/api/categories?topOnly=maybe", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::ValidationFailed.code());

    let id = app.place(BIKE, 1).await;
    let (status, body) = app
        .patch_as(
            SELLER,
            &format!("/api/orders/{}/shipping", id),
            Some(json!({ "shippingStatus": "teleported" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::ValidationFailed.code());
    assert_eq!(app.stock(BIKE).await, Some(4));
}

#[tokio::test]
async fn test_order_fields_are_camel_case() {
    let app = TestApp::new();
    let id = app.place(BIKE, 1).await;
    let (_, body) = app.get_as(BUYER, &format!("/api/orders/{}", id)).await;

    assert_eq!(body["listingId"], BIKE);
    assert_eq!(body["unitPrice"], json!(25.5));
    assert!(body["createdAt"].is_string());
    assert!(body.get("listing_id").is_none());
}

#[tokio::test]
async fn test_unlimited_listing_has_no_stock_limit() {
    let app = TestApp::new();
    app.place(REPAIR, 250).await;
    assert_eq!(app.stock(REPAIR).await, None);
}

#[tokio::test]
async fn test_order_visible_to_parties_and_admin_only() {
    let app = TestApp::new();
    let id = app.place(BIKE, 1).await;
    let uri = format!("/api/orders/{}", id);

    for user in [BUYER, SELLER, ADMIN] {
        let (status, body) = app.get_as(user, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id);
    }

    let (status, body) = app.get_as(STRANGER, &uri).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], ErrorCode::PermissionDenied.code());

    let (status, body) = app.get_as(BUYER, "/api/orders/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], ErrorCode::OrderNotFound.code());
}

#[tokio::test]
async fn test_full_shipping_then_return() {
    let app = TestApp::new();
    let id = app.place(BIKE, 1).await;
    let shipping = format!("/api/orders/{}/shipping", id);

    // Only the seller ships
    let (status, _) = app
        .patch_as(BUYER, &shipping, Some(json!({ "shippingStatus": "shipped" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // No skipping straight to delivered
    let (status, body) = app
        .patch_as(SELLER, &shipping, Some(json!({ "shippingStatus": "delivered" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], ErrorCode::InvalidTransition.code());

    let (status, body) = app
        .patch_as(SELLER, &shipping, Some(json!({ "shippingStatus": "shipped" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "paid");
    assert_eq!(body["shippingStatus"], "shipped");
    assert!(body["shippedAt"].is_string());

    // Not delivered yet
    let ret = format!("/api/orders/{}/return", id);
    let (status, body) = app.patch_as(BUYER, &ret, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], ErrorCode::ReturnNotAllowed.code());

    let (status, body) = app
        .patch_as(SELLER, &shipping, Some(json!({ "shippingStatus": "delivered" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "delivered");
    assert!(body["deliveredAt"].is_string());

    // Only the buyer returns
    let (status, _) = app.patch_as(SELLER, &ret, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.patch_as(BUYER, &ret, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "returned");
    assert_eq!(body["shippingStatus"], "delivered");
    assert!(body["returnedAt"].is_string());

    // Returned is terminal
    let (status, body) = app
        .patch_as(SELLER, &shipping, Some(json!({ "shippingStatus": "delivered" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], ErrorCode::OrderTerminal.code());

    // Returns do not restock
    assert_eq!(app.stock(BIKE).await, Some(4));
}

#[tokio::test]
async fn test_cancel_restocks_once_and_is_terminal() {
    let app = TestApp::new();
    let id = app.place(BIKE, 3).await;
    assert_eq!(app.stock(BIKE).await, Some(2));
    let cancel = format!("/api/orders/{}/cancel", id);

    let (status, _) = app.patch_as(STRANGER, &cancel, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .patch_as(BUYER, &cancel, Some(json!({ "reason": "changed my mind" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["shippingStatus"], "cancelled");
    assert_eq!(body["canceledBy"], "buyer");
    assert_eq!(body["cancelReason"], "changed my mind");
    assert_eq!(app.stock(BIKE).await, Some(5));

    let (status, body) = app.patch_as(SELLER, &cancel, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], ErrorCode::OrderTerminal.code());
    assert_eq!(app.stock(BIKE).await, Some(5));

    // Shipping a cancelled order leaves it untouched
    let (status, _) = app
        .patch_as(
            SELLER,
            &format!("/api/orders/{}/shipping", id),
            Some(json!({ "shippingStatus": "shipped" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, body) = app.get_as(BUYER, &format!("/api/orders/{}", id)).await;
    assert_eq!(body["shippingStatus"], "cancelled");
    assert!(body["shippedAt"].is_null());
}

#[tokio::test]
async fn test_seller_can_cancel_after_shipping() {
    let app = TestApp::new();
    let id = app.place(BIKE, 1).await;
    app.patch_as(
        SELLER,
        &format!("/api/orders/{}/shipping", id),
        Some(json!({ "shippingStatus": "shipped" })),
    )
    .await;

    let (status, body) = app
        .patch_as(SELLER, &format!("/api/orders/{}/cancel", id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["canceledBy"], "seller");
    assert_eq!(app.stock(BIKE).await, Some(5));
}

// ========== Scoring ==========

#[tokio::test]
async fn test_seller_performance_access() {
    let app = TestApp::new();
    let uri = format!("/api/sellers/{}/performance", SELLER);

    let (status, _) = app.get_as(OTHER_SELLER, &uri).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get_as(SELLER, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sellerId"], SELLER);
    assert_eq!(body["windowDays"], 30);
    assert_eq!(body["totalOrders"], 0);
    assert_eq!(body["score"], json!(99.7));

    let (status, _) = app.get_as(ADMIN, &format!("{}?windowDays=7", uri)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get_as(ADMIN, &format!("{}?windowDays=0", uri)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::ValidationFailed.code());
}

#[tokio::test]
async fn test_seller_cancel_lowers_score() {
    let app = TestApp::new();
    let first = app.place(BIKE, 1).await;
    app.place(BIKE, 1).await;
    app.patch_as(SELLER, &format!("/api/orders/{}/cancel", first), None)
        .await;

    let (_, body) = app
        .get_as(SELLER, &format!("/api/sellers/{}/performance", SELLER))
        .await;
    assert_eq!(body["totalOrders"], 2);
    assert_eq!(body["breakdown"]["cr"]["count"], 1);
    assert_eq!(body["breakdown"]["cr"]["score"], json!(50.0));
    // 100 * 0.4 + 100 * 0.2 + 50 * 0.25 + 98 * 0.15
    assert_eq!(body["score"], json!(87.2));
}

// ========== Admin ==========

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let app = TestApp::new();
    for uri in [
        "/api/admin/stats",
        "/api/admin/agents-performance",
        "/api/admin/revenue/agents",
        "/api/admin/revenue/monthly",
        "/api/admin/revenue/categories",
    ] {
        let (status, body) = app.get_as(SELLER, uri).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["code"], ErrorCode::AdminRequired.code());

        let (status, _) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_admin_stats_and_revenue() {
    let app = TestApp::new();
    app.place(BIKE, 2).await;
    let dropped = app.place(BIKE, 1).await;
    app.place(REPAIR, 1).await;
    app.patch_as(BUYER, &format!("/api/orders/{}/cancel", dropped), None)
        .await;

    let (status, stats) = app.get_as(ADMIN, "/api/admin/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalUsers"], 5);
    assert_eq!(stats["totalListings"], 2);
    // 2 * 25.50 + 25.50, the cancelled order is excluded
    assert_eq!(stats["totalRevenue"], json!(76.5));
    assert_eq!(stats["health"]["faults"], 0);
    assert_eq!(stats["health"]["status"], "Healthy");
    assert_eq!(stats["financeData"].as_array().unwrap().len(), 1);

    let (_, by_category) = app.get_as(ADMIN, "/api/admin/revenue/categories").await;
    assert_eq!(by_category[0]["bucket"], "City bikes");
    assert_eq!(by_category[0]["value"], json!(51.0));
    assert_eq!(by_category[1]["bucket"], "Services");

    let (_, by_agent) = app.get_as(ADMIN, "/api/admin/revenue/agents").await;
    assert_eq!(by_agent.as_array().unwrap().len(), 1);
    assert_eq!(by_agent[0]["bucket"], "Seller");
    assert_eq!(by_agent[0]["id"], SELLER);

    let (_, monthly) = app.get_as(ADMIN, "/api/admin/revenue/monthly").await;
    assert_eq!(monthly.as_array().unwrap().len(), 1);
    assert_eq!(monthly[0]["value"], json!(76.5));

    let (status, _) = app
        .get_as(ADMIN, "/api/admin/revenue/monthly?year=2025&month=13")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, ranking) = app.get_as(ADMIN, "/api/admin/agents-performance").await;
    let ranking = ranking.as_array().unwrap();
    assert_eq!(ranking.len(), 2);
    // Buyer cancellations cost nothing, so both agents tie and the lower id leads
    assert_eq!(ranking[0]["agent"]["id"], SELLER);
    assert_eq!(ranking[0]["gps"]["score"], ranking[1]["gps"]["score"]);
    assert_eq!(ranking[0]["totalRevenue"], json!(76.5));
    assert_eq!(ranking[1]["agent"]["id"], OTHER_SELLER);
    assert_eq!(ranking[1]["totalRevenue"], json!(0.0));
}
