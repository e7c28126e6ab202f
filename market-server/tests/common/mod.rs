//! Router test harness: in-memory store, fixed JWT secret, oneshot requests

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use chrono::{TimeZone, Utc};
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use market_server::api::build_app;
use market_server::{Config, MemoryStore, ServerState};
use rust_decimal::Decimal;
use serde_json::Value;
use shared::models::{Category, Listing, ListingKind, Role, User};
use tower::ServiceExt;

pub const ADMIN: i64 = 1;
pub const SELLER: i64 = 2;
pub const BUYER: i64 = 3;
pub const STRANGER: i64 = 4;
pub const OTHER_SELLER: i64 = 5;

pub const BIKE: i64 = 10;
pub const REPAIR: i64 = 11;

pub struct TestApp {
    pub state: ServerState,
    pub store: Arc<MemoryStore>,
    app: Router,
}

fn user(id: i64, name: &str, role: Role) -> User {
    User {
        id,
        full_name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        role,
        avatar_url: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn category(id: i64, parent_id: Option<i64>, slug: &str, title: &str) -> Category {
    Category {
        id,
        parent_id,
        slug: slug.to_string(),
        title: Some(title.to_string()),
        title_tr: None,
        title_en: None,
        image_url: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn listing(id: i64, category_id: i64, kind: ListingKind, stock: Option<i32>) -> Listing {
    Listing {
        id,
        seller_id: SELLER,
        category_id: Some(category_id),
        title: format!("Listing {}", id),
        price: Decimal::new(2550, 2),
        currency: "TRY".to_string(),
        kind,
        stock,
        shippable: kind == ListingKind::Sale,
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
    }
}

impl TestApp {
    /// Users, a three-level category tree, one stocked and one service listing
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());

        store.insert_user(user(ADMIN, "Admin", Role::Admin));
        store.insert_user(user(SELLER, "Seller", Role::Agent));
        store.insert_user(user(BUYER, "Buyer", Role::User));
        store.insert_user(user(STRANGER, "Stranger", Role::User));
        store.insert_user(user(OTHER_SELLER, "Other", Role::Agent));

        store.insert_category(category(1, None, "vehicles", "Vehicles"));
        store.insert_category(category(2, Some(1), "bicycles", "Bicycles"));
        store.insert_category(category(3, Some(2), "city-bikes", "City bikes"));
        store.insert_category(category(4, None, "services", "Services"));

        store.insert_listing(listing(BIKE, 3, ListingKind::Sale, Some(5)));
        store.insert_listing(listing(REPAIR, 4, ListingKind::Service, None));

        let state = ServerState::new(Config::for_tests(), store.clone());
        let app = build_app(&state).with_state(state.clone());
        Self { state, store, app }
    }

    pub fn token(&self, user_id: i64, role: Role) -> String {
        self.state
            .get_jwt_service()
            .generate_token(user_id, role)
            .unwrap()
    }

    pub fn token_for(&self, user_id: i64) -> String {
        let role = match user_id {
            ADMIN => Role::Admin,
            SELLER | OTHER_SELLER => Role::Agent,
            _ => Role::User,
        };
        self.token(user_id, role)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get_as(&self, user_id: i64, uri: &str) -> (StatusCode, Value) {
        let token = self.token_for(user_id);
        self.send(Method::GET, uri, Some(&token), None).await
    }

    pub async fn post_as(&self, user_id: i64, uri: &str, body: Value) -> (StatusCode, Value) {
        let token = self.token_for(user_id);
        self.send(Method::POST, uri, Some(&token), Some(body)).await
    }

    pub async fn patch_as(&self, user_id: i64, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let token = self.token_for(user_id);
        self.send(Method::PATCH, uri, Some(&token), body).await
    }

    /// Place an order as BUYER and return its id
    pub async fn place(&self, listing_id: i64, quantity: i32) -> i64 {
        let (status, body) = self
            .post_as(
                BUYER,
                "/api/orders",
                serde_json::json!({ "listingId": listing_id, "quantity": quantity }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    pub async fn stock(&self, listing_id: i64) -> Option<i32> {
        use market_server::MarketStore;
        self.store.find_listing(listing_id).await.unwrap().unwrap().stock
    }
}
