//! In-memory store
//!
//! Every table sits behind a single [`parking_lot::Mutex`]; each trait
//! method takes the lock once, so a write method sees and changes the
//! order and the listing stock without interleaving.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use shared::models::{Category, Listing, Order, OrderFact, Role, User};

use super::{MarketStore, RepoError, RepoResult, TimeRange};
use crate::orders::{OrderError, PlaceOrder, Transition, TransitionStep, machine};

#[derive(Debug, Default)]
struct Tables {
    categories: BTreeMap<i64, Category>,
    listings: BTreeMap<i64, Listing>,
    users: BTreeMap<i64, User>,
    orders: BTreeMap<i64, Order>,
}

impl Tables {
    fn next_order_id(&self) -> i64 {
        self.orders.keys().next_back().map_or(1, |id| id + 1)
    }

    /// Apply a stock delta to a tracked listing; untracked listings are left alone
    /// Returns the delta actually applied, 0 for untracked listings
    fn adjust_stock(&mut self, listing_id: i64, delta: i32) -> RepoResult<i32> {
        let Some(listing) = self.listings.get_mut(&listing_id) else {
            return Ok(0);
        };
        if !listing.tracks_stock() {
            return Ok(0);
        }
        let stock = listing.stock.unwrap_or(0);
        let next = stock.checked_add(delta).ok_or_else(|| {
            RepoError::Corrupt(format!("stock overflow on listing {}", listing_id))
        })?;
        listing.stock = Some(next);
        Ok(delta)
    }
}

/// In-memory [`MarketStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Seed helpers ==========

    pub fn insert_category(&self, category: Category) {
        self.tables.lock().categories.insert(category.id, category);
    }

    pub fn insert_listing(&self, listing: Listing) {
        self.tables.lock().listings.insert(listing.id, listing);
    }

    pub fn insert_user(&self, user: User) {
        self.tables.lock().users.insert(user.id, user);
    }

    /// Insert an order as-is, bypassing the lifecycle and stock checks
    pub fn insert_order(&self, order: Order) {
        self.tables.lock().orders.insert(order.id, order);
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn list_categories(&self) -> RepoResult<Vec<Category>> {
        Ok(self.tables.lock().categories.values().cloned().collect())
    }

    async fn find_category(&self, id: i64) -> RepoResult<Option<Category>> {
        Ok(self.tables.lock().categories.get(&id).cloned())
    }

    async fn find_category_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        Ok(self
            .tables
            .lock()
            .categories
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn find_listing(&self, id: i64) -> RepoResult<Option<Listing>> {
        Ok(self.tables.lock().listings.get(&id).cloned())
    }

    async fn listings_in_categories(&self, category_ids: &[i64]) -> RepoResult<Vec<Listing>> {
        let wanted: HashSet<i64> = category_ids.iter().copied().collect();
        let mut listings: Vec<Listing> = self
            .tables
            .lock()
            .listings
            .values()
            .filter(|l| l.category_id.is_some_and(|id| wanted.contains(&id)))
            .cloned()
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(listings)
    }

    async fn count_listings(&self) -> RepoResult<i64> {
        Ok(self.tables.lock().listings.len() as i64)
    }

    async fn find_user(&self, id: i64) -> RepoResult<Option<User>> {
        Ok(self.tables.lock().users.get(&id).cloned())
    }

    async fn list_users_by_role(&self, role: Role) -> RepoResult<Vec<User>> {
        Ok(self
            .tables
            .lock()
            .users
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }

    async fn count_users(&self) -> RepoResult<i64> {
        Ok(self.tables.lock().users.len() as i64)
    }

    async fn find_order(&self, id: i64) -> RepoResult<Option<Order>> {
        Ok(self.tables.lock().orders.get(&id).cloned())
    }

    async fn orders_for_seller(&self, seller_id: i64, range: TimeRange) -> RepoResult<Vec<Order>> {
        Ok(self
            .tables
            .lock()
            .orders
            .values()
            .filter(|o| o.seller_id == seller_id && range.contains(o.created_at))
            .cloned()
            .collect())
    }

    async fn order_facts(&self, range: TimeRange) -> RepoResult<Vec<OrderFact>> {
        let tables = self.tables.lock();
        let mut facts: Vec<OrderFact> = tables
            .orders
            .values()
            .filter(|o| range.contains(o.created_at))
            .map(|order| {
                let category = tables
                    .listings
                    .get(&order.listing_id)
                    .and_then(|l| l.category_id)
                    .and_then(|id| tables.categories.get(&id));
                OrderFact {
                    category_id: category.map(|c| c.id),
                    category_title: category.and_then(|c| c.display_title()).map(str::to_string),
                    seller_name: tables
                        .users
                        .get(&order.seller_id)
                        .map(|u| u.full_name.clone()),
                    order: order.clone(),
                }
            })
            .collect();
        facts.sort_by(|a, b| {
            a.order
                .created_at
                .cmp(&b.order.created_at)
                .then(a.order.id.cmp(&b.order.id))
        });
        Ok(facts)
    }

    async fn place_order(&self, cmd: PlaceOrder, now: DateTime<Utc>) -> RepoResult<Order> {
        let mut tables = self.tables.lock();

        let listing = tables
            .listings
            .get(&cmd.listing_id)
            .ok_or(OrderError::ListingNotFound(cmd.listing_id))?;
        let draft = machine::place(listing, &cmd, now)?;

        tables.adjust_stock(draft.listing_id, -draft.reserve)?;
        let order = draft.into_order(tables.next_order_id());
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn transition_order(
        &self,
        order_id: i64,
        step: &TransitionStep<'_>,
    ) -> RepoResult<Transition> {
        let mut tables = self.tables.lock();

        let current = tables
            .orders
            .get(&order_id)
            .ok_or(OrderError::OrderNotFound(order_id))?;
        let mut transition = step(current)?;

        if transition.restock > 0 {
            transition.restock =
                tables.adjust_stock(transition.order.listing_id, transition.restock)?;
        }
        tables.orders.insert(order_id, transition.order.clone());
        Ok(transition)
    }
}
