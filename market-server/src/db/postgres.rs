//! PostgreSQL store
//!
//! Runtime-checked `sqlx` queries. Lifecycle writes run in one transaction
//! with `SELECT ... FOR UPDATE` on the row being changed, so concurrent
//! purchases and cancellations on the same listing serialize.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{Category, Listing, Order, OrderFact, Role, User};
use shared::order::{CancelActor, OrderStatus, ShippingStatus, UnknownStatus};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{MarketStore, RepoError, RepoResult, TimeRange};
use crate::orders::{OrderError, PlaceOrder, Transition, TransitionStep, machine};

const CATEGORY_COLUMNS: &str =
    "id, parent_id, slug, title, title_tr, title_en, image_url, created_at";

const LISTING_COLUMNS: &str =
    "id, seller_id, category_id, title, price, currency, kind, stock, shippable, created_at";

const USER_COLUMNS: &str = "id, full_name, email, role, avatar_url, created_at";

const ORDER_COLUMNS: &str = "o.id, o.listing_id, o.buyer_id, o.seller_id, o.quantity, \
     o.unit_price, o.total_price, o.status, o.shipping_status, o.address_id, o.created_at, \
     o.shipped_at, o.delivered_at, o.canceled_at, o.canceled_by, o.cancel_reason, o.returned_at";

/// Listing row (enums stored as text)
#[derive(sqlx::FromRow)]
struct ListingRow {
    id: i64,
    seller_id: i64,
    category_id: Option<i64>,
    title: String,
    price: Decimal,
    currency: String,
    kind: String,
    stock: Option<i32>,
    shippable: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ListingRow> for Listing {
    type Error = RepoError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        Ok(Listing {
            kind: row
                .kind
                .parse::<shared::models::ListingKind>()
                .map_err(|e| RepoError::Corrupt(format!("listing {}: {}", row.id, e)))?,
            id: row.id,
            seller_id: row.seller_id,
            category_id: row.category_id,
            title: row.title,
            price: row.price,
            currency: row.currency,
            stock: row.stock,
            shippable: row.shippable,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    full_name: String,
    email: String,
    role: String,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepoError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            role: row
                .role
                .parse::<Role>()
                .map_err(|e| RepoError::Corrupt(format!("user {}: {}", row.id, e)))?,
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    listing_id: i64,
    buyer_id: i64,
    seller_id: i64,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
    status: String,
    shipping_status: String,
    address_id: Option<i64>,
    created_at: DateTime<Utc>,
    shipped_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    canceled_at: Option<DateTime<Utc>>,
    canceled_by: Option<String>,
    cancel_reason: Option<String>,
    returned_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let corrupt = |e: UnknownStatus| {
            RepoError::Corrupt(format!("order {}: {}", row.id, e))
        };
        let status = row.status.parse::<OrderStatus>().map_err(corrupt)?;
        let shipping_status = row
            .shipping_status
            .parse::<ShippingStatus>()
            .map_err(corrupt)?;
        let canceled_by = row
            .canceled_by
            .as_deref()
            .map(str::parse::<CancelActor>)
            .transpose()
            .map_err(corrupt)?;

        Ok(Order {
            id: row.id,
            listing_id: row.listing_id,
            buyer_id: row.buyer_id,
            seller_id: row.seller_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            total_price: row.total_price,
            status,
            shipping_status,
            address_id: row.address_id,
            created_at: row.created_at,
            shipped_at: row.shipped_at,
            delivered_at: row.delivered_at,
            canceled_at: row.canceled_at,
            canceled_by,
            cancel_reason: row.cancel_reason,
            returned_at: row.returned_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderFactRow {
    #[sqlx(flatten)]
    order: OrderRow,
    category_id: Option<i64>,
    category_title: Option<String>,
    seller_name: Option<String>,
}

impl TryFrom<OrderFactRow> for OrderFact {
    type Error = RepoError;

    fn try_from(row: OrderFactRow) -> Result<Self, Self::Error> {
        Ok(OrderFact {
            order: row.order.try_into()?,
            category_id: row.category_id,
            category_title: row.category_title,
            seller_name: row.seller_name,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> RepoResult<Vec<T>>
where
    T: TryFrom<R, Error = RepoError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// PostgreSQL [`MarketStore`]
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date
    pub async fn connect(database_url: &str, max_connections: u32) -> RepoResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl MarketStore for PgStore {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY id");
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_category(&self, id: i64) -> RepoResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_category_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1");
        Ok(sqlx::query_as(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_listing(&self, id: i64) -> RepoResult<Option<Listing>> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1");
        let row: Option<ListingRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Listing::try_from).transpose()
    }

    async fn listings_in_categories(&self, category_ids: &[i64]) -> RepoResult<Vec<Listing>> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE category_id = ANY($1) \
             ORDER BY created_at DESC, id DESC"
        );
        let rows: Vec<ListingRow> = sqlx::query_as(&sql)
            .bind(category_ids)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn count_listings(&self) -> RepoResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_user(&self, id: i64) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn list_users_by_role(&self, role: Role) -> RepoResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY id");
        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .bind(role.as_str())
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn count_users(&self) -> RepoResult<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_order(&self, id: i64) -> RepoResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = $1");
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Order::try_from).transpose()
    }

    async fn orders_for_seller(&self, seller_id: i64, range: TimeRange) -> RepoResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders o \
             WHERE o.seller_id = $1 \
               AND ($2::timestamptz IS NULL OR o.created_at >= $2) \
               AND ($3::timestamptz IS NULL OR o.created_at < $3) \
             ORDER BY o.created_at, o.id"
        );
        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(seller_id)
            .bind(range.from)
            .bind(range.until)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn order_facts(&self, range: TimeRange) -> RepoResult<Vec<OrderFact>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS}, \
                    c.id AS category_id, \
                    COALESCE(c.title_tr, c.title, c.title_en) AS category_title, \
                    u.full_name AS seller_name \
             FROM orders o \
             LEFT JOIN listings l ON l.id = o.listing_id \
             LEFT JOIN categories c ON c.id = l.category_id \
             LEFT JOIN users u ON u.id = o.seller_id \
             WHERE ($1::timestamptz IS NULL OR o.created_at >= $1) \
               AND ($2::timestamptz IS NULL OR o.created_at < $2) \
             ORDER BY o.created_at, o.id"
        );
        let rows: Vec<OrderFactRow> = sqlx::query_as(&sql)
            .bind(range.from)
            .bind(range.until)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn place_order(&self, cmd: PlaceOrder, now: DateTime<Utc>) -> RepoResult<Order> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1 FOR UPDATE");
        let row: Option<ListingRow> = sqlx::query_as(&sql)
            .bind(cmd.listing_id)
            .fetch_optional(&mut *tx)
            .await?;
        let listing = Listing::try_from(row.ok_or(OrderError::ListingNotFound(cmd.listing_id))?)?;

        let draft = machine::place(&listing, &cmd, now)?;

        if draft.reserve > 0 {
            sqlx::query("UPDATE listings SET stock = stock - $1 WHERE id = $2")
                .bind(draft.reserve)
                .bind(draft.listing_id)
                .execute(&mut *tx)
                .await?;
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (
                listing_id, buyer_id, seller_id, quantity, unit_price, total_price,
                status, shipping_status, address_id, created_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, 'paid', 'preparing', $7, $8)
             RETURNING id",
        )
        .bind(draft.listing_id)
        .bind(draft.buyer_id)
        .bind(draft.seller_id)
        .bind(draft.quantity)
        .bind(draft.unit_price)
        .bind(draft.total_price)
        .bind(draft.address_id)
        .bind(draft.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(draft.into_order(id))
    }

    async fn transition_order(
        &self,
        order_id: i64,
        step: &TransitionStep<'_>,
    ) -> RepoResult<Transition> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = $1 FOR UPDATE");
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;
        let current = Order::try_from(row.ok_or(OrderError::OrderNotFound(order_id))?)?;

        let Transition { order, restock } = step(&current)?;

        let mut restocked = 0;
        if restock > 0 {
            let result = sqlx::query(
                "UPDATE listings SET stock = stock + $1 \
                 WHERE id = $2 AND kind = 'sale' AND stock IS NOT NULL",
            )
            .bind(restock)
            .bind(order.listing_id)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() > 0 {
                restocked = restock;
            }
        }

        sqlx::query(
            "UPDATE orders SET
                status = $1, shipping_status = $2, shipped_at = $3, delivered_at = $4,
                canceled_at = $5, canceled_by = $6, cancel_reason = $7, returned_at = $8
             WHERE id = $9",
        )
        .bind(order.status.as_str())
        .bind(order.shipping_status.as_str())
        .bind(order.shipped_at)
        .bind(order.delivered_at)
        .bind(order.canceled_at)
        .bind(order.canceled_by.map(|actor| actor.as_str()))
        .bind(&order.cancel_reason)
        .bind(order.returned_at)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Transition {
            order,
            restock: restocked,
        })
    }
}
