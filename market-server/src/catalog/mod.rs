//! Catalog queries: category listing and subtree-scoped listings

pub mod tree;

pub use tree::{CategoryTree, resolve_subtree};

use serde::Serialize;
use shared::models::{Category, Listing};
use shared::{AppError, ErrorCode};

use crate::db::MarketStore;
use crate::utils::AppResult;

/// A category together with the listings filed anywhere beneath it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListings {
    pub category: Category,
    pub category_ids: Vec<i64>,
    pub listings: Vec<Listing>,
}

fn category_not_found(key: impl std::fmt::Display) -> AppError {
    AppError::with_message(
        ErrorCode::CategoryNotFound,
        format!("Category {} not found", key),
    )
}

/// All categories, or only roots when `top_only`
pub async fn list_categories(store: &dyn MarketStore, top_only: bool) -> AppResult<Vec<Category>> {
    let mut categories = store.list_categories().await?;
    if top_only {
        categories.retain(Category::is_root);
    }
    Ok(categories)
}

/// Ids of `root` and all its descendants
pub async fn subtree_ids(store: &dyn MarketStore, root: i64) -> AppResult<Vec<i64>> {
    let categories = store.list_categories().await?;
    resolve_subtree(&categories, root).ok_or_else(|| category_not_found(root))
}

/// Listings under the category with `slug`, including its descendants
pub async fn listings_by_slug(store: &dyn MarketStore, slug: &str) -> AppResult<CategoryListings> {
    let category = store
        .find_category_by_slug(slug)
        .await?
        .ok_or_else(|| category_not_found(slug))?;

    let category_ids = subtree_ids(store, category.id).await?;
    let listings = store.listings_in_categories(&category_ids).await?;
    tracing::debug!(
        slug,
        categories = category_ids.len(),
        listings = listings.len(),
        "Resolved category listings"
    );

    Ok(CategoryListings {
        category,
        category_ids,
        listings,
    })
}
