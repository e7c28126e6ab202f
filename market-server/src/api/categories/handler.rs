//! Category API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use shared::models::Category;

use crate::api::extract::{ValidPath, ValidQuery};
use crate::catalog::{self, CategoryListings};
use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub top_only: bool,
}

/// GET /api/categories - all categories, roots only with `?topOnly=true`
pub async fn list(
    State(state): State<ServerState>,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> AppResult<Json<Vec<Category>>> {
    let categories = catalog::list_categories(state.store(), query.top_only).await?;
    Ok(Json(categories))
}

/// GET /api/categories/{id}/subtree - ids of the category and its descendants
pub async fn subtree(
    State(state): State<ServerState>,
    ValidPath(id): ValidPath<i64>,
) -> AppResult<Json<Vec<i64>>> {
    let ids = catalog::subtree_ids(state.store(), id).await?;
    Ok(Json(ids))
}

/// GET /api/category/{slug}/listings
pub async fn listings_by_slug(
    State(state): State<ServerState>,
    ValidPath(slug): ValidPath<String>,
) -> AppResult<Json<CategoryListings>> {
    let result = catalog::listings_by_slug(state.store(), &slug).await?;
    Ok(Json(result))
}
