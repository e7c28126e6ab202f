//! Seller API Handlers

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;

use crate::api::extract::{ValidPath, ValidQuery};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::scoring::{self, ScoringPolicy, SellerPerformance};
use crate::security_log;
use crate::utils::{AppError, AppResult};

/// Longest trailing window accepted on performance queries
pub const MAX_WINDOW_DAYS: u32 = 3650;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowQuery {
    pub window_days: Option<u32>,
}

impl WindowQuery {
    /// Reject empty and absurdly long windows
    pub fn validated(&self) -> AppResult<Option<u32>> {
        match self.window_days {
            Some(days) if days == 0 || days > MAX_WINDOW_DAYS => Err(AppError::validation(
                format!("windowDays must be between 1 and {}", MAX_WINDOW_DAYS),
            )),
            days => Ok(days),
        }
    }
}

/// GET /api/sellers/{id}/performance - GPS over a trailing window
///
/// Visible to the seller themself and to admins.
pub async fn performance(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidPath(seller_id): ValidPath<i64>,
    ValidQuery(query): ValidQuery<WindowQuery>,
) -> AppResult<Json<SellerPerformance>> {
    if user.id != seller_id && !user.is_admin() {
        security_log!(
            "WARN",
            "performance_access_denied",
            user_id = user.id,
            seller_id = seller_id
        );
        return Err(AppError::permission_denied(
            "Only the seller or an admin can view this score",
        ));
    }

    let window_days = query.validated()?;
    let policy = ScoringPolicy::from_config(&state.config);
    let performance =
        scoring::seller_performance(state.store(), policy, seller_id, window_days, Utc::now())
            .await?;
    Ok(Json(performance))
}
