//! Admin API Handlers

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;

use crate::api::extract::ValidQuery;
use crate::api::sellers::WindowQuery;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::reporting::{self, AdminStats, Bucket, Period};
use crate::scoring::{self, AgentPerformance, ScoringPolicy};
use crate::utils::AppResult;

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl From<PeriodQuery> for Period {
    fn from(query: PeriodQuery) -> Self {
        Period {
            year: query.year,
            month: query.month,
        }
    }
}

/// GET /api/admin/stats
pub async fn stats(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AdminStats>> {
    user.require_admin()?;
    let stats = reporting::admin_stats(state.store()).await?;
    Ok(Json(stats))
}

/// GET /api/admin/agents-performance?windowDays=
pub async fn agents_performance(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidQuery(query): ValidQuery<WindowQuery>,
) -> AppResult<Json<Vec<AgentPerformance>>> {
    user.require_admin()?;
    let window_days = query.validated()?;
    let policy = ScoringPolicy::from_config(&state.config);
    let ranking = scoring::rank_agents(state.store(), policy, window_days, Utc::now()).await?;
    Ok(Json(ranking))
}

/// GET /api/admin/revenue/agents?year=&month=
pub async fn revenue_by_agent(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidQuery(query): ValidQuery<PeriodQuery>,
) -> AppResult<Json<Vec<Bucket>>> {
    user.require_admin()?;
    let buckets = reporting::agent_revenue(state.store(), query.into(), Utc::now()).await?;
    Ok(Json(buckets))
}

/// GET /api/admin/revenue/monthly?year=
pub async fn revenue_by_month(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidQuery(query): ValidQuery<PeriodQuery>,
) -> AppResult<Json<Vec<Bucket>>> {
    user.require_admin()?;
    let buckets = reporting::monthly_revenue(state.store(), query.into(), Utc::now()).await?;
    Ok(Json(buckets))
}

/// GET /api/admin/revenue/categories?year=&month=
pub async fn revenue_by_category(
    State(state): State<ServerState>,
    user: CurrentUser,
    ValidQuery(query): ValidQuery<PeriodQuery>,
) -> AppResult<Json<Vec<Bucket>>> {
    user.require_admin()?;
    let buckets = reporting::category_revenue(state.store(), query.into(), Utc::now()).await?;
    Ok(Json(buckets))
}
