//! Reporting handlers: period analytics, dashboard and insights

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{today, AppError, AppState};
use cofre_core::insights::Finding;
use cofre_core::Period;

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    /// 7D, 30D, 90D, 12M or ALL (default 30D)
    pub period: Option<String>,
}

/// GET /api/analytics - Period snapshot, served from the cache when fresh
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let period: Period = match params.period.as_deref() {
        Some(raw) => raw.parse().map_err(|e: String| AppError::bad_request(&e))?,
        None => Period::default(),
    };

    let today = today();
    let key = format!("analytics:{}:{}", period, today);
    let snapshot = state
        .cached(&key, || Ok(state.db.period_snapshot(period.window(today))?))
        .await?;

    Ok(Json(snapshot))
}

/// GET /api/dashboard - Current month summary, served from the cache when fresh
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let today = today();
    let key = format!("dashboard:{}", today);
    let summary = state
        .cached(&key, || Ok(state.db.dashboard_summary(today)?))
        .await?;

    Ok(Json(summary))
}

/// GET /api/insights - This month compared with the last one
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Finding>>, AppError> {
    Ok(Json(state.db.insights(today())?))
}
