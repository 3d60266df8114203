//! Ledger settings handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::Deserialize;

use crate::{read_json, AppError, AppState, API_ACTOR};
use cofre_core::models::LedgerSettings;

/// GET /api/settings - Opening balance and currency
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LedgerSettings>, AppError> {
    Ok(Json(state.db.get_ledger_settings()?))
}

/// Request body for updating settings; absent fields keep their value
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub opening_balance: Option<i64>,
    pub currency: Option<String>,
}

/// PUT /api/settings - Update opening balance and/or currency
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<LedgerSettings>, AppError> {
    let req: UpdateSettingsRequest = read_json(request).await?;

    let mut settings = state.db.get_ledger_settings()?;
    if let Some(balance) = req.opening_balance {
        settings.opening_balance = balance;
    }
    if let Some(currency) = req.currency {
        settings.currency = currency;
    }

    let settings = state.db.update_ledger_settings(&settings)?;
    // Opening balance feeds the dashboard
    state.invalidate_cache().await;

    state.db.log_audit(
        API_ACTOR,
        "update",
        Some("settings"),
        None,
        Some(&serde_json::to_string(&settings)?),
    )?;

    Ok(Json(settings))
}
