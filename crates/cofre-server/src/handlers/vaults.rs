//! Vault ledger handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{read_json, today, AppError, AppState, API_ACTOR};
use cofre_core::models::Movement;
use cofre_core::vault::VaultOverview;

/// GET /api/vaults - Balances, monthly history and totals of every vault
pub async fn get_vaults(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VaultOverview>, AppError> {
    Ok(Json(state.db.vault_overview()?))
}

/// Request body for a deposit or withdrawal
#[derive(Debug, Deserialize)]
pub struct VaultTransferRequest {
    /// Minor units, sign ignored
    pub amount: i64,
    pub description: Option<String>,
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

/// POST /api/vaults/:id/deposit - Move money into a vault
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Movement>, AppError> {
    let req: VaultTransferRequest = read_json(request).await?;
    let description = req.description.as_deref().unwrap_or("Vault deposit");

    let movement =
        state
            .db
            .record_vault_deposit(id, req.amount, description, req.date.unwrap_or_else(today))?;
    state.invalidate_cache().await;

    state.db.log_audit(
        API_ACTOR,
        "vault_deposit",
        Some("movement"),
        Some(movement.id),
        Some(&format!("vault={} amount={}", id, movement.amount)),
    )?;

    Ok(Json(movement))
}

/// POST /api/vaults/:id/withdraw - Take money out of a vault
///
/// Refused with 409 when the balance at write time is too low.
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Movement>, AppError> {
    let req: VaultTransferRequest = read_json(request).await?;
    let description = req.description.as_deref().unwrap_or("Vault withdrawal");

    let movement = state.db.record_vault_withdrawal(
        id,
        req.amount,
        description,
        req.date.unwrap_or_else(today),
    )?;
    state.invalidate_cache().await;

    state.db.log_audit(
        API_ACTOR,
        "vault_withdraw",
        Some("movement"),
        Some(movement.id),
        Some(&format!("vault={} amount={}", id, movement.amount)),
    )?;

    Ok(Json(movement))
}
