//! Movement handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{read_json, today, AppError, AppState, SuccessResponse, API_ACTOR, MAX_PAGE_LIMIT};
use cofre_core::db::MovementFilter;
use cofre_core::models::{Movement, MovementRequest, Operation};

#[derive(Debug, Deserialize)]
pub struct MovementsQuery {
    /// Start date (inclusive)
    pub from: Option<NaiveDate>,
    /// End date (inclusive)
    pub to: Option<NaiveDate>,
    pub category_id: Option<i64>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// GET /api/movements - List movements, newest first
pub async fn list_movements(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MovementsQuery>,
) -> Result<Json<Vec<Movement>>, AppError> {
    let filter = MovementFilter {
        from: params.from,
        to: params.to,
        category_id: params.category_id,
        limit: Some(params.limit.clamp(1, MAX_PAGE_LIMIT)),
    };

    Ok(Json(state.db.list_movements(&filter)?))
}

/// GET /api/movements/:id - Get one movement
pub async fn get_movement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Movement>, AppError> {
    let movement = state
        .db
        .get_movement(id)?
        .ok_or_else(|| AppError::not_found("Movement not found"))?;
    Ok(Json(movement))
}

/// Request body for recording a movement
///
/// The amount's sign is ignored; the category and operation decide it.
#[derive(Debug, Deserialize)]
pub struct CreateMovementRequest {
    pub amount: i64,
    pub description: String,
    pub category_id: Option<i64>,
    /// Defaults to today
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub operation: Operation,
}

/// POST /api/movements - Normalize and record a movement
pub async fn create_movement(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Movement>, AppError> {
    let req: CreateMovementRequest = read_json(request).await?;

    let movement = state.db.record_movement(&MovementRequest {
        amount: req.amount,
        description: req.description,
        category_id: req.category_id,
        date: req.date.unwrap_or_else(today),
        operation: req.operation,
    })?;
    state.invalidate_cache().await;

    state.db.log_audit(
        API_ACTOR,
        "create",
        Some("movement"),
        Some(movement.id),
        Some(&format!(
            "amount={} operation={}",
            movement.amount, req.operation
        )),
    )?;

    Ok(Json(movement))
}

/// DELETE /api/movements/:id - Delete a movement
pub async fn delete_movement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_movement(id)?;
    state.invalidate_cache().await;

    state
        .db
        .log_audit(API_ACTOR, "delete", Some("movement"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
