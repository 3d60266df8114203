//! Category handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};

use crate::{read_json, today, AppError, AppState, SuccessResponse, API_ACTOR};
use cofre_core::aggregate::BudgetUsage;
use cofre_core::models::{Category, CategoryUpdate, NewCategory};

/// GET /api/categories - List all categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.db.list_categories()?))
}

/// POST /api/categories - Create a category
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Category>, AppError> {
    let req: NewCategory = read_json(request).await?;

    let category = state.db.create_category(&req)?;
    state.invalidate_cache().await;

    state.db.log_audit(
        API_ACTOR,
        "create",
        Some("category"),
        Some(category.id),
        Some(&format!("name={}", category.name)),
    )?;

    Ok(Json(category))
}

/// PATCH /api/categories/:id - Rename, re-limit or restyle a category
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Category>, AppError> {
    let req: CategoryUpdate = read_json(request).await?;

    let category = state.db.update_category(id, &req)?;
    state.invalidate_cache().await;

    state.db.log_audit(
        API_ACTOR,
        "update",
        Some("category"),
        Some(id),
        Some(&serde_json::to_string(&req)?),
    )?;

    Ok(Json(category))
}

/// DELETE /api/categories/:id - Delete a category without movements
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    let category = state.db.require_category(id)?;
    state.db.delete_category(id)?;
    state.invalidate_cache().await;

    state.db.log_audit(
        API_ACTOR,
        "delete",
        Some("category"),
        Some(id),
        Some(&format!("name={}", category.name)),
    )?;

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/categories/budgets - Budget usage for the current month
pub async fn get_budgets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BudgetUsage>>, AppError> {
    Ok(Json(state.db.budget_usage(today())?))
}
