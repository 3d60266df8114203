//! Recurring rule handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};

use crate::{read_json, today, AppError, AppState, SuccessResponse, API_ACTOR};
use cofre_core::models::{Movement, NewRecurringRule, RecurringRule, RecurringRuleUpdate};
use cofre_core::recurring::{CommitmentSummary, Projection};

/// GET /api/recurring - List every rule, paused ones included
pub async fn list_rules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RecurringRule>>, AppError> {
    Ok(Json(state.db.list_recurring_rules()?))
}

/// GET /api/recurring/:id - Get one rule
pub async fn get_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<RecurringRule>, AppError> {
    Ok(Json(state.db.get_recurring_rule(id)?))
}

/// POST /api/recurring - Create a rule (amount normalized by its category)
pub async fn create_rule(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<RecurringRule>, AppError> {
    let req: NewRecurringRule = read_json(request).await?;

    let rule = state.db.create_recurring_rule(&req)?;
    state.invalidate_cache().await;

    state.db.log_audit(
        API_ACTOR,
        "create",
        Some("recurring_rule"),
        Some(rule.id),
        Some(&format!(
            "description={} amount={} day={}",
            rule.description, rule.amount, rule.day_of_month
        )),
    )?;

    Ok(Json(rule))
}

/// PATCH /api/recurring/:id - Update a rule
pub async fn update_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<RecurringRule>, AppError> {
    let req: RecurringRuleUpdate = read_json(request).await?;

    let rule = state.db.update_recurring_rule(id, &req)?;
    state.invalidate_cache().await;

    state.db.log_audit(
        API_ACTOR,
        "update",
        Some("recurring_rule"),
        Some(id),
        Some(&serde_json::to_string(&req)?),
    )?;

    Ok(Json(rule))
}

/// DELETE /api/recurring/:id - Delete a rule (its past movements stay)
pub async fn delete_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_recurring_rule(id)?;
    state.invalidate_cache().await;

    state
        .db
        .log_audit(API_ACTOR, "delete", Some("recurring_rule"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/recurring/projections - Active rules with this month's state
pub async fn get_projections(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Projection>>, AppError> {
    Ok(Json(state.db.recurring_projections(today())?))
}

/// GET /api/recurring/summary - Monthly commitments of active rules
pub async fn get_commitments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommitmentSummary>, AppError> {
    Ok(Json(state.db.recurring_summary()?))
}

/// POST /api/recurring/:id/confirm - Record this month's movement for a due rule
///
/// 409 when the rule is still pending, already satisfied or paused.
pub async fn confirm_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Movement>, AppError> {
    let movement = state.db.confirm_recurring_rule(id, today())?;
    state.invalidate_cache().await;

    state.db.log_audit(
        API_ACTOR,
        "confirm",
        Some("recurring_rule"),
        Some(id),
        Some(&format!("movement_id={}", movement.id)),
    )?;

    Ok(Json(movement))
}

/// POST /api/recurring/process - Record every due automatic rule now
pub async fn process_rules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Movement>>, AppError> {
    let created = state.db.process_automatic_rules(today())?;

    if !created.is_empty() {
        state.invalidate_cache().await;
        state.db.log_audit(
            API_ACTOR,
            "process",
            Some("recurring_rule"),
            None,
            Some(&format!("created={}", created.len())),
        )?;
    }

    Ok(Json(created))
}
