//! Savings goal handlers
//!
//! Goals are not part of any cached snapshot, so writes here leave the cache alone.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use serde::Deserialize;

use crate::{read_json, today, AppError, AppState, SuccessResponse, API_ACTOR};
use cofre_core::goals::{goal_progress, GoalOverview};
use cofre_core::models::{NewSavingsGoal, SavingsGoalUpdate};

/// GET /api/goals - Every goal with its progress, nearest target date first
pub async fn list_goals(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GoalOverview>>, AppError> {
    Ok(Json(state.db.goal_overviews(today())?))
}

/// GET /api/goals/:id - One goal with its progress
pub async fn get_goal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<GoalOverview>, AppError> {
    let goal = state.db.get_goal(id)?;
    let progress = goal_progress(&goal, today());
    Ok(Json(GoalOverview { goal, progress }))
}

/// POST /api/goals - Create a goal
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<GoalOverview>, AppError> {
    let req: NewSavingsGoal = read_json(request).await?;

    let goal = state.db.create_goal(&req)?;
    state.db.log_audit(
        API_ACTOR,
        "create",
        Some("savings_goal"),
        Some(goal.id),
        Some(&format!(
            "name={} target={} date={}",
            goal.name, goal.target_amount, goal.target_date
        )),
    )?;

    let progress = goal_progress(&goal, today());
    Ok(Json(GoalOverview { goal, progress }))
}

/// PATCH /api/goals/:id - Update name, target, saved amount or date
pub async fn update_goal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<GoalOverview>, AppError> {
    let req: SavingsGoalUpdate = read_json(request).await?;

    let goal = state.db.update_goal(id, &req)?;
    state.db.log_audit(
        API_ACTOR,
        "update",
        Some("savings_goal"),
        Some(id),
        Some(&serde_json::to_string(&req)?),
    )?;

    let progress = goal_progress(&goal, today());
    Ok(Json(GoalOverview { goal, progress }))
}

/// Request body for a contribution
#[derive(Debug, Deserialize)]
pub struct ContributionRequest {
    /// Minor units; negative takes money back out
    pub amount: i64,
}

/// POST /api/goals/:id/contribute - Add to a goal's saved amount
pub async fn contribute(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<GoalOverview>, AppError> {
    let req: ContributionRequest = read_json(request).await?;

    let goal = state.db.contribute_to_goal(id, req.amount)?;
    state.db.log_audit(
        API_ACTOR,
        "contribute",
        Some("savings_goal"),
        Some(id),
        Some(&format!("amount={} saved={}", req.amount, goal.current_amount)),
    )?;

    let progress = goal_progress(&goal, today());
    Ok(Json(GoalOverview { goal, progress }))
}

/// DELETE /api/goals/:id - Delete a goal
pub async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_goal(id)?;
    state
        .db
        .log_audit(API_ACTOR, "delete", Some("savings_goal"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
