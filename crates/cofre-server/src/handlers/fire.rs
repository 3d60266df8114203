//! FIRE projection handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;

use crate::{today, AppError, AppState};
use cofre_core::fire::{FireOverrides, FireParameters, FireProjection};

#[derive(Serialize)]
pub struct FireResponse {
    /// Parameters after filling gaps from configured defaults and the ledger
    pub parameters: FireParameters,
    pub projection: FireProjection,
}

/// GET /api/fire - Simulate financial independence from this month's numbers
///
/// Every query parameter is optional; `current_net_worth` (minor units)
/// defaults to the vault total.
pub async fn get_fire(
    State(state): State<Arc<AppState>>,
    Query(overrides): Query<FireOverrides>,
) -> Result<Json<FireResponse>, AppError> {
    let (parameters, projection) =
        state
            .db
            .fire_projection(&overrides, &state.settings.fire, today())?;

    Ok(Json(FireResponse {
        parameters,
        projection,
    }))
}
