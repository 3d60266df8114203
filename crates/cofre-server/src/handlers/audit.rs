//! Audit log handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState, MAX_PAGE_LIMIT};
use cofre_core::db::AuditEntry;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_audit_limit")]
    pub limit: i64,
}

fn default_audit_limit() -> i64 {
    100
}

/// GET /api/audit - Recent audit entries, newest first
pub async fn list_audit_log(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    Ok(Json(state.db.list_audit_log(limit)?))
}
