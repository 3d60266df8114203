//! HTTP handlers, one module per resource

mod analytics;
mod audit;
mod categories;
mod fire;
mod goals;
mod movements;
mod recurring;
mod settings;
mod vaults;

pub use analytics::*;
pub use audit::*;
pub use categories::*;
pub use fire::*;
pub use goals::*;
pub use movements::*;
pub use recurring::*;
pub use settings::*;
pub use vaults::*;

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /api/health - Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
