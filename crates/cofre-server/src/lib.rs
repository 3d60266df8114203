//! Cofre Web Server
//!
//! Axum-based REST API for the Cofre ledger.
//!
//! - Every route lives under `/api`
//! - Writes are audited with the `api` actor
//! - Analytics and dashboard snapshots are cached and dropped on every write
//! - Core errors map to 400/404/409; anything else is a sanitized 500

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use cofre_core::{Database, Settings};
use moka::future::Cache;

mod handlers;
mod scheduler;

pub use scheduler::{run_recurring_pass, start_recurring_scheduler};

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Maximum JSON body size (64 KB)
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Actor recorded in the audit log for API writes
pub const API_ACTOR: &str = "api";

/// Upper bound on cached snapshots (one per period and day, plus the dashboard)
const MAX_CACHED_SNAPSHOTS: u64 = 256;

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    /// Serialized analytics and dashboard snapshots
    pub cache: Cache<String, serde_json::Value>,
    /// Bumped by every invalidation; a snapshot computed under an older
    /// generation is never stored
    generation: AtomicU64,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let cache = Cache::builder()
            .time_to_live(settings.cache_ttl)
            .max_capacity(MAX_CACHED_SNAPSHOTS)
            .build();
        Self {
            db,
            settings,
            cache,
            generation: AtomicU64::new(0),
        }
    }

    /// Serve `key` from the cache, computing and storing it on a miss
    pub async fn cached<T, F>(&self, key: &str, compute: F) -> Result<serde_json::Value, AppError>
    where
        T: Serialize,
        F: FnOnce() -> Result<T, AppError>,
    {
        if let Some(value) = self.cache.get(key).await {
            return Ok(value);
        }

        let seen = self.cache_generation();
        let value = serde_json::to_value(compute()?)?;
        self.store_if_current(key, value.clone(), seen).await;
        Ok(value)
    }

    /// Current invalidation generation
    pub fn cache_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store `value` unless a write invalidated the cache after `seen` was read.
    /// Returns whether the value was stored.
    pub async fn store_if_current(&self, key: &str, value: serde_json::Value, seen: u64) -> bool {
        if self.cache_generation() != seen {
            debug!(key, "Discarding snapshot computed before the last write");
            return false;
        }
        self.cache.insert(key.to_string(), value).await;

        // An invalidation that landed during the insert may have missed it
        if self.cache_generation() != seen {
            self.cache.invalidate(key).await;
            return false;
        }
        true
    }

    /// Drop every cached snapshot; called after each write
    pub async fn invalidate_cache(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate_all();
    }
}

/// Date used for "this month" computations
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Simple success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Parse a JSON request body into `T`
pub async fn read_json<T: DeserializeOwned>(request: Request) -> Result<T, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::bad_request(&format!("Invalid JSON: {}", e)))
}

/// Create the application router
pub fn create_router(db: Database, settings: Settings) -> Router {
    create_router_with_state(Arc::new(AppState::new(db, settings)))
}

/// Create the router around an existing state (shared with the scheduler)
pub fn create_router_with_state(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Categories
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/categories/budgets", get(handlers::get_budgets))
        .route(
            "/categories/:id",
            axum::routing::patch(handlers::update_category).delete(handlers::delete_category),
        )
        // Movements
        .route(
            "/movements",
            get(handlers::list_movements).post(handlers::create_movement),
        )
        .route(
            "/movements/:id",
            get(handlers::get_movement).delete(handlers::delete_movement),
        )
        // Vaults
        .route("/vaults", get(handlers::get_vaults))
        .route("/vaults/:id/deposit", post(handlers::deposit))
        .route("/vaults/:id/withdraw", post(handlers::withdraw))
        // Recurring rules
        .route(
            "/recurring",
            get(handlers::list_rules).post(handlers::create_rule),
        )
        .route("/recurring/projections", get(handlers::get_projections))
        .route("/recurring/summary", get(handlers::get_commitments))
        .route("/recurring/process", post(handlers::process_rules))
        .route(
            "/recurring/:id",
            get(handlers::get_rule)
                .patch(handlers::update_rule)
                .delete(handlers::delete_rule),
        )
        .route("/recurring/:id/confirm", post(handlers::confirm_rule))
        // Savings goals
        .route(
            "/goals",
            get(handlers::list_goals).post(handlers::create_goal),
        )
        .route(
            "/goals/:id",
            get(handlers::get_goal)
                .patch(handlers::update_goal)
                .delete(handlers::delete_goal),
        )
        .route("/goals/:id/contribute", post(handlers::contribute))
        // Reports
        .route("/analytics", get(handlers::get_analytics))
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/insights", get(handlers::get_insights))
        .route("/fire", get(handlers::get_fire))
        // Settings
        .route(
            "/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        // Audit
        .route("/audit", get(handlers::list_audit_log));

    // Same-origin only: no origins are allowed explicitly
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server, plus the recurring scheduler when enabled
pub async fn serve_with_config(db: Database, settings: Settings) -> anyhow::Result<()> {
    let addr = settings.bind_addr();
    let interval = settings.recurring_interval;
    let state = Arc::new(AppState::new(db, settings));

    match interval {
        Some(every) => start_recurring_scheduler(state.clone(), every),
        None => warn!("Recurring scheduler disabled; automatic rules only run on request"),
    }

    let app = create_router_with_state(state);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    /// Extra structured fields merged into the response body
    details: Option<serde_json::Value>,
    internal: Option<anyhow::Error>,
}

impl AppError {
    fn with_status(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            details: None,
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal(msg: &str) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn conflict(msg: &str) -> Self {
        Self::with_status(StatusCode::CONFLICT, msg)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Map a ledger error to its status; `None` for store and I/O failures
    fn from_core(err: &cofre_core::Error) -> Option<Self> {
        use cofre_core::Error;

        let mapped = match err {
            Error::InvalidAmount(_) | Error::MissingCategory(_) | Error::InvalidData(_) => {
                Self::bad_request(&err.to_string())
            }
            Error::NotFound(_) => Self::not_found(&err.to_string()),
            Error::RuleNotDue(_) => Self::conflict(&err.to_string()),
            Error::InsufficientVaultBalance {
                available,
                requested,
            } => Self {
                details: Some(serde_json::json!({
                    "available": available,
                    "requested": requested,
                })),
                ..Self::conflict(&err.to_string())
            },
            _ => return None,
        };
        Some(mapped)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let mut body = serde_json::json!({
            "error": self.message
        });
        if let (Some(serde_json::Value::Object(extra)), Some(obj)) =
            (self.details, body.as_object_mut())
        {
            obj.extend(extra);
        }

        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        if let Some(mapped) = err.downcast_ref::<cofre_core::Error>().and_then(Self::from_core) {
            return mapped;
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            details: None,
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
