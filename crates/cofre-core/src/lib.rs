//! Cofre Core Library
//!
//! Shared functionality for the Cofre personal finance ledger:
//! - Sign normalization of every recorded amount
//! - Vault (reserve) balances with re-validated withdrawals
//! - Recurring rule projection, confirmation and automatic processing
//! - Period aggregation, dashboard and month-over-month insights
//! - FIRE (financial independence) simulation
//! - Savings goals with progress toward a target date
//! - SQLite store with connection pooling, settings and audit log

pub mod aggregate;
pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod fire;
pub mod goals;
pub mod insights;
pub mod models;
pub mod money;
pub mod normalize;
pub mod recurring;
pub mod vault;

/// Fixtures shared by the unit test modules
#[cfg(test)]
pub(crate) mod test_utils;

pub use aggregate::{DashboardSummary, DateWindow, Period, PeriodSnapshot};
pub use config::Settings;
pub use db::{AuditEntry, Database, MovementFilter};
pub use error::{Error, Notice, Result};
pub use export::ExportOptions;
pub use fire::{FireOverrides, FireParameters, FireProjection};
pub use goals::{GoalOverview, GoalProgress};
pub use insights::Finding;
pub use recurring::{Projection, RuleState};
pub use vault::VaultOverview;
