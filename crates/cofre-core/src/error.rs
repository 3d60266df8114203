//! Error types for Cofre

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// Zero, overflowing or unparsable amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Vault operation (or other category-bound operation) without a resolvable category
    #[error("Missing category: {0}")]
    MissingCategory(String),

    /// Withdrawal exceeds the vault balance. Amounts are minor units.
    #[error(
        "Insufficient vault balance: available {}, requested {}",
        crate::money::format_amount(*available),
        crate::money::format_amount(*requested)
    )]
    InsufficientVaultBalance { available: i64, requested: i64 },

    /// Recurring rule confirmed while not due (pending, already satisfied or inactive)
    #[error("Recurring rule not due: {0}")]
    RuleNotDue(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Conditions reported alongside a result rather than raised
///
/// Neither suppresses the result it accompanies: a savings rate of 0 carries
/// `NonRepresentativeIncome`, a capped simulation still returns its full curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Income below the representativeness threshold; savings rate reported as 0
    NonRepresentativeIncome { income: i64, threshold: i64 },
    /// FIRE target not reached within the simulation horizon
    SimulationCapReached { years: u32, shortfall: i64 },
}
