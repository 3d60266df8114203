//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, today, date and category parsing)
//! - `categories` - Category commands (list, add, delete, budgets)
//! - `movements` - Recording, listing and deleting movements
//! - `vault` - Vault status, deposits and withdrawals
//! - `recurring` - Recurring rule commands
//! - `goals` - Savings goals and contributions
//! - `reports` - Period report, dashboard, insights and FIRE projection
//! - `export` - CSV export
//! - `settings` - Opening balance and currency
//! - `serve` - Web server command

pub mod categories;
pub mod core;
pub mod export;
pub mod goals;
pub mod movements;
pub mod recurring;
pub mod reports;
pub mod serve;
pub mod settings;
pub mod vault;

// Re-export command functions for main.rs
pub use categories::*;
pub use core::*;
pub use export::*;
pub use goals::*;
pub use movements::*;
pub use recurring::*;
pub use reports::*;
pub use serve::*;
pub use settings::*;
pub use vault::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
