//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `today`, `parse_date`, `parse_money` - Argument parsing helpers
//! - `resolve_category` - Look up a category by ID or name
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use cofre_core::db::Database;
use cofre_core::models::Category;
use cofre_core::money::{format_amount, parse_amount};

/// Actor recorded in the audit log for CLI writes
pub const AUDIT_ACTOR: &str = "cli";

/// Open (and migrate) the database
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

/// Local calendar day
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse an optional `YYYY-MM-DD` argument, defaulting to today
pub fn parse_date(value: Option<&str>, flag: &str) -> Result<NaiveDate> {
    match value {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag)),
        None => Ok(today()),
    }
}

/// Parse an optional date filter
pub fn parse_optional_date(value: Option<&str>, flag: &str) -> Result<Option<NaiveDate>> {
    value.map(|s| parse_date(Some(s), flag)).transpose()
}

/// Parse a major-unit amount such as "12.50" into minor units
pub fn parse_money(value: &str) -> Result<i64> {
    parse_amount(value).with_context(|| format!("Invalid amount '{}'", value))
}

/// Resolve a category by ID or by name (case-insensitive)
pub fn resolve_category(db: &Database, key: &str) -> Result<Category> {
    if let Ok(id) = key.parse::<i64>() {
        if let Some(category) = db.get_category(id)? {
            return Ok(category);
        }
    }
    db.find_category_by_name(key)?
        .ok_or_else(|| anyhow::anyhow!("Category '{}' not found", key))
}

/// Signed amount colored for the terminal: red out, green in
pub fn colored_amount(amount: i64) -> String {
    if amount < 0 {
        format!("\x1b[31m{}\x1b[0m", format_amount(amount))
    } else {
        format!("\x1b[32m+{}\x1b[0m", format_amount(amount))
    }
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;

    let seeded = db
        .seed_default_categories()
        .context("Failed to seed default categories")?;
    if seeded > 0 {
        println!("   Seeded {} default categories", seeded);
        db.log_audit(AUDIT_ACTOR, "init", None, None, Some("seeded default categories"))?;
    } else {
        println!("   Categories already present, nothing seeded");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record a movement: cofre add 12.50 \"Lunch\" --category Food");
    println!("  2. Fund a vault: cofre vault deposit \"Emergency Fund\" 100");
    println!("  3. Start web UI: cofre serve");

    Ok(())
}
