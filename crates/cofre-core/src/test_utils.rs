//! Test fixtures for cofre-core
//!
//! Builders for categories, movements and rules used across the unit tests.

use chrono::{NaiveDate, TimeZone, Utc};

use crate::models::{Category, Movement, Nature, RecurringRule, VaultKind};

/// Parse a `YYYY-MM-DD` literal
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A category with default limit, color and icon
pub fn category(id: i64, name: &str, nature: Nature, vault_kind: VaultKind) -> Category {
    Category {
        id,
        name: name.to_string(),
        nature,
        vault_kind,
        monthly_limit: 0,
        color: "#888888".to_string(),
        icon: "tag".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

/// A stored movement; `created_at` follows the id so ordering ties are stable
pub fn movement(
    id: i64,
    amount: i64,
    description: &str,
    category_id: Option<i64>,
    day: &str,
) -> Movement {
    Movement {
        id,
        amount,
        description: description.to_string(),
        category_id,
        date: date(day),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::seconds(id),
    }
}

/// An active, uncategorized recurring rule
pub fn rule(
    id: i64,
    description: &str,
    amount: i64,
    day_of_month: u32,
    process_automatically: bool,
) -> RecurringRule {
    RecurringRule {
        id,
        description: description.to_string(),
        amount,
        day_of_month,
        category_id: None,
        active: true,
        process_automatically,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}
