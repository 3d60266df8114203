//! Category operations

use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::info;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Category, CategoryUpdate, Nature, NewCategory, VaultKind};

const CATEGORY_COLUMNS: &str =
    "id, name, nature, vault_kind, monthly_limit, color, icon, created_at";

const DEFAULT_COLOR: &str = "#64748b";
const DEFAULT_ICON: &str = "tag";

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    let nature: String = row.get(2)?;
    let vault_kind: String = row.get(3)?;
    let created_at: String = row.get(7)?;

    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        nature: nature.parse().unwrap_or(Nature::Expense),
        vault_kind: vault_kind.parse().unwrap_or_default(),
        monthly_limit: row.get(4)?,
        color: row.get(5)?,
        icon: row.get(6)?,
        created_at: parse_datetime(&created_at),
    })
}

/// Look up a category on `conn` (which may be a transaction)
pub(super) fn category_on(conn: &Connection, id: i64) -> Result<Option<Category>> {
    let category = conn
        .query_row(
            &format!("SELECT {} FROM categories WHERE id = ?", CATEGORY_COLUMNS),
            params![id],
            row_to_category,
        )
        .optional()?;
    Ok(category)
}

/// Turn a UNIQUE violation into a readable error
fn map_duplicate(err: rusqlite::Error, name: &str) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            Error::InvalidData(format!("category '{}' already exists", name))
        }
        other => other.into(),
    }
}

fn validate_limit(limit: i64) -> Result<()> {
    if limit < 0 {
        return Err(Error::InvalidAmount(format!(
            "monthly limit cannot be negative, got {}",
            limit
        )));
    }
    Ok(())
}

impl Database {
    /// Create a category
    pub fn create_category(&self, new: &NewCategory) -> Result<Category> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("category name cannot be empty".to_string()));
        }
        validate_limit(new.monthly_limit)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO categories (name, nature, vault_kind, monthly_limit, color, icon)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                name,
                new.nature.as_str(),
                new.vault_kind.as_str(),
                new.monthly_limit,
                new.color.as_deref().unwrap_or(DEFAULT_COLOR),
                new.icon.as_deref().unwrap_or(DEFAULT_ICON),
            ],
        )
        .map_err(|e| map_duplicate(e, name))?;

        let id = conn.last_insert_rowid();
        info!(id, name, vault_kind = %new.vault_kind, "Created category");
        self.require_category(id)
    }

    /// List all categories by name
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM categories ORDER BY name COLLATE NOCASE",
            CATEGORY_COLUMNS
        ))?;

        let categories = stmt
            .query_map([], row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Get a category by ID
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        category_on(&conn, id)
    }

    /// Get a category by ID, `NotFound` if missing
    pub fn require_category(&self, id: i64) -> Result<Category> {
        self.get_category(id)?
            .ok_or_else(|| Error::NotFound(format!("category {}", id)))
    }

    /// Get a category by name (case-insensitive)
    pub fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                &format!(
                    "SELECT {} FROM categories WHERE name = ? COLLATE NOCASE",
                    CATEGORY_COLUMNS
                ),
                params![name.trim()],
                row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    /// Update name, limit, color or icon
    pub fn update_category(&self, id: i64, update: &CategoryUpdate) -> Result<Category> {
        let current = self.require_category(id)?;

        let name = update
            .name
            .as_deref()
            .map(str::trim)
            .unwrap_or(&current.name)
            .to_string();
        if name.is_empty() {
            return Err(Error::InvalidData("category name cannot be empty".to_string()));
        }
        let monthly_limit = update.monthly_limit.unwrap_or(current.monthly_limit);
        validate_limit(monthly_limit)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE categories
            SET name = ?, monthly_limit = ?, color = ?, icon = ?
            WHERE id = ?
            "#,
            params![
                name,
                monthly_limit,
                update.color.as_deref().unwrap_or(&current.color),
                update.icon.as_deref().unwrap_or(&current.icon),
                id,
            ],
        )
        .map_err(|e| map_duplicate(e, &name))?;

        self.require_category(id)
    }

    /// Delete a category that has no movements
    ///
    /// Recurring rules pointing at it become uncategorized.
    pub fn delete_category(&self, id: i64) -> Result<()> {
        let category = self.require_category(id)?;
        let conn = self.conn()?;

        let movement_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM movements WHERE category_id = ?",
            params![id],
            |row| row.get(0),
        )?;
        if movement_count > 0 {
            return Err(Error::InvalidData(format!(
                "category '{}' still has {} movement(s)",
                category.name, movement_count
            )));
        }

        conn.execute("DELETE FROM categories WHERE id = ?", params![id])?;
        info!(id, name = %category.name, "Deleted category");
        Ok(())
    }

    /// Create the starter categories on an empty ledger; returns how many were added
    pub fn seed_default_categories(&self) -> Result<usize> {
        if !self.list_categories()?.is_empty() {
            return Ok(0);
        }

        let defaults = [
            ("Salary", Nature::Income, VaultKind::None, "#22c55e", "briefcase"),
            ("Other Income", Nature::Income, VaultKind::None, "#10b981", "plus"),
            ("Housing", Nature::Expense, VaultKind::None, "#f97316", "home"),
            ("Food", Nature::Expense, VaultKind::None, "#ef4444", "utensils"),
            ("Transport", Nature::Expense, VaultKind::None, "#3b82f6", "car"),
            ("Leisure", Nature::Expense, VaultKind::None, "#a855f7", "music"),
            ("Investments", Nature::Expense, VaultKind::Investment, "#0ea5e9", "trending-up"),
            ("Emergency Fund", Nature::Expense, VaultKind::Emergency, "#eab308", "shield"),
        ];

        for (name, nature, vault_kind, color, icon) in defaults {
            self.create_category(&NewCategory {
                name: name.to_string(),
                nature,
                vault_kind,
                monthly_limit: 0,
                color: Some(color.to_string()),
                icon: Some(icon.to_string()),
            })?;
        }

        Ok(defaults.len())
    }
}
