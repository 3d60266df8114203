//! Movement operations
//!
//! Every insert goes through [`Database::record_movement`] (or the vault and
//! recurring paths), which normalize the sign before anything is written.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::{debug, info};

use super::categories::category_on;
use super::{get_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Movement, MovementRequest, NewMovement, Operation};
use crate::normalize::normalize_for;
use crate::vault::vault_balance;

const MOVEMENT_COLUMNS: &str = "id, amount, description, category_id, date, created_at";

fn row_to_movement(row: &Row<'_>) -> rusqlite::Result<Movement> {
    let created_at: String = row.get(5)?;
    Ok(Movement {
        id: row.get(0)?,
        amount: row.get(1)?,
        description: row.get(2)?,
        category_id: row.get(3)?,
        date: get_date(row, 4)?,
        created_at: parse_datetime(&created_at),
    })
}

/// Insert an already-normalized movement on `conn` (which may be a transaction)
pub(super) fn insert_movement(conn: &Connection, new: &NewMovement) -> Result<Movement> {
    if new.amount == 0 {
        return Err(Error::InvalidAmount("amount cannot be zero".to_string()));
    }

    conn.execute(
        "INSERT INTO movements (amount, description, category_id, date) VALUES (?, ?, ?, ?)",
        params![
            new.amount,
            new.description,
            new.category_id,
            new.date.format("%Y-%m-%d").to_string(),
        ],
    )?;
    let id = conn.last_insert_rowid();

    let movement = conn.query_row(
        &format!("SELECT {} FROM movements WHERE id = ?", MOVEMENT_COLUMNS),
        params![id],
        row_to_movement,
    )?;
    debug!(id, amount = movement.amount, date = %movement.date, "Inserted movement");
    Ok(movement)
}

/// All movements of one category on `conn`
pub(super) fn category_movements(conn: &Connection, category_id: i64) -> Result<Vec<Movement>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM movements WHERE category_id = ? ORDER BY date, created_at, id",
        MOVEMENT_COLUMNS
    ))?;
    let movements = stmt
        .query_map(params![category_id], row_to_movement)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(movements)
}

/// Whole history on `conn`, oldest first
pub(super) fn all_movements(conn: &Connection) -> Result<Vec<Movement>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM movements ORDER BY date, created_at, id",
        MOVEMENT_COLUMNS
    ))?;
    let movements = stmt
        .query_map([], row_to_movement)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(movements)
}

/// Filter for listing movements
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    /// Start date (inclusive)
    pub from: Option<NaiveDate>,
    /// End date (inclusive)
    pub to: Option<NaiveDate>,
    pub category_id: Option<i64>,
    pub limit: Option<i64>,
}

pub(super) fn validate_description(description: &str) -> Result<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidData("description cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

impl Database {
    /// Normalize and record a user-entered movement
    ///
    /// Deposits and withdrawals are routed to the vault ledger. A regular
    /// movement cannot target a vault category, since its sign would bypass
    /// the balance check.
    pub fn record_movement(&self, request: &MovementRequest) -> Result<Movement> {
        match request.operation {
            Operation::Deposit | Operation::Withdrawal => {
                let category_id = request.category_id.ok_or_else(|| {
                    Error::MissingCategory(format!(
                        "{} requires a vault category",
                        request.operation
                    ))
                })?;
                if request.operation == Operation::Deposit {
                    self.record_vault_deposit(
                        category_id,
                        request.amount,
                        &request.description,
                        request.date,
                    )
                } else {
                    self.record_vault_withdrawal(
                        category_id,
                        request.amount,
                        &request.description,
                        request.date,
                    )
                }
            }
            Operation::Regular => {
                let description = validate_description(&request.description)?;
                let category = match request.category_id {
                    Some(id) => Some(self.require_category(id)?),
                    None => None,
                };
                if let Some(c) = category.as_ref().filter(|c| c.is_vault()) {
                    return Err(Error::InvalidData(format!(
                        "'{}' is a vault; record a deposit or withdrawal instead",
                        c.name
                    )));
                }

                let amount = normalize_for(request.amount, category.as_ref(), Operation::Regular)?;
                let conn = self.conn()?;
                let movement = insert_movement(
                    &conn,
                    &NewMovement {
                        amount,
                        description,
                        category_id: request.category_id,
                        date: request.date,
                    },
                )?;
                info!(id = movement.id, amount, "Recorded movement");
                Ok(movement)
            }
        }
    }

    /// List movements, newest first
    pub fn list_movements(&self, filter: &MovementFilter) -> Result<Vec<Movement>> {
        let conn = self.conn()?;

        let mut sql = format!("SELECT {} FROM movements WHERE 1=1", MOVEMENT_COLUMNS);
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(from) = filter.from {
            sql.push_str(" AND date >= ?");
            values.push(Box::new(from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = filter.to {
            sql.push_str(" AND date <= ?");
            values.push(Box::new(to.format("%Y-%m-%d").to_string()));
        }
        if let Some(category_id) = filter.category_id {
            sql.push_str(" AND category_id = ?");
            values.push(Box::new(category_id));
        }
        sql.push_str(" ORDER BY date DESC, created_at DESC, id DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            values.push(Box::new(limit));
        }

        let refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let movements = stmt
            .query_map(refs.as_slice(), row_to_movement)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(movements)
    }

    /// Whole history, oldest first
    pub fn all_movements(&self) -> Result<Vec<Movement>> {
        let conn = self.conn()?;
        all_movements(&conn)
    }

    /// Get a movement by ID
    pub fn get_movement(&self, id: i64) -> Result<Option<Movement>> {
        let conn = self.conn()?;
        let movement = conn
            .query_row(
                &format!("SELECT {} FROM movements WHERE id = ?", MOVEMENT_COLUMNS),
                params![id],
                row_to_movement,
            )
            .optional()?;
        Ok(movement)
    }

    /// Delete a movement
    ///
    /// Removing a vault deposit is refused when the vault balance would go
    /// negative.
    pub fn delete_movement(&self, id: i64) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let movement = tx
            .query_row(
                &format!("SELECT {} FROM movements WHERE id = ?", MOVEMENT_COLUMNS),
                params![id],
                row_to_movement,
            )
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("movement {}", id)))?;

        if let (Some(category_id), true) = (movement.category_id, movement.amount > 0) {
            let category = category_on(&tx, category_id)?;
            if category.map_or(false, |c| c.is_vault()) {
                let balance = vault_balance(&category_movements(&tx, category_id)?);
                if balance - movement.amount < 0 {
                    return Err(Error::InsufficientVaultBalance {
                        available: balance,
                        requested: movement.amount,
                    });
                }
            }
        }

        tx.execute("DELETE FROM movements WHERE id = ?", params![id])?;
        tx.commit()?;
        info!(id, "Deleted movement");
        Ok(())
    }
}
