//! Vault deposits and withdrawals
//!
//! Withdrawals read the balance and insert inside one IMMEDIATE transaction,
//! so two concurrent withdrawals cannot both pass validation against the
//! same balance.

use chrono::NaiveDate;
use rusqlite::TransactionBehavior;
use tracing::{info, warn};

use super::categories::category_on;
use super::movements::{category_movements, insert_movement, validate_description};
use super::Database;
use crate::error::{Error, Result};
use crate::models::Movement;
use crate::normalize::tag_movements;
use crate::vault::{plan_deposit, plan_withdrawal, summarize_vaults, vault_balance, VaultOverview};

impl Database {
    /// Move `amount` into a vault category
    pub fn record_vault_deposit(
        &self,
        category_id: i64,
        amount: i64,
        description: &str,
        date: NaiveDate,
    ) -> Result<Movement> {
        let description = validate_description(description)?;
        let conn = self.conn()?;
        let category = category_on(&conn, category_id)?
            .ok_or_else(|| Error::NotFound(format!("category {}", category_id)))?;

        let new = plan_deposit(&category, amount, &description, date)?;
        let movement = insert_movement(&conn, &new)?;
        info!(
            vault = %category.name,
            amount = movement.amount,
            "Recorded vault deposit"
        );
        Ok(movement)
    }

    /// Take `amount` out of a vault category, re-validating the balance at write time
    pub fn record_vault_withdrawal(
        &self,
        category_id: i64,
        amount: i64,
        description: &str,
        date: NaiveDate,
    ) -> Result<Movement> {
        let description = validate_description(description)?;
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let category = category_on(&tx, category_id)?
            .ok_or_else(|| Error::NotFound(format!("category {}", category_id)))?;
        let history = category_movements(&tx, category_id)?;

        let new = match plan_withdrawal(&category, &history, amount, &description, date) {
            Ok(new) => new,
            Err(e) => {
                warn!(vault = %category.name, amount, error = %e, "Vault withdrawal rejected");
                return Err(e);
            }
        };
        let movement = insert_movement(&tx, &new)?;
        tx.commit()?;

        info!(
            vault = %category.name,
            amount = movement.amount,
            "Recorded vault withdrawal"
        );
        Ok(movement)
    }

    /// Current balance of one vault
    pub fn vault_balance(&self, category_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let category = category_on(&conn, category_id)?
            .ok_or_else(|| Error::NotFound(format!("category {}", category_id)))?;
        if !category.is_vault() {
            return Err(Error::InvalidData(format!(
                "category '{}' is not a vault",
                category.name
            )));
        }
        Ok(vault_balance(&category_movements(&conn, category_id)?))
    }

    /// Balances and history of every vault
    pub fn vault_overview(&self) -> Result<VaultOverview> {
        let categories = self.list_categories()?;
        let movements = self.all_movements()?;
        let tagged = tag_movements(&movements, &categories);
        Ok(summarize_vaults(&categories, &tagged))
    }
}
