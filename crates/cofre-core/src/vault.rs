//! Vault ledger: reserve balances reconstructed from the movement stream
//!
//! A vault balance is the signed sum of its category's movements. Deposits
//! are positive and withdrawals negative by construction (see
//! [`crate::normalize`]), so there is no separate debit/credit bookkeeping.
//!
//! Validation here is advisory against the snapshot it is given. The store's
//! write path ([`crate::db::Database::record_vault_withdrawal`]) re-runs it
//! inside the same transaction as the insert.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Category, Movement, MovementKind, NewMovement, Operation, VaultKind};
use crate::normalize::{normalize, TaggedMovement};

/// Current balance of a vault from all of its movements
pub fn vault_balance<'a, I>(movements: I) -> i64
where
    I: IntoIterator<Item = &'a Movement>,
{
    movements.into_iter().map(|m| m.amount).sum()
}

/// Check that `requested` can be withdrawn from `balance`
///
/// Both conditions are checked; under integer arithmetic they always agree.
pub fn validate_withdrawal(balance: i64, requested: i64) -> Result<()> {
    if requested < 0 {
        return Err(Error::InvalidAmount(format!(
            "withdrawal amount must be positive, got {}",
            requested
        )));
    }

    let exceeds = requested > balance;
    let would_go_negative = balance
        .checked_sub(requested)
        .map(|after| after < 0)
        .unwrap_or(true);

    if exceeds || would_go_negative {
        return Err(Error::InsufficientVaultBalance {
            available: balance,
            requested,
        });
    }

    Ok(())
}

fn require_vault(category: &Category) -> Result<()> {
    if category.is_vault() {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "category '{}' is not a vault",
            category.name
        )))
    }
}

/// Build a deposit movement for a vault category
pub fn plan_deposit(
    category: &Category,
    amount: i64,
    description: &str,
    date: NaiveDate,
) -> Result<NewMovement> {
    require_vault(category)?;
    let signed = normalize(amount, category.nature, category.vault_kind, Operation::Deposit)?;

    Ok(NewMovement {
        amount: signed,
        description: description.to_string(),
        category_id: Some(category.id),
        date,
    })
}

/// Build a withdrawal movement after validating it against the vault's movements
///
/// `movements` must be the vault category's movements; no movement is built
/// when validation fails.
pub fn plan_withdrawal(
    category: &Category,
    movements: &[Movement],
    amount: i64,
    description: &str,
    date: NaiveDate,
) -> Result<NewMovement> {
    require_vault(category)?;
    let signed = normalize(
        amount,
        category.nature,
        category.vault_kind,
        Operation::Withdrawal,
    )?;

    let balance = vault_balance(movements.iter().filter(|m| m.category_id == Some(category.id)));
    validate_withdrawal(balance, -signed)?;

    Ok(NewMovement {
        amount: signed,
        description: description.to_string(),
        category_id: Some(category.id),
        date,
    })
}

/// Deposits and withdrawals of one vault in one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaultMonth {
    /// "YYYY-MM"
    pub month: String,
    pub deposits: i64,
    pub withdrawals: i64,
}

/// Balance and history of a single vault category
#[derive(Debug, Clone, Serialize)]
pub struct VaultSummary {
    pub category_id: i64,
    pub name: String,
    pub vault_kind: VaultKind,
    pub balance: i64,
    pub total_deposited: i64,
    pub total_withdrawn: i64,
    pub movement_count: usize,
    /// Oldest month first
    pub history: Vec<VaultMonth>,
}

/// All vaults plus per-kind totals
#[derive(Debug, Clone, Serialize)]
pub struct VaultOverview {
    pub vaults: Vec<VaultSummary>,
    pub emergency_total: i64,
    pub investment_total: i64,
    pub total: i64,
}

/// Summarize every vault category
///
/// Vault categories without movements are included with a zero balance.
pub fn summarize_vaults(categories: &[Category], tagged: &[TaggedMovement<'_>]) -> VaultOverview {
    let mut vaults = Vec::new();

    for category in categories.iter().filter(|c| c.is_vault()) {
        let mut summary = VaultSummary {
            category_id: category.id,
            name: category.name.clone(),
            vault_kind: category.vault_kind,
            balance: 0,
            total_deposited: 0,
            total_withdrawn: 0,
            movement_count: 0,
            history: Vec::new(),
        };
        let mut months: BTreeMap<String, (i64, i64)> = BTreeMap::new();

        for t in tagged
            .iter()
            .filter(|t| t.category.map(|c| c.id) == Some(category.id))
        {
            let amount = t.movement.amount;
            let entry = months
                .entry(t.movement.date.format("%Y-%m").to_string())
                .or_default();
            match t.kind {
                MovementKind::VaultDeposit => {
                    summary.total_deposited += amount;
                    entry.0 += amount;
                }
                MovementKind::VaultWithdrawal => {
                    summary.total_withdrawn += amount.abs();
                    entry.1 += amount.abs();
                }
                _ => {}
            }
            summary.balance += amount;
            summary.movement_count += 1;
        }

        summary.history = months
            .into_iter()
            .map(|(month, (deposits, withdrawals))| VaultMonth {
                month,
                deposits,
                withdrawals,
            })
            .collect();
        vaults.push(summary);
    }

    let total_for = |kind: VaultKind| -> i64 {
        vaults
            .iter()
            .filter(|v| v.vault_kind == kind)
            .map(|v| v.balance)
            .sum()
    };
    let emergency_total = total_for(VaultKind::Emergency);
    let investment_total = total_for(VaultKind::Investment);

    VaultOverview {
        emergency_total,
        investment_total,
        total: emergency_total + investment_total,
        vaults,
    }
}
