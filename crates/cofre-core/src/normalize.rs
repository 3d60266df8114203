//! Sign normalization and movement classification
//!
//! Every path that creates or reclassifies a movement goes through
//! [`normalize`] (or [`normalize_for`] when only a category reference is at
//! hand). Consumers of stored movements use [`tag_movements`] so that
//! income/expense/vault classification happens in exactly one place.
//!
//! Canonical signs:
//! - vault deposit: positive
//! - vault withdrawal: negative
//! - income: positive
//! - expense: negative

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::{Category, Movement, MovementKind, Nature, Operation, VaultKind};

/// Return the canonical signed amount for a movement
///
/// Rules are checked in order and the first match wins:
/// 1. vault category + deposit → positive
/// 2. vault category + withdrawal → negative
/// 3. income nature → positive
/// 4. expense nature → negative
pub fn normalize(
    amount: i64,
    nature: Nature,
    vault_kind: VaultKind,
    operation: Operation,
) -> Result<i64> {
    if amount == 0 {
        return Err(Error::InvalidAmount("amount cannot be zero".to_string()));
    }
    let magnitude = amount
        .checked_abs()
        .ok_or_else(|| Error::InvalidAmount(format!("amount {} is out of range", amount)))?;

    let signed = match (vault_kind.is_vault(), operation, nature) {
        (true, Operation::Deposit, _) => magnitude,
        (true, Operation::Withdrawal, _) => -magnitude,
        (_, _, Nature::Income) => magnitude,
        (_, _, Nature::Expense) => -magnitude,
    };

    Ok(signed)
}

/// Normalize against an optional category
///
/// Vault operations must name a category. A regular movement without a
/// category is recorded as an expense.
pub fn normalize_for(amount: i64, category: Option<&Category>, operation: Operation) -> Result<i64> {
    match category {
        Some(cat) => {
            if operation.is_vault_operation() && !cat.is_vault() {
                return Err(Error::InvalidData(format!(
                    "category '{}' is not a vault",
                    cat.name
                )));
            }
            normalize(amount, cat.nature, cat.vault_kind, operation)
        }
        None if operation.is_vault_operation() => Err(Error::MissingCategory(format!(
            "{} requires a vault category",
            operation
        ))),
        None => normalize(amount, Nature::Expense, VaultKind::None, operation),
    }
}

/// Classify a stored movement
///
/// Vault movements are told apart by sign; everything else by category
/// nature. Uncategorized movements count as expenses.
pub fn classify(movement: &Movement, category: Option<&Category>) -> MovementKind {
    match category {
        Some(cat) if cat.is_vault() => {
            if movement.amount >= 0 {
                MovementKind::VaultDeposit
            } else {
                MovementKind::VaultWithdrawal
            }
        }
        Some(cat) => match cat.nature {
            Nature::Income => MovementKind::Income,
            Nature::Expense => MovementKind::Expense,
        },
        None => MovementKind::Expense,
    }
}

/// A movement paired with its resolved category and classification
#[derive(Debug, Clone, Copy)]
pub struct TaggedMovement<'a> {
    pub movement: &'a Movement,
    pub category: Option<&'a Category>,
    pub kind: MovementKind,
}

impl<'a> TaggedMovement<'a> {
    /// Category name, or "Uncategorized"
    pub fn category_name(&self) -> &'a str {
        self.category
            .map(|c| c.name.as_str())
            .unwrap_or(UNCATEGORIZED)
    }

    pub fn is_vault(&self) -> bool {
        self.kind.is_vault()
    }
}

/// Display name for movements without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Lookup table from category id to category
pub struct CategoryIndex<'a> {
    by_id: HashMap<i64, &'a Category>,
}

impl<'a> CategoryIndex<'a> {
    pub fn new(categories: &'a [Category]) -> Self {
        Self {
            by_id: categories.iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn get(&self, id: Option<i64>) -> Option<&'a Category> {
        id.and_then(|id| self.by_id.get(&id).copied())
    }
}

/// Tag every movement with its category and kind, preserving input order
///
/// A `category_id` that points at a missing category is treated the same as
/// no category.
pub fn tag_movements<'a>(
    movements: &'a [Movement],
    categories: &'a [Category],
) -> Vec<TaggedMovement<'a>> {
    let index = CategoryIndex::new(categories);
    movements
        .iter()
        .map(|m| {
            let category = index.get(m.category_id);
            TaggedMovement {
                movement: m,
                category,
                kind: classify(m, category),
            }
        })
        .collect()
}
