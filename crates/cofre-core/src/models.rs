//! Domain models for Cofre

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Whether a category records money coming in or going out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nature {
    Income,
    Expense,
}

impl Nature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for Nature {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown category nature: {}", s)),
        }
    }
}

impl std::fmt::Display for Nature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reserve kind of a category
///
/// Anything other than `None` turns the category into a vault: its movements
/// are deposits and withdrawals, not income or expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VaultKind {
    #[default]
    None,
    Investment,
    Emergency,
}

impl VaultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Investment => "investment",
            Self::Emergency => "emergency",
        }
    }

    pub fn is_vault(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::str::FromStr for VaultKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "investment" => Ok(Self::Investment),
            "emergency" => Ok(Self::Emergency),
            _ => Err(format!("Unknown vault kind: {}", s)),
        }
    }
}

impl std::fmt::Display for VaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the caller is doing with an amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Ordinary income or expense entry
    #[default]
    Regular,
    /// Moving money into a vault
    Deposit,
    /// Taking money out of a vault
    Withdrawal,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
        }
    }

    pub fn is_vault_operation(&self) -> bool {
        !matches!(self, Self::Regular)
    }
}

impl std::str::FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "regular" => Ok(Self::Regular),
            "deposit" => Ok(Self::Deposit),
            "withdrawal" | "withdraw" => Ok(Self::Withdrawal),
            _ => Err(format!("Unknown operation: {}", s)),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a stored (already normalized) movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Income,
    Expense,
    VaultDeposit,
    VaultWithdrawal,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::VaultDeposit => "vault_deposit",
            Self::VaultWithdrawal => "vault_withdrawal",
        }
    }

    pub fn is_vault(&self) -> bool {
        matches!(self, Self::VaultDeposit | Self::VaultWithdrawal)
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classification bucket for movements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub nature: Nature,
    pub vault_kind: VaultKind,
    /// Monthly spending limit in minor units (0 = no limit)
    pub monthly_limit: i64,
    pub color: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn is_vault(&self) -> bool {
        self.vault_kind.is_vault()
    }
}

/// A category to be created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub nature: Nature,
    #[serde(default)]
    pub vault_kind: VaultKind,
    #[serde(default)]
    pub monthly_limit: i64,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Partial update for a category (nature and vault kind are fixed once created)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub monthly_limit: Option<i64>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// One financial event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: i64,
    /// Signed minor units: positive = income or vault deposit, negative = expense or withdrawal
    pub amount: i64,
    pub description: String,
    pub category_id: Option<i64>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A movement to be recorded (amount already normalized)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMovement {
    pub amount: i64,
    pub description: String,
    pub category_id: Option<i64>,
    pub date: NaiveDate,
}

/// A movement as entered by a user, before normalization
///
/// `amount` may carry any sign; the category and operation decide the stored one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementRequest {
    pub amount: i64,
    pub description: String,
    pub category_id: Option<i64>,
    pub date: NaiveDate,
    #[serde(default)]
    pub operation: Operation,
}

/// Template for a monthly obligation or income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringRule {
    pub id: i64,
    pub description: String,
    /// Signed minor units, normalized when the rule was created
    pub amount: i64,
    /// 1..=31; clamped to the month's last day when projected
    pub day_of_month: u32,
    pub category_id: Option<i64>,
    pub active: bool,
    pub process_automatically: bool,
    pub created_at: DateTime<Utc>,
}

/// A recurring rule to be created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecurringRule {
    pub description: String,
    pub amount: i64,
    pub day_of_month: u32,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub process_automatically: bool,
}

/// Partial update for a recurring rule
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecurringRuleUpdate {
    pub description: Option<String>,
    pub amount: Option<i64>,
    pub day_of_month: Option<u32>,
    /// Absent keeps the category, `null` clears it
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<Option<i64>>,
    pub active: Option<bool>,
    pub process_automatically: Option<bool>,
}

/// Money being put aside toward a dated target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: i64,
    pub name: String,
    /// Minor units, always positive
    pub target_amount: i64,
    /// Minor units saved so far, never negative
    pub current_amount: i64,
    pub target_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A savings goal to be created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSavingsGoal {
    pub name: String,
    pub target_amount: i64,
    #[serde(default)]
    pub current_amount: i64,
    pub target_date: NaiveDate,
}

/// Partial update for a savings goal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavingsGoalUpdate {
    pub name: Option<String>,
    pub target_amount: Option<i64>,
    pub current_amount: Option<i64>,
    pub target_date: Option<NaiveDate>,
}

/// Read a present field as `Some(value)`, keeping an explicit `null` as `Some(None)`.
/// Used with `#[serde(default)]` so an absent field stays `None`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Per-ledger settings kept in the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Cash on hand before the first recorded movement (minor units)
    pub opening_balance: i64,
    /// ISO 4217 code, display only
    pub currency: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            opening_balance: 0,
            currency: "EUR".to_string(),
        }
    }
}
