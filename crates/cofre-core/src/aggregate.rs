//! Period aggregation: flow, distribution, weekly rhythm, evolution and scores
//!
//! Everything here works on [`TaggedMovement`]s so vault movements are
//! recognized the same way as in the vault ledger. Vault deposits and
//! withdrawals move money between "available" and "reserved"; they are never
//! counted as income or expense.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::Serialize;

use crate::calendar::{days_in_month, month_end, month_key, month_start, next_month_start};
use crate::error::Notice;
use crate::models::{Category, Movement, MovementKind, Nature};
use crate::normalize::{tag_movements, TaggedMovement};
use crate::vault::summarize_vaults;

/// Income below this many minor units makes the savings rate meaningless
pub const MIN_INCOME_THRESHOLD: i64 = 100;

/// Number of movements listed in `top_expenses`
pub const TOP_EXPENSES: usize = 5;

/// Preset reporting windows, relative to a reference day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum Period {
    #[serde(rename = "7D")]
    Week,
    #[default]
    #[serde(rename = "30D")]
    Month,
    #[serde(rename = "90D")]
    Quarter,
    #[serde(rename = "12M")]
    Year,
    #[serde(rename = "ALL")]
    All,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "7D",
            Self::Month => "30D",
            Self::Quarter => "90D",
            Self::Year => "12M",
            Self::All => "ALL",
        }
    }

    /// Window ending on `today`, both ends inclusive
    pub fn window(&self, today: NaiveDate) -> DateWindow {
        let start = match self {
            Self::Week => Some(today - Duration::days(7)),
            Self::Month => Some(today - Duration::days(30)),
            Self::Quarter => Some(today - Duration::days(90)),
            Self::Year => today.checked_sub_months(Months::new(12)),
            Self::All => None,
        };
        DateWindow { start, end: today }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "7D" => Ok(Self::Week),
            "30D" => Ok(Self::Month),
            "90D" => Ok(Self::Quarter),
            "12M" => Ok(Self::Year),
            "ALL" => Ok(Self::All),
            _ => Err(format!(
                "Unknown period: {} (valid: 7D, 30D, 90D, 12M, ALL)",
                s
            )),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive date range; no start means "since the first movement"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: NaiveDate,
}

impl DateWindow {
    /// The calendar month containing `date`
    pub fn month(date: NaiveDate) -> Self {
        Self {
            start: Some(month_start(date)),
            end: month_end(date),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date <= self.end && self.start.map_or(true, |s| date >= s)
    }
}

/// Income and expense of one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowPoint {
    /// "YYYY-MM"
    pub month: String,
    pub income: i64,
    pub expense: i64,
}

/// Expense share of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category_id: Option<i64>,
    pub name: String,
    pub amount: i64,
    /// Share of total expense, 0–100
    pub percentage: f64,
    pub movement_count: usize,
}

/// Expense total for one weekday
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayTotal {
    /// "Mon" .. "Sun"
    pub weekday: String,
    pub amount: i64,
}

/// Running balance after one movement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionPoint {
    pub date: NaiveDate,
    pub movement_id: i64,
    pub balance: i64,
}

/// Everything the analytics view needs for one window
#[derive(Debug, Clone, Serialize)]
pub struct PeriodSnapshot {
    pub window: DateWindow,
    pub income: i64,
    pub expense: i64,
    /// income − expense
    pub balance: i64,
    pub savings_rate: f64,
    pub health_score: u8,
    pub flow: Vec<FlowPoint>,
    pub distribution: Vec<CategoryShare>,
    pub weekly_rhythm: Vec<WeekdayTotal>,
    /// Full history, unaffected by the window
    pub evolution: Vec<EvolutionPoint>,
    pub top_expenses: Vec<Movement>,
    pub notices: Vec<Notice>,
}

/// Income and expense totals (both non-negative) of non-vault movements in `window`
pub fn totals(tagged: &[TaggedMovement<'_>], window: &DateWindow) -> (i64, i64) {
    tagged
        .iter()
        .filter(|t| window.contains(t.movement.date))
        .fold((0, 0), |(income, expense), t| match t.kind {
            MovementKind::Income => (income + t.movement.amount.abs(), expense),
            MovementKind::Expense => (income, expense + t.movement.amount.abs()),
            _ => (income, expense),
        })
}

/// Savings rate in percent, clamped to [-100, 100]
///
/// Income below [`MIN_INCOME_THRESHOLD`] yields 0 together with a
/// `NonRepresentativeIncome` notice.
pub fn savings_rate(income: i64, expense: i64) -> (f64, Option<Notice>) {
    if income < MIN_INCOME_THRESHOLD {
        return (
            0.0,
            Some(Notice::NonRepresentativeIncome {
                income,
                threshold: MIN_INCOME_THRESHOLD,
            }),
        );
    }

    let rate = (income - expense) as f64 / income as f64 * 100.0;
    (rate.clamp(-100.0, 100.0), None)
}

/// Heuristic 0–100 score; bands are checked in order and the first match wins
pub fn health_score(income: i64, expense: i64, savings_rate: f64) -> u8 {
    if income == 0 && expense > 0 {
        return 20;
    }
    if expense > income {
        let deficit_pct = (expense - income) as f64 / income as f64 * 100.0;
        let penalty = (deficit_pct / 2.0).round();
        return (40.0 - penalty).max(10.0) as u8;
    }
    if savings_rate > 20.0 {
        90
    } else if savings_rate > 10.0 {
        75
    } else if savings_rate > 0.0 {
        60
    } else if income > 0 {
        50
    } else {
        70
    }
}

fn flow(tagged: &[TaggedMovement<'_>], window: &DateWindow) -> Vec<FlowPoint> {
    let in_window: Vec<&TaggedMovement<'_>> = tagged
        .iter()
        .filter(|t| !t.is_vault() && window.contains(t.movement.date))
        .collect();

    let first = match window.start {
        Some(start) => start,
        None => match in_window.iter().map(|t| t.movement.date).min() {
            Some(first) => first,
            None => return Vec::new(),
        },
    };

    let mut months: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    let mut cursor = month_start(first);
    while cursor <= window.end {
        months.insert(month_key(cursor), (0, 0));
        cursor = next_month_start(cursor);
    }

    for t in in_window {
        let entry = months.entry(month_key(t.movement.date)).or_default();
        match t.kind {
            MovementKind::Income => entry.0 += t.movement.amount.abs(),
            MovementKind::Expense => entry.1 += t.movement.amount.abs(),
            _ => {}
        }
    }

    months
        .into_iter()
        .map(|(month, (income, expense))| FlowPoint {
            month,
            income,
            expense,
        })
        .collect()
}

fn distribution(tagged: &[TaggedMovement<'_>], window: &DateWindow) -> Vec<CategoryShare> {
    let mut by_name: HashMap<&str, CategoryShare> = HashMap::new();
    let mut total = 0i64;

    for t in tagged
        .iter()
        .filter(|t| t.kind == MovementKind::Expense && window.contains(t.movement.date))
    {
        let amount = t.movement.amount.abs();
        total += amount;
        let share = by_name
            .entry(t.category_name())
            .or_insert_with(|| CategoryShare {
                category_id: t.category.map(|c| c.id),
                name: t.category_name().to_string(),
                amount: 0,
                percentage: 0.0,
                movement_count: 0,
            });
        share.amount += amount;
        share.movement_count += 1;
    }

    let mut shares: Vec<CategoryShare> = by_name.into_values().collect();
    for share in &mut shares {
        if total > 0 {
            share.percentage = share.amount as f64 / total as f64 * 100.0;
        }
    }
    shares.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
    shares
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekly_rhythm(tagged: &[TaggedMovement<'_>], window: &DateWindow) -> Vec<WeekdayTotal> {
    let mut buckets = [0i64; 7];
    for t in tagged
        .iter()
        .filter(|t| t.kind == MovementKind::Expense && window.contains(t.movement.date))
    {
        buckets[t.movement.date.weekday().num_days_from_monday() as usize] +=
            t.movement.amount.abs();
    }

    WEEKDAYS
        .iter()
        .zip(buckets)
        .map(|(day, amount)| WeekdayTotal {
            weekday: day.to_string(),
            amount,
        })
        .collect()
}

/// Running income-minus-expense balance over the whole history
///
/// Ordered by (date, created_at, id). Vault movements get a point but leave
/// the balance unchanged.
pub fn evolution(tagged: &[TaggedMovement<'_>]) -> Vec<EvolutionPoint> {
    let mut ordered: Vec<&TaggedMovement<'_>> = tagged.iter().collect();
    ordered.sort_by(|a, b| {
        (a.movement.date, a.movement.created_at, a.movement.id).cmp(&(
            b.movement.date,
            b.movement.created_at,
            b.movement.id,
        ))
    });

    let mut balance = 0i64;
    ordered
        .into_iter()
        .map(|t| {
            match t.kind {
                MovementKind::Income => balance += t.movement.amount,
                MovementKind::Expense => balance -= t.movement.amount.abs(),
                _ => {}
            }
            EvolutionPoint {
                date: t.movement.date,
                movement_id: t.movement.id,
                balance,
            }
        })
        .collect()
}

fn top_expenses(tagged: &[TaggedMovement<'_>], window: &DateWindow) -> Vec<Movement> {
    let mut expenses: Vec<&Movement> = tagged
        .iter()
        .filter(|t| t.kind == MovementKind::Expense && window.contains(t.movement.date))
        .map(|t| t.movement)
        .collect();
    expenses.sort_by(|a, b| {
        b.amount
            .abs()
            .cmp(&a.amount.abs())
            .then_with(|| b.date.cmp(&a.date))
    });
    expenses.into_iter().take(TOP_EXPENSES).cloned().collect()
}

/// Build the snapshot for `window`
pub fn aggregate(movements: &[Movement], categories: &[Category], window: DateWindow) -> PeriodSnapshot {
    let tagged = tag_movements(movements, categories);
    let (income, expense) = totals(&tagged, &window);
    let (rate, notice) = savings_rate(income, expense);

    tracing::debug!(
        start = ?window.start,
        end = %window.end,
        income,
        expense,
        "Aggregated period"
    );

    PeriodSnapshot {
        window,
        income,
        expense,
        balance: income - expense,
        savings_rate: rate,
        health_score: health_score(income, expense, rate),
        flow: flow(&tagged, &window),
        distribution: distribution(&tagged, &window),
        weekly_rhythm: weekly_rhythm(&tagged, &window),
        evolution: evolution(&tagged),
        top_expenses: top_expenses(&tagged, &window),
        notices: notice.into_iter().collect(),
    }
}

/// Spending against a category's monthly limit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetUsage {
    pub category_id: i64,
    pub name: String,
    pub limit: i64,
    pub spent: i64,
    /// spent / limit × 100, may exceed 100
    pub percentage: f64,
    /// limit − spent, negative when over
    pub remaining: i64,
    pub over_limit: bool,
}

/// Budget usage of every limited expense category in the month containing `month`
pub fn budget_usage(
    tagged: &[TaggedMovement<'_>],
    categories: &[Category],
    month: NaiveDate,
) -> Vec<BudgetUsage> {
    let window = DateWindow::month(month);

    categories
        .iter()
        .filter(|c| c.nature == Nature::Expense && !c.is_vault() && c.monthly_limit > 0)
        .map(|c| {
            let spent: i64 = tagged
                .iter()
                .filter(|t| {
                    t.kind == MovementKind::Expense
                        && t.category.map(|tc| tc.id) == Some(c.id)
                        && window.contains(t.movement.date)
                })
                .map(|t| t.movement.amount.abs())
                .sum();
            BudgetUsage {
                category_id: c.id,
                name: c.name.clone(),
                limit: c.monthly_limit,
                spent,
                percentage: spent as f64 / c.monthly_limit as f64 * 100.0,
                remaining: c.monthly_limit - spent,
                over_limit: spent > c.monthly_limit,
            }
        })
        .collect()
}

/// Current-month overview with vault and cash positions
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub today: NaiveDate,
    /// "YYYY-MM"
    pub month: String,
    pub month_income: i64,
    pub month_expense: i64,
    pub month_balance: i64,
    pub savings_rate: f64,
    pub health_score: u8,
    pub emergency_total: i64,
    pub investment_total: i64,
    pub vault_total: i64,
    /// Opening balance plus all-time income minus expense
    pub cumulative_balance: i64,
    /// `cumulative_balance` floored at zero
    pub available_cash: i64,
    pub net_worth: i64,
    /// Month income, or the sum of monthly limits when there is none
    pub budget: i64,
    pub remaining_money: i64,
    pub days_left: u32,
    pub daily_allowance: i64,
    pub budgets: Vec<BudgetUsage>,
    pub notices: Vec<Notice>,
}

/// Build the dashboard for the month containing `today`
pub fn dashboard(
    movements: &[Movement],
    categories: &[Category],
    opening_balance: i64,
    today: NaiveDate,
) -> DashboardSummary {
    let tagged = tag_movements(movements, categories);
    let month = DateWindow::month(today);
    let (month_income, month_expense) = totals(&tagged, &month);
    let (all_income, all_expense) = totals(
        &tagged,
        &DateWindow {
            start: None,
            end: NaiveDate::MAX,
        },
    );
    let (rate, notice) = savings_rate(month_income, month_expense);

    let vaults = summarize_vaults(categories, &tagged);
    let cumulative_balance = opening_balance + all_income - all_expense;
    let available_cash = cumulative_balance.max(0);

    let budget = if month_income > 0 {
        month_income
    } else {
        categories
            .iter()
            .filter(|c| c.nature == Nature::Expense && !c.is_vault())
            .map(|c| c.monthly_limit)
            .sum()
    };
    let remaining_money = (budget - month_expense).max(0);
    let days_left = days_in_month(today.year(), today.month())
        .saturating_sub(today.day())
        .max(1);

    DashboardSummary {
        today,
        month: month_key(today),
        month_income,
        month_expense,
        month_balance: month_income - month_expense,
        savings_rate: rate,
        health_score: health_score(month_income, month_expense, rate),
        emergency_total: vaults.emergency_total,
        investment_total: vaults.investment_total,
        vault_total: vaults.total,
        cumulative_balance,
        available_cash,
        net_worth: vaults.total + available_cash,
        budget,
        remaining_money,
        days_left,
        daily_allowance: remaining_money / i64::from(days_left),
        budgets: budget_usage(&tagged, categories, today),
        notices: notice.into_iter().collect(),
    }
}
