//! Month-over-month insights
//!
//! A fixed set of rules compares this month with the previous one and
//! surfaces at most [`MAX_FINDINGS`] findings, most urgent first.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::{totals, DateWindow};
use crate::calendar::previous_month_start;
use crate::models::{Category, Movement, MovementKind};
use crate::money::format_amount;
use crate::normalize::{tag_movements, TaggedMovement};

pub const MAX_FINDINGS: usize = 3;

/// Expenses below this many minor units count as "small"
pub const SMALL_EXPENSE_LIMIT: i64 = 1_000;

/// Severity level of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Good news
    Positive,
    /// Informational, no action needed
    Info,
    /// Should be addressed soon
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Positive => "positive",
            Severity::Info => "info",
            Severity::Warning => "warning",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Positive => 1,
            Severity::Info => 2,
            Severity::Warning => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which rule produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    SpendingAcceleration,
    SpendingReduction,
    Deficit,
    ComfortableSurplus,
    CategoryConcentration,
    SmallExpenses,
    FreshStart,
}

#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub kind: InsightKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Finding {
    fn new(
        kind: InsightKind,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Totals of one month that the rules look at
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthActivity {
    pub income: i64,
    pub expense: i64,
    /// Expense per category name
    pub expense_by_category: HashMap<String, i64>,
    pub small_expense_count: usize,
    pub small_expense_total: i64,
    /// All movements in the month, vault ones included
    pub movement_count: usize,
}

impl MonthActivity {
    pub fn collect(tagged: &[TaggedMovement<'_>], window: &DateWindow) -> Self {
        let (income, expense) = totals(tagged, window);
        let mut activity = Self {
            income,
            expense,
            ..Default::default()
        };

        for t in tagged.iter().filter(|t| window.contains(t.movement.date)) {
            activity.movement_count += 1;
            if t.kind != MovementKind::Expense {
                continue;
            }
            let amount = t.movement.amount.abs();
            *activity
                .expense_by_category
                .entry(t.category_name().to_string())
                .or_default() += amount;
            if amount < SMALL_EXPENSE_LIMIT {
                activity.small_expense_count += 1;
                activity.small_expense_total += amount;
            }
        }

        activity
    }
}

/// Run every rule and keep the most urgent findings
pub fn generate_insights(this_month: &MonthActivity, last_month: &MonthActivity) -> Vec<Finding> {
    let mut findings = Vec::new();

    if last_month.expense > 0 {
        let variation =
            (this_month.expense - last_month.expense) as f64 / last_month.expense as f64 * 100.0;
        if variation > 10.0 {
            findings.push(Finding::new(
                InsightKind::SpendingAcceleration,
                Severity::Warning,
                "Spending is accelerating",
                format!(
                    "You are spending {:.0}% more than last month.",
                    variation
                ),
            ));
        } else if variation < -5.0 {
            findings.push(Finding::new(
                InsightKind::SpendingReduction,
                Severity::Positive,
                "Spending is down",
                format!("You cut spending by {:.0}% compared to last month.", variation.abs()),
            ));
        }
    }

    if this_month.income > 0 && this_month.expense > this_month.income {
        findings.push(Finding::new(
            InsightKind::Deficit,
            Severity::Warning,
            "Deficit this month",
            format!(
                "Expenses exceed income by {}.",
                format_amount(this_month.expense - this_month.income)
            ),
        ));
    } else if this_month.income as f64 > this_month.expense as f64 * 1.5 {
        findings.push(Finding::new(
            InsightKind::ComfortableSurplus,
            Severity::Positive,
            "Comfortable surplus",
            "Income comfortably covers expenses. Consider moving the surplus into a vault.",
        ));
    }

    let top = this_month
        .expense_by_category
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)));
    if let Some((name, &amount)) = top {
        if this_month.expense > 0 {
            let share = amount as f64 / this_month.expense as f64 * 100.0;
            let significant = if this_month.income > 0 {
                amount as f64 / this_month.income as f64 * 100.0 > 10.0
            } else {
                amount > 5_000
            };
            if significant && share > 40.0 {
                findings.push(Finding::new(
                    InsightKind::CategoryConcentration,
                    Severity::Warning,
                    format!("Focus on {}", name),
                    format!("{} accounts for {:.0}% of this month's spending.", name, share),
                ));
            }
        }
    }

    if this_month.small_expense_count > 5 {
        findings.push(Finding::new(
            InsightKind::SmallExpenses,
            Severity::Info,
            "Small expenses add up",
            format!(
                "{} small expenses this month, {} in total.",
                this_month.small_expense_count,
                format_amount(this_month.small_expense_total)
            ),
        ));
    }

    if this_month.movement_count > 0 && last_month.movement_count == 0 {
        findings.push(Finding::new(
            InsightKind::FreshStart,
            Severity::Positive,
            "Fresh start",
            "First month with recorded activity. Consistency is what makes the numbers useful.",
        ));
    }

    findings.sort_by(|a, b| b.severity.priority().cmp(&a.severity.priority()));
    findings.truncate(MAX_FINDINGS);
    findings
}

/// Compare the month containing `today` with the month before
pub fn insights_for(
    movements: &[Movement],
    categories: &[Category],
    today: NaiveDate,
) -> Vec<Finding> {
    let tagged = tag_movements(movements, categories);
    let this_month = MonthActivity::collect(&tagged, &DateWindow::month(today));
    let last_month =
        MonthActivity::collect(&tagged, &DateWindow::month(previous_month_start(today)));
    generate_insights(&this_month, &last_month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Nature, VaultKind};
    use crate::test_utils::{category, date, movement};

    fn activity(movements: &[Movement], categories: &[Category], day: &str) -> MonthActivity {
        let tagged = tag_movements(movements, categories);
        MonthActivity::collect(&tagged, &DateWindow::month(date(day)))
    }

    fn kinds(findings: &[Finding]) -> Vec<InsightKind> {
        findings.iter().map(|f| f.kind).collect()
    }

    #[test]
    fn test_collect_month_activity() {
        let cats = vec![
            category(1, "Salary", Nature::Income, VaultKind::None),
            category(2, "Fund", Nature::Expense, VaultKind::Investment),
        ];
        let movements = vec![
            movement(1, 100_000, "pay", Some(1), "2024-03-01"),
            movement(2, -500, "coffee", None, "2024-03-02"),
            movement(3, 20_000, "save", Some(2), "2024-03-03"),
            movement(4, -700, "coffee", None, "2024-02-27"),
        ];
        let a = activity(&movements, &cats, "2024-03-15");
        assert_eq!(a.income, 100_000);
        assert_eq!(a.expense, 500);
        assert_eq!(a.small_expense_count, 1);
        assert_eq!(a.movement_count, 3);
        assert_eq!(a.expense_by_category.get("Uncategorized"), Some(&500));
    }

    #[test]
    fn test_acceleration_and_deficit_lead() {
        let last = MonthActivity {
            income: 100_000,
            expense: 80_000,
            movement_count: 4,
            ..Default::default()
        };
        let this = MonthActivity {
            income: 100_000,
            expense: 120_000,
            movement_count: 4,
            ..Default::default()
        };
        let findings = generate_insights(&this, &last);
        assert_eq!(
            kinds(&findings),
            vec![InsightKind::SpendingAcceleration, InsightKind::Deficit]
        );
    }

    #[test]
    fn test_reduction_and_surplus() {
        let last = MonthActivity {
            income: 300_000,
            expense: 100_000,
            movement_count: 2,
            ..Default::default()
        };
        let this = MonthActivity {
            income: 300_000,
            expense: 90_000,
            movement_count: 2,
            ..Default::default()
        };
        let findings = generate_insights(&this, &last);
        assert_eq!(
            kinds(&findings),
            vec![InsightKind::SpendingReduction, InsightKind::ComfortableSurplus]
        );
    }

    #[test]
    fn test_concentration_small_expenses_and_cap() {
        let mut by_category = HashMap::new();
        by_category.insert("Rent".to_string(), 90_000);
        by_category.insert("Food".to_string(), 10_000);
        let this = MonthActivity {
            income: 90_000,
            expense: 100_000,
            expense_by_category: by_category,
            small_expense_count: 8,
            small_expense_total: 4_000,
            movement_count: 12,
        };
        let last = MonthActivity {
            expense: 50_000,
            movement_count: 3,
            ..Default::default()
        };

        let findings = generate_insights(&this, &last);
        assert_eq!(findings.len(), MAX_FINDINGS);
        assert!(findings.iter().all(|f| f.severity == Severity::Warning));
        assert!(kinds(&findings).contains(&InsightKind::CategoryConcentration));
    }

    #[test]
    fn test_fresh_start() {
        let this = MonthActivity {
            income: 0,
            expense: 3_000,
            movement_count: 1,
            ..Default::default()
        };
        let findings = generate_insights(&this, &MonthActivity::default());
        assert_eq!(kinds(&findings), vec![InsightKind::FreshStart]);
    }

    #[test]
    fn test_insights_for_compares_previous_month() {
        let cats = vec![category(1, "Salary", Nature::Income, VaultKind::None)];
        let movements = vec![
            movement(1, 100_000, "pay", Some(1), "2024-02-01"),
            movement(2, -10_000, "rent", None, "2024-02-02"),
            movement(3, 100_000, "pay", Some(1), "2024-03-01"),
            movement(4, -20_000, "rent", None, "2024-03-02"),
        ];
        let findings = insights_for(&movements, &cats, date("2024-03-20"));
        assert_eq!(findings[0].kind, InsightKind::SpendingAcceleration);
        assert!(kinds(&findings).contains(&InsightKind::ComfortableSurplus));
    }

    #[test]
    fn test_no_activity_no_findings() {
        let findings = generate_insights(&MonthActivity::default(), &MonthActivity::default());
        assert!(findings.is_empty());
    }
}
