//! Recurring rule projection
//!
//! Rule state is never stored. Every call re-derives it from the movement
//! history: a rule counts as paid this month when a movement dated in the
//! current calendar month has the same description and the same absolute
//! amount. Two unrelated movements that happen to share both will also
//! satisfy the rule; callers should treat `Satisfied` as "probably paid".
//!
//! Rules anchored on days 29–31 are clamped to the last day of shorter months,
//! both when deciding the state and when computing the next due date.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::calendar::{clamped_day, month_end, month_start, next_month_start};
use crate::error::{Error, Result};
use crate::models::{Category, Movement, NewMovement, NewRecurringRule, Operation, RecurringRule};
use crate::normalize::{normalize_for, CategoryIndex};

/// Where a rule stands in the current month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleState {
    /// A matching movement exists this month
    Satisfied,
    /// Not paid, due later this month
    Pending,
    /// Not paid, due today
    DueToday,
    /// Not paid, past due, needs manual confirmation
    Overdue,
    /// Not paid, past due, left to the scheduler
    Scheduled,
}

impl RuleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Satisfied => "satisfied",
            Self::Pending => "pending",
            Self::DueToday => "due_today",
            Self::Overdue => "overdue",
            Self::Scheduled => "scheduled",
        }
    }

    /// Whether a movement may be created for the rule now
    pub fn is_confirmable(&self) -> bool {
        matches!(self, Self::DueToday | Self::Overdue | Self::Scheduled)
    }
}

impl std::fmt::Display for RuleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rule with its derived state for a given day
#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    pub rule: RecurringRule,
    pub state: RuleState,
    pub next_due_date: NaiveDate,
    /// This month's due date after clamping
    pub due_this_month: NaiveDate,
    /// Movement that satisfied the rule, if any
    pub matched_movement_id: Option<i64>,
}

/// Find this month's movement that satisfies `rule`
pub fn find_match<'a>(
    rule: &RecurringRule,
    movements: &'a [Movement],
    today: NaiveDate,
) -> Option<&'a Movement> {
    let start = month_start(today);
    let end = month_end(today);
    movements.iter().find(|m| {
        m.date >= start
            && m.date <= end
            && m.description == rule.description
            && m.amount.unsigned_abs() == rule.amount.unsigned_abs()
    })
}

/// Derive the state of a single rule, regardless of its active flag
pub fn project_rule(rule: &RecurringRule, movements: &[Movement], today: NaiveDate) -> Projection {
    let due_this_month = clamped_day(today, rule.day_of_month);
    let matched = find_match(rule, movements, today);

    let state = match matched {
        Some(_) => RuleState::Satisfied,
        None if today.day() < due_this_month.day() => RuleState::Pending,
        None if today.day() == due_this_month.day() => RuleState::DueToday,
        None if rule.process_automatically => RuleState::Scheduled,
        None => RuleState::Overdue,
    };

    // Once this month's due day has passed, paid or not, the next one is next month's
    let next_due_date = match state {
        RuleState::Pending | RuleState::DueToday => due_this_month,
        RuleState::Satisfied | RuleState::Overdue | RuleState::Scheduled => {
            clamped_day(next_month_start(today), rule.day_of_month)
        }
    };

    Projection {
        rule: rule.clone(),
        state,
        next_due_date,
        due_this_month,
        matched_movement_id: matched.map(|m| m.id),
    }
}

/// Project every active rule, ordered by this month's due day
pub fn project_rules(
    rules: &[RecurringRule],
    movements: &[Movement],
    today: NaiveDate,
) -> Vec<Projection> {
    let mut projections: Vec<Projection> = rules
        .iter()
        .filter(|r| r.active)
        .map(|r| project_rule(r, movements, today))
        .collect();

    projections.sort_by(|a, b| {
        a.due_this_month
            .cmp(&b.due_this_month)
            .then_with(|| a.rule.id.cmp(&b.rule.id))
    });

    tracing::debug!(
        rules = rules.len(),
        projected = projections.len(),
        %today,
        "Projected recurring rules"
    );

    projections
}

/// Turn a due rule into a movement dated today
///
/// Only due-today, overdue and scheduled rules can be confirmed. The rule's
/// description is copied verbatim so the new movement satisfies the rule.
pub fn confirm_rule(
    rule: &RecurringRule,
    movements: &[Movement],
    today: NaiveDate,
) -> Result<NewMovement> {
    if !rule.active {
        return Err(Error::RuleNotDue(format!(
            "rule {} ('{}') is paused",
            rule.id, rule.description
        )));
    }
    if rule.amount == 0 {
        return Err(Error::InvalidAmount(format!(
            "rule {} has a zero amount",
            rule.id
        )));
    }

    let projection = project_rule(rule, movements, today);
    match projection.state {
        state if state.is_confirmable() => Ok(NewMovement {
            amount: rule.amount,
            description: rule.description.clone(),
            category_id: rule.category_id,
            date: today,
        }),
        RuleState::Satisfied => Err(Error::RuleNotDue(format!(
            "rule {} ('{}') is already satisfied this month",
            rule.id, rule.description
        ))),
        _ => Err(Error::RuleNotDue(format!(
            "rule {} ('{}') is not due until {}",
            rule.id, rule.description, projection.next_due_date
        ))),
    }
}

/// Automatic rules the scheduler should materialize now
pub fn rules_to_auto_process(projections: &[Projection]) -> Vec<&Projection> {
    projections
        .iter()
        .filter(|p| {
            p.rule.active
                && p.rule.process_automatically
                && matches!(p.state, RuleState::DueToday | RuleState::Scheduled)
        })
        .collect()
}

/// Movement the scheduler records for an automatic rule, dated on this month's due day
pub fn materialize(projection: &Projection) -> NewMovement {
    NewMovement {
        amount: projection.rule.amount,
        description: projection.rule.description.clone(),
        category_id: projection.rule.category_id,
        date: projection.due_this_month,
    }
}

/// Rules not yet paid this month plus next month's projections, soonest first
pub fn upcoming(projections: &[Projection], limit: usize) -> Vec<&Projection> {
    let mut items: Vec<&Projection> = projections.iter().collect();
    items.sort_by(|a, b| {
        a.next_due_date
            .cmp(&b.next_due_date)
            .then_with(|| a.rule.id.cmp(&b.rule.id))
    });
    items.truncate(limit);
    items
}

/// Validate a new rule and normalize its amount against its category
///
/// Rules on a vault category are recurring deposits.
pub fn prepare_rule(rule: &NewRecurringRule, category: Option<&Category>) -> Result<NewRecurringRule> {
    if rule.description.trim().is_empty() {
        return Err(Error::InvalidData(
            "recurring rule needs a description".to_string(),
        ));
    }
    if !(1..=31).contains(&rule.day_of_month) {
        return Err(Error::InvalidData(format!(
            "day of month must be between 1 and 31, got {}",
            rule.day_of_month
        )));
    }

    let operation = match category {
        Some(c) if c.is_vault() => Operation::Deposit,
        _ => Operation::Regular,
    };
    let amount = normalize_for(rule.amount, category, operation)?;

    Ok(NewRecurringRule {
        description: rule.description.trim().to_string(),
        amount,
        day_of_month: rule.day_of_month,
        category_id: rule.category_id,
        process_automatically: rule.process_automatically,
    })
}

/// Monthly totals committed by active rules
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommitmentSummary {
    pub income_total: i64,
    pub expense_total: i64,
    /// Recurring deposits into vaults
    pub vault_total: i64,
    /// income − expense − vault deposits
    pub net: i64,
    /// Expense totals for days 1–7, 8–14, 15–21 and 22–31
    pub weekly_pressure: [i64; 4],
}

/// Summarize what active rules commit each month
pub fn summarize_commitments(rules: &[RecurringRule], categories: &[Category]) -> CommitmentSummary {
    let index = CategoryIndex::new(categories);
    let mut summary = CommitmentSummary::default();

    for rule in rules.iter().filter(|r| r.active) {
        let magnitude = rule.amount.abs();
        match index.get(rule.category_id) {
            Some(c) if c.is_vault() => summary.vault_total += magnitude,
            Some(c) if c.nature == crate::models::Nature::Income => {
                summary.income_total += magnitude
            }
            _ => {
                summary.expense_total += magnitude;
                let week = match rule.day_of_month {
                    0..=7 => 0,
                    8..=14 => 1,
                    15..=21 => 2,
                    _ => 3,
                };
                summary.weekly_pressure[week] += magnitude;
            }
        }
    }

    summary.net = summary.income_total - summary.expense_total - summary.vault_total;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Nature, VaultKind};
    use crate::test_utils::{category, date, movement, rule};

    #[test]
    fn test_overdue_manual_rule() {
        let r = rule(1, "Gym", -3_000, 10, false);
        let p = project_rule(&r, &[], date("2024-05-15"));
        assert_eq!(p.state, RuleState::Overdue);
        assert_eq!(p.due_this_month, date("2024-05-10"));
        assert_eq!(p.next_due_date, date("2024-06-10"));
        assert!(p.matched_movement_id.is_none());
    }

    #[test]
    fn test_next_due_date_by_state() {
        let manual = rule(1, "Phone", -2_000, 10, false);
        let auto = rule(2, "Netflix", -1_299, 31, true);

        let pending = project_rule(&manual, &[], date("2024-05-09"));
        assert_eq!(pending.next_due_date, date("2024-05-10"));
        let due_today = project_rule(&manual, &[], date("2024-05-10"));
        assert_eq!(due_today.next_due_date, date("2024-05-10"));

        // Scheduled on the last day of January rolls to the clamped day in February
        let scheduled = project_rule(&auto, &[], date("2024-01-31"));
        assert_eq!(scheduled.state, RuleState::DueToday);
        let auto_early = rule(3, "Cloud", -500, 5, true);
        let scheduled = project_rule(&auto_early, &[], date("2024-01-31"));
        assert_eq!(scheduled.state, RuleState::Scheduled);
        assert_eq!(scheduled.due_this_month, date("2024-01-05"));
        assert_eq!(scheduled.next_due_date, date("2024-02-05"));

        // Materialized movements keep this month's due day
        assert_eq!(materialize(&scheduled).date, date("2024-01-05"));
    }

    #[test]
    fn test_overdue_projects_next_month_once_confirmed() {
        let r = rule(1, "Gym", -3_000, 10, false);
        let today = date("2024-05-15");
        let new = confirm_rule(&r, &[], today).unwrap();
        assert_eq!(new.date, today);
        assert_eq!(new.amount, -3_000);

        let recorded = vec![movement(9, new.amount, &new.description, None, "2024-05-15")];
        let p = project_rule(&r, &recorded, today);
        assert_eq!(p.state, RuleState::Satisfied);
        assert_eq!(p.next_due_date, date("2024-06-10"));
    }

    #[test]
    fn test_satisfied_by_matching_movement_on_due_day() {
        let r = rule(1, "Rent", -80_000, 10, false);
        let movements = vec![movement(4, -80_000, "Rent", Some(2), "2024-05-10")];
        let p = project_rule(&r, &movements, date("2024-05-20"));
        assert_eq!(p.state, RuleState::Satisfied);
        assert_eq!(p.matched_movement_id, Some(4));
        assert_eq!(p.next_due_date, date("2024-06-10"));
    }

    #[test]
    fn test_match_uses_absolute_amount_and_exact_description() {
        let r = rule(1, "Rent", -80_000, 10, false);
        let today = date("2024-05-20");
        let positive = vec![movement(4, 80_000, "Rent", None, "2024-05-02")];
        assert_eq!(project_rule(&r, &positive, today).state, RuleState::Satisfied);

        let other_desc = vec![movement(4, -80_000, "rent", None, "2024-05-02")];
        assert_eq!(project_rule(&r, &other_desc, today).state, RuleState::Overdue);

        let other_amount = vec![movement(4, -80_001, "Rent", None, "2024-05-02")];
        assert_eq!(project_rule(&r, &other_amount, today).state, RuleState::Overdue);
    }

    #[test]
    fn test_previous_and_next_month_movements_do_not_satisfy() {
        let r = rule(1, "Rent", -80_000, 10, false);
        let movements = vec![
            movement(1, -80_000, "Rent", None, "2024-04-30"),
            movement(2, -80_000, "Rent", None, "2024-06-01"),
        ];
        let p = project_rule(&r, &movements, date("2024-05-05"));
        assert_eq!(p.state, RuleState::Pending);
    }

    #[test]
    fn test_pending_due_today_and_scheduled() {
        let manual = rule(1, "Phone", -2_000, 10, false);
        let auto = rule(2, "Netflix", -1_299, 10, true);

        assert_eq!(project_rule(&manual, &[], date("2024-05-09")).state, RuleState::Pending);
        assert_eq!(project_rule(&manual, &[], date("2024-05-10")).state, RuleState::DueToday);
        assert_eq!(project_rule(&auto, &[], date("2024-05-10")).state, RuleState::DueToday);
        assert_eq!(project_rule(&auto, &[], date("2024-05-11")).state, RuleState::Scheduled);
    }

    #[test]
    fn test_day_31_clamps_in_short_months() {
        let r = rule(1, "Savings sweep", -10_000, 31, false);
        let p = project_rule(&r, &[], date("2024-04-30"));
        assert_eq!(p.state, RuleState::DueToday);
        assert_eq!(p.due_this_month, date("2024-04-30"));

        let paid = vec![movement(1, -10_000, "Savings sweep", None, "2024-01-31")];
        let p = project_rule(&r, &paid, date("2024-01-31"));
        assert_eq!(p.state, RuleState::Satisfied);
        assert_eq!(p.next_due_date, date("2024-02-29"));
    }

    #[test]
    fn test_confirm_rejects_pending_satisfied_and_paused() {
        let r = rule(1, "Gym", -3_000, 20, false);
        assert!(matches!(
            confirm_rule(&r, &[], date("2024-05-15")),
            Err(Error::RuleNotDue(_))
        ));

        let paid = vec![movement(1, -3_000, "Gym", None, "2024-05-02")];
        assert!(matches!(
            confirm_rule(&r, &paid, date("2024-05-25")),
            Err(Error::RuleNotDue(_))
        ));

        let mut paused = r.clone();
        paused.active = false;
        assert!(matches!(
            confirm_rule(&paused, &[], date("2024-05-25")),
            Err(Error::RuleNotDue(_))
        ));
    }

    #[test]
    fn test_project_rules_skips_inactive_and_sorts() {
        let mut paused = rule(3, "Old", -100, 1, false);
        paused.active = false;
        let rules = vec![rule(1, "B", -100, 25, false), rule(2, "A", -100, 5, false), paused];
        let projections = project_rules(&rules, &[], date("2024-05-01"));
        assert_eq!(projections.len(), 2);
        assert_eq!(projections[0].rule.id, 2);
        assert_eq!(projections[1].rule.id, 1);
    }

    #[test]
    fn test_rules_to_auto_process_and_materialize() {
        let rules = vec![
            rule(1, "Netflix", -1_299, 3, true),
            rule(2, "Gym", -3_000, 3, false),
            rule(3, "Insurance", -5_000, 28, true),
        ];
        let today = date("2024-05-10");
        let projections = project_rules(&rules, &[], today);
        let due = rules_to_auto_process(&projections);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].rule.id, 1);

        let m = materialize(due[0]);
        assert_eq!(m.date, date("2024-05-03"));
        assert_eq!(m.description, "Netflix");
    }

    #[test]
    fn test_prepare_rule_normalizes_sign() {
        let salary = category(1, "Salary", Nature::Income, VaultKind::None);
        let fund = category(2, "Fund", Nature::Expense, VaultKind::Investment);
        let new = NewRecurringRule {
            description: " Pay ".to_string(),
            amount: -250_000,
            day_of_month: 25,
            category_id: Some(1),
            process_automatically: true,
        };
        let prepared = prepare_rule(&new, Some(&salary)).unwrap();
        assert_eq!(prepared.amount, 250_000);
        assert_eq!(prepared.description, "Pay");

        let deposit = prepare_rule(&new, Some(&fund)).unwrap();
        assert_eq!(deposit.amount, 250_000);

        let uncategorized = prepare_rule(&NewRecurringRule { amount: 500, ..new.clone() }, None)
            .unwrap();
        assert_eq!(uncategorized.amount, -500);

        let bad_day = NewRecurringRule {
            day_of_month: 32,
            ..new.clone()
        };
        assert!(matches!(prepare_rule(&bad_day, None), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_summarize_commitments() {
        let categories = vec![
            category(1, "Salary", Nature::Income, VaultKind::None),
            category(2, "Fund", Nature::Expense, VaultKind::Investment),
        ];
        let mut r_salary = rule(1, "Pay", 300_000, 25, true);
        r_salary.category_id = Some(1);
        let mut r_fund = rule(2, "Invest", 50_000, 26, true);
        r_fund.category_id = Some(2);
        let rules = vec![
            r_salary,
            r_fund,
            rule(3, "Rent", -90_000, 1, false),
            rule(4, "Gym", -3_000, 15, false),
            rule(5, "Phone", -2_000, 30, false),
        ];

        let summary = summarize_commitments(&rules, &categories);
        assert_eq!(summary.income_total, 300_000);
        assert_eq!(summary.vault_total, 50_000);
        assert_eq!(summary.expense_total, 95_000);
        assert_eq!(summary.net, 155_000);
        assert_eq!(summary.weekly_pressure, [90_000, 0, 3_000, 2_000]);
    }

    #[test]
    fn test_upcoming_limits_and_orders() {
        let rules = vec![
            rule(1, "A", -100, 20, false),
            rule(2, "B", -100, 5, false),
            rule(3, "C", -100, 12, false),
        ];
        let projections = project_rules(&rules, &[], date("2024-05-01"));
        let next = upcoming(&projections, 2);
        assert_eq!(next.len(), 2);
        assert_eq!(next[0].rule.id, 2);
        assert_eq!(next[1].rule.id, 3);
    }
}
