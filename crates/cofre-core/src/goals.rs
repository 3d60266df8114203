//! Savings goal progress
//!
//! A goal's saved amount is whatever has been recorded against it through
//! contributions or edits. It is not derived from vault balances.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{NewSavingsGoal, SavingsGoal};
use crate::money::format_amount;

/// Where a goal stands on a given day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    /// Saved share of the target in percent, capped at 100
    pub progress_pct: f64,
    /// Minor units still missing, 0 once reached
    pub remaining: i64,
    /// Days until the target date; negative once it has passed
    pub days_left: i64,
    /// Calendar months until the target month, at least 1 while the date is
    /// ahead and 0 once it has passed
    pub months_left: u32,
    /// Saving per month that finishes on time. `None` when the date has
    /// passed with money still missing.
    pub monthly_needed: Option<i64>,
    pub reached: bool,
}

/// A goal with its progress, as listed by the CLI and the API
#[derive(Debug, Clone, Serialize)]
pub struct GoalOverview {
    pub goal: SavingsGoal,
    pub progress: GoalProgress,
}

/// Validate a goal before it is stored; returns it with the name trimmed
pub fn prepare_goal(new: &NewSavingsGoal) -> Result<NewSavingsGoal> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidData("goal name cannot be empty".to_string()));
    }
    if new.target_amount <= 0 {
        return Err(Error::InvalidAmount(format!(
            "goal target must be positive, got {}",
            new.target_amount
        )));
    }
    if new.current_amount < 0 {
        return Err(Error::InvalidAmount(format!(
            "saved amount cannot be negative, got {}",
            new.current_amount
        )));
    }

    Ok(NewSavingsGoal {
        name: name.to_string(),
        ..new.clone()
    })
}

/// Saved amount after adding `amount` (negative takes money back out)
pub fn apply_contribution(goal: &SavingsGoal, amount: i64) -> Result<i64> {
    if amount == 0 {
        return Err(Error::InvalidAmount(
            "contribution cannot be zero".to_string(),
        ));
    }
    let saved = goal
        .current_amount
        .checked_add(amount)
        .ok_or_else(|| Error::InvalidAmount(format!("contribution {} overflows", amount)))?;
    if saved < 0 {
        return Err(Error::InvalidAmount(format!(
            "cannot take out {} from goal '{}', only {} saved",
            format_amount(amount.saturating_neg()),
            goal.name,
            format_amount(goal.current_amount)
        )));
    }
    Ok(saved)
}

/// Whole calendar months from `today`'s month to `target`'s month
fn months_between(today: NaiveDate, target: NaiveDate) -> i64 {
    (target.year() as i64 - today.year() as i64) * 12 + target.month() as i64
        - today.month() as i64
}

pub fn goal_progress(goal: &SavingsGoal, today: NaiveDate) -> GoalProgress {
    let target = goal.target_amount.max(0);
    let saved = goal.current_amount.max(0);

    let progress_pct = if target == 0 {
        100.0
    } else {
        (saved as f64 * 100.0 / target as f64).min(100.0)
    };
    let remaining = target.saturating_sub(saved).max(0);
    let reached = remaining == 0;

    let days_left = (goal.target_date - today).num_days();
    let months_left = if goal.target_date < today {
        0
    } else {
        months_between(today, goal.target_date).clamp(1, u32::MAX as i64) as u32
    };

    let monthly_needed = if reached {
        Some(0)
    } else if months_left == 0 {
        None
    } else {
        Some((remaining as u64).div_ceil(months_left as u64) as i64)
    };

    GoalProgress {
        progress_pct,
        remaining,
        days_left,
        months_left,
        monthly_needed,
        reached,
    }
}

/// Progress for every goal, in the order given
pub fn overview(goals: Vec<SavingsGoal>, today: NaiveDate) -> Vec<GoalOverview> {
    goals
        .into_iter()
        .map(|goal| {
            let progress = goal_progress(&goal, today);
            GoalOverview { goal, progress }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::date;
    use chrono::{TimeZone, Utc};

    fn goal(target: i64, saved: i64, target_date: &str) -> SavingsGoal {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        SavingsGoal {
            id: 1,
            name: "Trip".to_string(),
            target_amount: target,
            current_amount: saved,
            target_date: date(target_date),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_progress_midway() {
        let progress = goal_progress(&goal(120_000, 30_000, "2024-12-31"), date("2024-05-20"));
        assert_eq!(progress.progress_pct, 25.0);
        assert_eq!(progress.remaining, 90_000);
        assert!(!progress.reached);
        assert_eq!(progress.months_left, 7);
        // 900.00 over 7 months, rounded up to the cent
        assert_eq!(progress.monthly_needed, Some(12_858));
        assert_eq!(progress.days_left, 225);
    }

    #[test]
    fn test_progress_capped_when_oversaved() {
        let progress = goal_progress(&goal(50_000, 80_000, "2024-06-30"), date("2024-05-20"));
        assert_eq!(progress.progress_pct, 100.0);
        assert_eq!(progress.remaining, 0);
        assert!(progress.reached);
        assert_eq!(progress.monthly_needed, Some(0));
    }

    #[test]
    fn test_target_this_month_counts_as_one_month() {
        let progress = goal_progress(&goal(10_000, 0, "2024-05-31"), date("2024-05-20"));
        assert_eq!(progress.months_left, 1);
        assert_eq!(progress.monthly_needed, Some(10_000));

        let due_today = goal_progress(&goal(10_000, 0, "2024-05-20"), date("2024-05-20"));
        assert_eq!(due_today.days_left, 0);
        assert_eq!(due_today.months_left, 1);
    }

    #[test]
    fn test_missed_deadline() {
        let progress = goal_progress(&goal(10_000, 4_000, "2024-04-30"), date("2024-05-20"));
        assert_eq!(progress.months_left, 0);
        assert!(progress.days_left < 0);
        assert_eq!(progress.monthly_needed, None);
        assert_eq!(progress.remaining, 6_000);

        // A goal reached late still reports nothing left to save
        let done = goal_progress(&goal(10_000, 10_000, "2024-04-30"), date("2024-05-20"));
        assert_eq!(done.monthly_needed, Some(0));
    }

    #[test]
    fn test_prepare_goal_validation() {
        let valid = NewSavingsGoal {
            name: "  Car  ".to_string(),
            target_amount: 1_000_000,
            current_amount: 0,
            target_date: date("2025-01-01"),
        };
        assert_eq!(prepare_goal(&valid).unwrap().name, "Car");

        let blank = NewSavingsGoal {
            name: " ".to_string(),
            ..valid.clone()
        };
        assert!(matches!(prepare_goal(&blank), Err(Error::InvalidData(_))));

        for target in [0, -500] {
            let bad = NewSavingsGoal {
                target_amount: target,
                ..valid.clone()
            };
            assert!(matches!(prepare_goal(&bad), Err(Error::InvalidAmount(_))));
        }

        let negative_saved = NewSavingsGoal {
            current_amount: -1,
            ..valid
        };
        assert!(matches!(
            prepare_goal(&negative_saved),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_contributions() {
        let g = goal(100_000, 20_000, "2024-12-31");
        assert_eq!(apply_contribution(&g, 5_000).unwrap(), 25_000);
        assert_eq!(apply_contribution(&g, -20_000).unwrap(), 0);
        assert!(matches!(
            apply_contribution(&g, -20_001),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            apply_contribution(&g, 0),
            Err(Error::InvalidAmount(_))
        ));
        assert!(matches!(
            apply_contribution(&goal(100_000, 1, "2024-12-31"), i64::MAX),
            Err(Error::InvalidAmount(_))
        ));
    }
}
