//! Savings goal command implementations

use anyhow::Result;
use chrono::NaiveDate;
use cofre_core::db::Database;
use cofre_core::goals::{goal_progress, GoalProgress};
use cofre_core::models::{NewSavingsGoal, SavingsGoalUpdate};
use cofre_core::money::format_amount;

use super::{parse_date, parse_money, truncate, AUDIT_ACTOR};

/// Ten-slot text bar for a 0..=100 percentage
fn progress_bar(pct: f64) -> String {
    let filled = (pct / 10.0).round().clamp(0.0, 10.0) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

fn pace_label(progress: &GoalProgress) -> String {
    if progress.reached {
        return "🎉 reached".to_string();
    }
    match progress.monthly_needed {
        Some(needed) => format!("{}/month", format_amount(needed)),
        None => "⚠️  date passed".to_string(),
    }
}

pub fn cmd_goals_list(db: &Database, today: NaiveDate) -> Result<()> {
    let overviews = db.goal_overviews(today)?;

    if overviews.is_empty() {
        println!("No savings goals yet. Add one with:");
        println!("  cofre goals add \"Trip\" 3000 --by 2025-06-30");
        return Ok(());
    }

    println!();
    println!("🎯 Savings Goals");
    println!("   ─────────────────────────────────────────────────────────────");

    for o in &overviews {
        println!(
            "   [{:>3}] {:20} │ {} {:>5.1}% │ {:>10} of {:>10} │ by {} │ {}",
            o.goal.id,
            truncate(&o.goal.name, 20),
            progress_bar(o.progress.progress_pct),
            o.progress.progress_pct,
            format_amount(o.goal.current_amount),
            format_amount(o.goal.target_amount),
            o.goal.target_date,
            pace_label(&o.progress)
        );
    }

    let saved: i64 = overviews.iter().map(|o| o.goal.current_amount).sum();
    let remaining: i64 = overviews.iter().map(|o| o.progress.remaining).sum();
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Saved {} │ still missing {}",
        format_amount(saved),
        format_amount(remaining)
    );

    Ok(())
}

pub fn cmd_goals_add(
    db: &Database,
    name: &str,
    target: &str,
    by: &str,
    saved: Option<&str>,
) -> Result<()> {
    let goal = db.create_goal(&NewSavingsGoal {
        name: name.to_string(),
        target_amount: parse_money(target)?,
        current_amount: saved.map(parse_money).transpose()?.unwrap_or(0),
        target_date: parse_date(Some(by), "--by")?,
    })?;
    db.log_audit(
        AUDIT_ACTOR,
        "create",
        Some("savings_goal"),
        Some(goal.id),
        Some(&goal.name),
    )?;

    println!(
        "✅ Added goal {} '{}' ({} by {})",
        goal.id,
        goal.name,
        format_amount(goal.target_amount),
        goal.target_date
    );
    Ok(())
}

/// Add to a goal; a negative amount takes money back out
pub fn cmd_goals_contribute(db: &Database, id: i64, amount: &str, today: NaiveDate) -> Result<()> {
    let amount = parse_money(amount)?;
    let goal = db.contribute_to_goal(id, amount)?;
    db.log_audit(
        AUDIT_ACTOR,
        "contribute",
        Some("savings_goal"),
        Some(id),
        Some(&format!("amount={}", amount)),
    )?;

    let progress = goal_progress(&goal, today);
    println!(
        "💰 '{}' now at {} of {} ({:.1}%) │ {}",
        goal.name,
        format_amount(goal.current_amount),
        format_amount(goal.target_amount),
        progress.progress_pct,
        pace_label(&progress)
    );
    Ok(())
}

pub fn cmd_goals_update(
    db: &Database,
    id: i64,
    name: Option<&str>,
    target: Option<&str>,
    saved: Option<&str>,
    by: Option<&str>,
) -> Result<()> {
    let update = SavingsGoalUpdate {
        name: name.map(str::to_string),
        target_amount: target.map(parse_money).transpose()?,
        current_amount: saved.map(parse_money).transpose()?,
        target_date: by.map(|d| parse_date(Some(d), "--by")).transpose()?,
    };
    let goal = db.update_goal(id, &update)?;
    db.log_audit(
        AUDIT_ACTOR,
        "update",
        Some("savings_goal"),
        Some(id),
        Some(&serde_json::to_string(&update)?),
    )?;

    println!(
        "✅ Updated goal '{}' ({} of {} by {})",
        goal.name,
        format_amount(goal.current_amount),
        format_amount(goal.target_amount),
        goal.target_date
    );
    Ok(())
}

pub fn cmd_goals_delete(db: &Database, id: i64) -> Result<()> {
    let goal = db.get_goal(id)?;
    db.delete_goal(id)?;
    db.log_audit(
        AUDIT_ACTOR,
        "delete",
        Some("savings_goal"),
        Some(id),
        Some(&goal.name),
    )?;
    println!("🗑️  Deleted goal '{}'", goal.name);
    Ok(())
}
