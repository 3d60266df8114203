//! Recurring rule command implementations

use anyhow::Result;
use chrono::NaiveDate;
use cofre_core::db::Database;
use cofre_core::models::NewRecurringRule;
use cofre_core::money::format_amount;
use cofre_core::recurring::RuleState;

use super::{colored_amount, parse_money, resolve_category, truncate, AUDIT_ACTOR};

fn state_label(state: RuleState) -> &'static str {
    match state {
        RuleState::Satisfied => "✅ paid",
        RuleState::Pending => "⏳ pending",
        RuleState::DueToday => "📌 due today",
        RuleState::Overdue => "⚠️  overdue",
        RuleState::Scheduled => "🤖 scheduled",
    }
}

pub fn cmd_recurring_list(db: &Database, today: NaiveDate) -> Result<()> {
    let projections = db.recurring_projections(today)?;

    if projections.is_empty() {
        println!("No active recurring rules. Add one with:");
        println!("  cofre recurring add \"Rent\" 900 --day 5");
        return Ok(());
    }

    println!();
    println!("🔁 Recurring Rules ({})", today.format("%B %Y"));
    println!("   ─────────────────────────────────────────────────────────────");

    for p in &projections {
        println!(
            "   [{:>3}] {:28} │ {:>10} │ day {:>2} │ {:14} │ next {}",
            p.rule.id,
            truncate(&p.rule.description, 28),
            colored_amount(p.rule.amount),
            p.rule.day_of_month,
            state_label(p.state),
            p.next_due_date
        );
    }

    let summary = db.recurring_summary()?;
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Committed: income {} │ expense {} │ vaults {} │ net {}",
        format_amount(summary.income_total),
        format_amount(summary.expense_total),
        format_amount(summary.vault_total),
        format_amount(summary.net)
    );

    let overdue = projections
        .iter()
        .filter(|p| p.state == RuleState::Overdue)
        .count();
    if overdue > 0 {
        println!();
        println!(
            "   {} overdue rule(s). Confirm with 'cofre recurring confirm <id>'.",
            overdue
        );
    }

    Ok(())
}

pub fn cmd_recurring_add(
    db: &Database,
    description: &str,
    amount: &str,
    day: u32,
    category: Option<&str>,
    auto: bool,
) -> Result<()> {
    let amount = parse_money(amount)?;
    let category = category.map(|c| resolve_category(db, c)).transpose()?;

    let rule = db.create_recurring_rule(&NewRecurringRule {
        description: description.to_string(),
        amount,
        day_of_month: day,
        category_id: category.map(|c| c.id),
        process_automatically: auto,
    })?;
    db.log_audit(
        AUDIT_ACTOR,
        "create",
        Some("recurring_rule"),
        Some(rule.id),
        Some(&rule.description),
    )?;

    println!(
        "✅ Added rule {} '{}' ({} on day {}{})",
        rule.id,
        rule.description,
        format_amount(rule.amount),
        rule.day_of_month,
        if rule.process_automatically {
            ", automatic"
        } else {
            ""
        }
    );
    Ok(())
}

pub fn cmd_recurring_confirm(db: &Database, id: i64, today: NaiveDate) -> Result<()> {
    let movement = db.confirm_recurring_rule(id, today)?;
    db.log_audit(
        AUDIT_ACTOR,
        "confirm",
        Some("recurring_rule"),
        Some(id),
        Some(&format!("movement {}", movement.id)),
    )?;

    println!(
        "✅ Confirmed '{}' │ {} │ {}",
        movement.description,
        colored_amount(movement.amount),
        movement.date
    );
    Ok(())
}

pub fn cmd_recurring_process(db: &Database, today: NaiveDate) -> Result<()> {
    let created = db.process_automatic_rules(today)?;

    if created.is_empty() {
        println!("Nothing to process: every automatic rule is paid or not yet due.");
        return Ok(());
    }

    db.log_audit(
        AUDIT_ACTOR,
        "process",
        Some("recurring_rule"),
        None,
        Some(&format!("{} movement(s)", created.len())),
    )?;

    println!("🤖 Recorded {} automatic movement(s):", created.len());
    for m in &created {
        println!(
            "   {} │ {:>10} │ {}",
            m.date,
            colored_amount(m.amount),
            truncate(&m.description, 40)
        );
    }
    Ok(())
}

pub fn cmd_recurring_set_active(db: &Database, id: i64, active: bool) -> Result<()> {
    let rule = db.set_recurring_rule_active(id, active)?;
    let action = if active { "resume" } else { "pause" };
    db.log_audit(
        AUDIT_ACTOR,
        action,
        Some("recurring_rule"),
        Some(id),
        Some(&rule.description),
    )?;

    if active {
        println!("▶️  Resumed '{}'", rule.description);
    } else {
        println!("⏸️  Paused '{}'", rule.description);
    }
    Ok(())
}

pub fn cmd_recurring_delete(db: &Database, id: i64) -> Result<()> {
    let rule = db.get_recurring_rule(id)?;
    db.delete_recurring_rule(id)?;
    db.log_audit(
        AUDIT_ACTOR,
        "delete",
        Some("recurring_rule"),
        Some(id),
        Some(&rule.description),
    )?;
    println!("🗑️  Deleted rule '{}'", rule.description);
    Ok(())
}
