//! Vault command implementations

use anyhow::Result;
use cofre_core::db::Database;
use cofre_core::money::format_amount;

use super::{colored_amount, parse_date, parse_money, resolve_category, truncate, AUDIT_ACTOR};

pub fn cmd_vault_status(db: &Database) -> Result<()> {
    let overview = db.vault_overview()?;

    if overview.vaults.is_empty() {
        println!("No vaults yet. Create one with:");
        println!("  cofre categories add \"Emergency Fund\" --vault emergency");
        return Ok(());
    }

    println!();
    println!("🏦 Vaults");
    println!("   ─────────────────────────────────────────────────────────────");

    for v in &overview.vaults {
        println!(
            "   {:25} │ {:10} │ {:>12} │ in {:>10} │ out {:>10}",
            truncate(&v.name, 25),
            v.vault_kind,
            format_amount(v.balance),
            format_amount(v.total_deposited),
            format_amount(v.total_withdrawn)
        );
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Emergency:  {:>12}", format_amount(overview.emergency_total));
    println!("   Investment: {:>12}", format_amount(overview.investment_total));
    println!("   Total:      {:>12}", format_amount(overview.total));

    Ok(())
}

pub fn cmd_vault_deposit(
    db: &Database,
    vault: &str,
    amount: &str,
    description: &str,
    date: Option<&str>,
) -> Result<()> {
    let category = resolve_category(db, vault)?;
    let amount = parse_money(amount)?;
    let date = parse_date(date, "--date")?;

    let movement = db.record_vault_deposit(category.id, amount, description, date)?;
    db.log_audit(
        AUDIT_ACTOR,
        "deposit",
        Some("movement"),
        Some(movement.id),
        Some(&category.name),
    )?;

    let balance = db.vault_balance(category.id)?;
    println!(
        "✅ Deposited {} into '{}' (balance {})",
        colored_amount(movement.amount),
        category.name,
        format_amount(balance)
    );
    Ok(())
}

pub fn cmd_vault_withdraw(
    db: &Database,
    vault: &str,
    amount: &str,
    description: &str,
    date: Option<&str>,
) -> Result<()> {
    let category = resolve_category(db, vault)?;
    let amount = parse_money(amount)?;
    let date = parse_date(date, "--date")?;

    let movement = db.record_vault_withdrawal(category.id, amount, description, date)?;
    db.log_audit(
        AUDIT_ACTOR,
        "withdraw",
        Some("movement"),
        Some(movement.id),
        Some(&category.name),
    )?;

    let balance = db.vault_balance(category.id)?;
    println!(
        "✅ Withdrew {} from '{}' (balance {})",
        colored_amount(movement.amount),
        category.name,
        format_amount(balance)
    );
    Ok(())
}
