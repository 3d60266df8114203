//! Category command implementations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use cofre_core::db::Database;
use cofre_core::models::{NewCategory, Nature, VaultKind};
use cofre_core::money::format_amount;

use super::{parse_money, resolve_category, truncate, AUDIT_ACTOR};

pub fn cmd_categories_list(db: &Database) -> Result<()> {
    let categories = db.list_categories()?;

    if categories.is_empty() {
        println!("No categories yet. Seed the defaults with:");
        println!("  cofre init");
        return Ok(());
    }

    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:>4} │ {:25} │ {:8} │ {:10} │ {:>10}",
        "ID", "Name", "Nature", "Vault", "Limit"
    );

    for c in categories {
        let limit = if c.monthly_limit > 0 {
            format_amount(c.monthly_limit)
        } else {
            "-".to_string()
        };
        println!(
            "   {:>4} │ {:25} │ {:8} │ {:10} │ {:>10}",
            c.id,
            truncate(&c.name, 25),
            c.nature,
            c.vault_kind,
            limit
        );
    }

    Ok(())
}

pub fn cmd_categories_add(
    db: &Database,
    name: &str,
    nature: &str,
    vault: &str,
    limit: Option<&str>,
    color: Option<String>,
    icon: Option<String>,
) -> Result<()> {
    let nature: Nature = nature.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let vault_kind: VaultKind = vault.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let monthly_limit = limit.map(parse_money).transpose()?.unwrap_or(0);

    let category = db
        .create_category(&NewCategory {
            name: name.to_string(),
            nature,
            vault_kind,
            monthly_limit,
            color,
            icon,
        })
        .context("Failed to create category")?;
    db.log_audit(
        AUDIT_ACTOR,
        "create",
        Some("category"),
        Some(category.id),
        Some(&category.name),
    )?;

    if category.is_vault() {
        println!(
            "✅ Created {} vault '{}' (ID {})",
            category.vault_kind, category.name, category.id
        );
    } else {
        println!(
            "✅ Created {} category '{}' (ID {})",
            category.nature, category.name, category.id
        );
    }
    Ok(())
}

pub fn cmd_categories_delete(db: &Database, key: &str) -> Result<()> {
    let category = resolve_category(db, key)?;
    db.delete_category(category.id)?;
    db.log_audit(
        AUDIT_ACTOR,
        "delete",
        Some("category"),
        Some(category.id),
        Some(&category.name),
    )?;
    println!("🗑️  Deleted category '{}'", category.name);
    Ok(())
}

pub fn cmd_categories_budgets(db: &Database, today: NaiveDate) -> Result<()> {
    let budgets = db.budget_usage(today)?;

    if budgets.is_empty() {
        println!("No budgets set. Add a monthly limit with:");
        println!("  cofre categories add Food --limit 400");
        return Ok(());
    }

    println!();
    println!("🎯 Budgets for {}", today.format("%B %Y"));
    println!("   ─────────────────────────────────────────────────────────────");

    for b in budgets {
        let marker = if b.over_limit { "⚠️ " } else { "  " };
        println!(
            "   {}{:22} │ {:>10} / {:>10} │ {:>5.1}%",
            marker,
            truncate(&b.name, 22),
            format_amount(b.spent),
            format_amount(b.limit),
            b.percentage
        );
    }

    Ok(())
}
