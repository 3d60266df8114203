//! Movement command implementations

use anyhow::Result;
use cofre_core::db::{Database, MovementFilter};
use cofre_core::models::{MovementRequest, Operation};

use super::{
    colored_amount, parse_date, parse_money, parse_optional_date, resolve_category, truncate,
    AUDIT_ACTOR,
};

pub fn cmd_add(
    db: &Database,
    amount: &str,
    description: &str,
    category: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    let amount = parse_money(amount)?;
    let date = parse_date(date, "--date")?;
    let category = category.map(|c| resolve_category(db, c)).transpose()?;

    let movement = db.record_movement(&MovementRequest {
        amount,
        description: description.to_string(),
        category_id: category.as_ref().map(|c| c.id),
        date,
        operation: Operation::Regular,
    })?;
    db.log_audit(
        AUDIT_ACTOR,
        "create",
        Some("movement"),
        Some(movement.id),
        Some(&movement.description),
    )?;

    let category_name = category.as_ref().map_or("Uncategorized", |c| c.name.as_str());
    println!(
        "✅ Recorded {} │ {} │ {} ({})",
        movement.date,
        colored_amount(movement.amount),
        movement.description,
        category_name
    );
    Ok(())
}

pub fn cmd_movements_list(
    db: &Database,
    limit: i64,
    from: Option<&str>,
    to: Option<&str>,
    category: Option<&str>,
) -> Result<()> {
    let category = category.map(|c| resolve_category(db, c)).transpose()?;
    let filter = MovementFilter {
        from: parse_optional_date(from, "--from")?,
        to: parse_optional_date(to, "--to")?,
        category_id: category.map(|c| c.id),
        limit: Some(limit),
    };
    let movements = db.list_movements(&filter)?;

    if movements.is_empty() {
        println!("No movements found. Record one with:");
        println!("  cofre add 12.50 \"Lunch\" --category Food");
        return Ok(());
    }

    let categories = db.list_categories()?;

    println!();
    println!("📝 Recent Movements");
    println!("   ─────────────────────────────────────────────────────────────");

    for m in movements {
        let category_name = m
            .category_id
            .and_then(|id| categories.iter().find(|c| c.id == id))
            .map_or("Uncategorized", |c| c.name.as_str());
        println!(
            "   [{:>4}] {} │ {:>10} │ {:32} │ {}",
            m.id,
            m.date,
            colored_amount(m.amount),
            truncate(&m.description, 32),
            category_name
        );
    }

    Ok(())
}

pub fn cmd_movements_delete(db: &Database, id: i64) -> Result<()> {
    let movement = db
        .get_movement(id)?
        .ok_or_else(|| anyhow::anyhow!("Movement {} not found", id))?;

    db.delete_movement(id)?;
    db.log_audit(
        AUDIT_ACTOR,
        "delete",
        Some("movement"),
        Some(id),
        Some(&movement.description),
    )?;

    println!(
        "🗑️  Deleted movement {} ({} │ {})",
        id,
        movement.date,
        movement.description
    );
    Ok(())
}
