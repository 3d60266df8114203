//! Ledger settings command implementation

use anyhow::Result;
use cofre_core::db::Database;
use cofre_core::money::format_amount;

use super::{parse_money, AUDIT_ACTOR};

pub fn cmd_settings(
    db: &Database,
    opening_balance: Option<&str>,
    currency: Option<&str>,
) -> Result<()> {
    let mut settings = db.get_ledger_settings()?;

    if opening_balance.is_some() || currency.is_some() {
        if let Some(balance) = opening_balance {
            settings.opening_balance = parse_money(balance)?;
        }
        if let Some(currency) = currency {
            settings.currency = currency.to_string();
        }
        settings = db.update_ledger_settings(&settings)?;
        db.log_audit(
            AUDIT_ACTOR,
            "update",
            Some("settings"),
            None,
            Some(&serde_json::to_string(&settings)?),
        )?;
        println!("✅ Settings updated");
    }

    println!("   Opening balance: {}", format_amount(settings.opening_balance));
    println!("   Currency:        {}", settings.currency);
    Ok(())
}
