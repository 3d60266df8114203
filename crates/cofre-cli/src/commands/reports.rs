//! Report command implementations

use anyhow::Result;
use chrono::NaiveDate;
use cofre_core::aggregate::Period;
use cofre_core::config::Settings;
use cofre_core::db::Database;
use cofre_core::error::Notice;
use cofre_core::fire::FireOverrides;
use cofre_core::insights::Severity;
use cofre_core::money::format_amount;

use super::{parse_money, truncate};

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        match notice {
            Notice::NonRepresentativeIncome { income, threshold } => println!(
                "   ℹ️  Income {} is below {}; savings rate shown as 0",
                format_amount(*income),
                format_amount(*threshold)
            ),
            Notice::SimulationCapReached { years, shortfall } => println!(
                "   ℹ️  Target not reached within {} years (short by {})",
                years,
                format_amount(*shortfall)
            ),
        }
    }
}

pub fn cmd_report(db: &Database, period: &str, today: NaiveDate, json: bool) -> Result<()> {
    let period: Period = period.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let snapshot = db.period_snapshot(period.window(today))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!();
    println!("📊 Report ({})", period);
    match snapshot.window.start {
        Some(start) => println!("   Period: {} to {}", start, snapshot.window.end),
        None => println!("   Period: all time to {}", snapshot.window.end),
    }
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Income:       {:>12}", format_amount(snapshot.income));
    println!("   Expense:      {:>12}", format_amount(snapshot.expense));
    println!("   Balance:      {:>12}", format_amount(snapshot.balance));
    println!("   Savings rate: {:>11.1}%", snapshot.savings_rate);
    println!("   Health score: {:>12}", snapshot.health_score);
    print_notices(&snapshot.notices);

    if !snapshot.distribution.is_empty() {
        println!();
        println!(
            "   {:25} │ {:>10} │ {:>6} │ {:>5}",
            "Category", "Amount", "%", "Count"
        );
        println!("   ──────────────────────────┼────────────┼────────┼───────");
        for share in &snapshot.distribution {
            println!(
                "   {:25} │ {:>10} │ {:>5.1}% │ {:>5}",
                truncate(&share.name, 25),
                format_amount(share.amount),
                share.percentage,
                share.movement_count
            );
        }
    }

    if !snapshot.flow.is_empty() {
        println!();
        println!("   Monthly flow");
        for point in &snapshot.flow {
            println!(
                "   {} │ in {:>10} │ out {:>10}",
                point.month,
                format_amount(point.income),
                format_amount(point.expense)
            );
        }
    }

    if snapshot.weekly_rhythm.iter().any(|d| d.amount > 0) {
        println!();
        println!("   Weekly rhythm");
        for day in &snapshot.weekly_rhythm {
            println!("   {} │ {:>10}", day.weekday, format_amount(day.amount));
        }
    }

    if !snapshot.top_expenses.is_empty() {
        println!();
        println!("   Top expenses");
        for m in &snapshot.top_expenses {
            println!(
                "   {} │ {:>10} │ {}",
                m.date,
                format_amount(m.amount),
                truncate(&m.description, 40)
            );
        }
    }

    Ok(())
}

pub fn cmd_dashboard(db: &Database, today: NaiveDate, json: bool) -> Result<()> {
    let summary = db.dashboard_summary(today)?;
    let currency = db.get_ledger_settings()?.currency;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│           💰 Cofre Dashboard            │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Month:           {} ({})", summary.month, currency);
    println!("  Income:          {:>12}", format_amount(summary.month_income));
    println!("  Expense:         {:>12}", format_amount(summary.month_expense));
    println!("  Balance:         {:>12}", format_amount(summary.month_balance));
    println!("  Savings rate:    {:>11.1}%", summary.savings_rate);
    println!("  Health score:    {:>12}", summary.health_score);
    println!();
    println!("  Available cash:  {:>12}", format_amount(summary.available_cash));
    println!("  Emergency vault: {:>12}", format_amount(summary.emergency_total));
    println!("  Investments:     {:>12}", format_amount(summary.investment_total));
    println!("  Net worth:       {:>12}", format_amount(summary.net_worth));
    println!();
    println!(
        "  Left this month: {:>12} ({} per day for {} days)",
        format_amount(summary.remaining_money),
        format_amount(summary.daily_allowance),
        summary.days_left
    );

    let over: Vec<_> = summary.budgets.iter().filter(|b| b.over_limit).collect();
    if !over.is_empty() {
        println!();
        for b in over {
            println!(
                "  ⚠️  {} is over budget: {} of {}",
                b.name,
                format_amount(b.spent),
                format_amount(b.limit)
            );
        }
    }

    print_notices(&summary.notices);
    println!();
    Ok(())
}

pub fn cmd_insights(db: &Database, today: NaiveDate) -> Result<()> {
    let findings = db.insights(today)?;

    if findings.is_empty() {
        println!("No insights this month. Keep recording movements.");
        return Ok(());
    }

    println!();
    println!("💡 Insights");
    println!("   ─────────────────────────────────────────────────────────────");
    for f in findings {
        let icon = match f.severity {
            Severity::Warning => "⚠️ ",
            Severity::Info => "ℹ️ ",
            Severity::Positive => "🎉",
        };
        println!("   {} {}", icon, f.title);
        println!("      {}", f.message);
    }
    Ok(())
}

/// Build FIRE overrides from command-line flags
pub fn fire_overrides(
    expected_return: Option<f64>,
    withdrawal_rate: Option<f64>,
    age: Option<u32>,
    net_worth: Option<&str>,
) -> Result<FireOverrides> {
    Ok(FireOverrides {
        expected_return,
        withdrawal_rate,
        current_age: age,
        current_net_worth: net_worth.map(parse_money).transpose()?,
    })
}

pub fn cmd_fire(
    db: &Database,
    settings: &Settings,
    overrides: &FireOverrides,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let (params, projection) = db.fire_projection(overrides, &settings.fire, today)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "parameters": params,
                "projection": projection,
            }))?
        );
        return Ok(());
    }

    println!();
    println!("🔥 FIRE Projection");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Return {:.1}% │ withdrawal {:.1}% │ age {} │ net worth {}",
        params.expected_return,
        params.withdrawal_rate,
        params.current_age,
        format_amount(params.current_net_worth)
    );
    println!("   Target:           {:>14}", format_amount(projection.fire_target));
    println!(
        "   Monthly income:   {:>14}",
        format_amount(projection.perpetual_monthly_income)
    );

    if projection.reached {
        println!(
            "   Reached in {} year(s), at age {} ({} year(s) before 65)",
            projection.years_to_target, projection.target_age, projection.years_gained
        );
    }
    print_notices(&projection.notices);

    Ok(())
}
