//! Integration tests for cofre-core
//!
//! These tests exercise whole months of ledger activity: recording,
//! vault transfers, recurring rules and the reports built on top.

use chrono::NaiveDate;
use cofre_core::{
    db::Database,
    export::{movements_csv, ExportOptions},
    fire::{FireOverrides, FireParameters},
    insights::InsightKind,
    models::{MovementRequest, NewCategory, NewRecurringRule, Nature, Operation, VaultKind},
    recurring::RuleState,
    Error, Period,
};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date literal")
}

fn category(db: &Database, name: &str, nature: Nature, vault_kind: VaultKind) -> i64 {
    db.create_category(&NewCategory {
        name: name.to_string(),
        nature,
        vault_kind,
        monthly_limit: 0,
        color: None,
        icon: None,
    })
    .expect("Failed to create category")
    .id
}

fn record(db: &Database, amount: i64, description: &str, category_id: Option<i64>, date: &str) {
    db.record_movement(&MovementRequest {
        amount,
        description: description.to_string(),
        category_id,
        date: day(date),
        operation: Operation::Regular,
    })
    .expect("Failed to record movement");
}

// =============================================================================
// Ledger Workflow Tests
// =============================================================================

#[test]
fn test_month_of_activity() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let salary = category(&db, "Salary", Nature::Income, VaultKind::None);
    let food = category(&db, "Food", Nature::Expense, VaultKind::None);
    let reserve = category(&db, "Reserve", Nature::Expense, VaultKind::Emergency);

    record(&db, 300_000, "Pay", Some(salary), "2024-04-01");
    record(&db, 12_000, "Groceries", Some(food), "2024-04-03");
    record(&db, 4_500, "Dinner", Some(food), "2024-04-12");
    db.record_vault_deposit(reserve, 50_000, "Monthly reserve", day("2024-04-02"))
        .expect("Failed to deposit");

    let today = day("2024-04-20");
    let summary = db.dashboard_summary(today).expect("Failed to build dashboard");

    // Vault deposit is neither income nor expense
    assert_eq!(summary.month_income, 300_000);
    assert_eq!(summary.month_expense, 16_500);
    assert_eq!(summary.vault_total, 50_000);
    assert_eq!(summary.emergency_total, 50_000);

    let snapshot = db
        .period_snapshot(Period::Month.window(today))
        .expect("Failed to build snapshot");
    assert_eq!(snapshot.distribution.len(), 1);
    assert_eq!(snapshot.distribution[0].name, "Food");
    assert_eq!(snapshot.distribution[0].amount, 16_500);
    assert_eq!(snapshot.top_expenses[0].description, "Groceries");
}

#[test]
fn test_vault_withdrawal_cannot_overdraw() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let fund = category(&db, "Index Fund", Nature::Expense, VaultKind::Investment);

    db.record_movement(&MovementRequest {
        amount: 20_000,
        description: "Buy".to_string(),
        category_id: Some(fund),
        date: day("2024-04-01"),
        operation: Operation::Deposit,
    })
    .expect("Failed to deposit");

    let first = db.record_vault_withdrawal(fund, 15_000, "Sell", day("2024-04-05"));
    assert!(first.is_ok());

    let second = db.record_vault_withdrawal(fund, 15_000, "Sell again", day("2024-04-06"));
    assert!(matches!(
        second,
        Err(Error::InsufficientVaultBalance {
            available: 5_000,
            requested: 15_000
        })
    ));
    assert_eq!(db.vault_balance(fund).expect("balance"), 5_000);
}

#[test]
fn test_concurrent_withdrawals_never_overdraw() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let reserve = category(&db, "Reserve", Nature::Expense, VaultKind::Emergency);
    db.record_vault_deposit(reserve, 10_000, "Seed", day("2024-04-01"))
        .expect("Failed to deposit");

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let db = db.clone();
            std::thread::spawn(move || {
                db.record_vault_withdrawal(reserve, 4_000, &format!("Out {}", i), day("2024-04-02"))
                    .is_ok()
            })
        })
        .collect();
    let succeeded = handles
        .into_iter()
        .map(|h| h.join().expect("thread panicked"))
        .filter(|ok| *ok)
        .count();

    assert_eq!(succeeded, 2);
    assert_eq!(db.vault_balance(reserve).expect("balance"), 2_000);
}

// =============================================================================
// Recurring Rule Tests
// =============================================================================

#[test]
fn test_recurring_month_cycle() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let salary = category(&db, "Salary", Nature::Income, VaultKind::None);

    let rent = db
        .create_recurring_rule(&NewRecurringRule {
            description: "Rent".to_string(),
            amount: 90_000,
            day_of_month: 5,
            category_id: None,
            process_automatically: false,
        })
        .expect("Failed to create rule");
    db.create_recurring_rule(&NewRecurringRule {
        description: "Pay".to_string(),
        amount: 300_000,
        day_of_month: 1,
        category_id: Some(salary),
        process_automatically: true,
    })
    .expect("Failed to create rule");

    let today = day("2024-04-10");
    let created = db.process_automatic_rules(today).expect("Failed to process");
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].amount, 300_000);

    let projections = db.recurring_projections(today).expect("projections");
    let rent_state = projections
        .iter()
        .find(|p| p.rule.id == rent.id)
        .map(|p| p.state);
    assert_eq!(rent_state, Some(RuleState::Overdue));

    db.confirm_recurring_rule(rent.id, today)
        .expect("Failed to confirm");
    let projections = db.recurring_projections(today).expect("projections");
    assert!(projections.iter().all(|p| p.state == RuleState::Satisfied));

    // Next month both rules are open again
    let next = db
        .recurring_projections(day("2024-05-02"))
        .expect("projections");
    assert!(next.iter().all(|p| p.state != RuleState::Satisfied));
}

// =============================================================================
// Reports Tests
// =============================================================================

#[test]
fn test_insights_and_fire() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let salary = category(&db, "Salary", Nature::Income, VaultKind::None);
    let reserve = category(&db, "Reserve", Nature::Expense, VaultKind::Emergency);

    record(&db, 200_000, "Pay", Some(salary), "2024-03-01");
    record(&db, 50_000, "Rent", None, "2024-03-02");
    record(&db, 200_000, "Pay", Some(salary), "2024-04-01");
    record(&db, 150_000, "Rent", None, "2024-04-02");
    db.record_vault_deposit(reserve, 1_000_000, "Savings", day("2024-04-03"))
        .expect("Failed to deposit");

    let today = day("2024-04-15");
    let findings = db.insights(today).expect("insights");
    assert_eq!(findings[0].kind, InsightKind::SpendingAcceleration);

    let (params, projection) = db
        .fire_projection(&FireOverrides::default(), &FireParameters::default(), today)
        .expect("fire");
    assert_eq!(params.current_net_worth, 1_000_000);
    // 1500.00 × 12 / 4%
    assert_eq!(projection.fire_target, 45_000_000);
    assert_eq!(projection.wealth_curve[0].wealth, 1_000_000);
}

#[test]
fn test_export_csv() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let food = category(&db, "Food", Nature::Expense, VaultKind::None);
    record(&db, 1_250, "Lunch", Some(food), "2024-04-02");
    record(&db, 800, "Bus", None, "2024-04-01");

    let (categories, movements) = db.load_ledger().expect("ledger");
    let csv = movements_csv(&movements, &categories, &ExportOptions::default()).expect("csv");
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "id,date,description,amount,category,kind");
    assert!(lines[1].contains("Bus"));
    assert!(lines[2].ends_with("Lunch,-12.50,Food,expense"));
}
