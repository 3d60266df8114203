//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use chrono::NaiveDate;
use cofre_core::db::Database;
use cofre_core::models::LedgerSettings;

use crate::commands::{self, truncate};

fn setup_test_db() -> Database {
    let db = Database::in_memory().unwrap();
    db.seed_default_categories().unwrap();
    db
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a longer description", 10), "a longe...");
    assert_eq!(truncate("café au lait", 7), "café...");
}

#[test]
fn test_resolve_category_by_id_and_name() {
    let db = setup_test_db();
    let food = commands::resolve_category(&db, "food").unwrap();
    assert_eq!(food.name, "Food");

    let by_id = commands::resolve_category(&db, &food.id.to_string()).unwrap();
    assert_eq!(by_id.id, food.id);

    let missing = commands::resolve_category(&db, "Yachts");
    assert!(missing.unwrap_err().to_string().contains("not found"));
}

#[test]
fn test_parse_helpers() {
    assert_eq!(commands::parse_money("12.50").unwrap(), 1_250);
    assert!(commands::parse_money("12.505").is_err());
    assert_eq!(
        commands::parse_date(Some("2024-02-29"), "--date").unwrap(),
        day("2024-02-29")
    );
    assert!(commands::parse_date(Some("29/02/2024"), "--date").is_err());
    assert_eq!(commands::parse_optional_date(None, "--from").unwrap(), None);
}

// ========== Init & Category Command Tests ==========

#[test]
fn test_cmd_init_seeds_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cofre.db");

    commands::cmd_init(&path).unwrap();
    commands::cmd_init(&path).unwrap();

    let db = commands::open_db(&path).unwrap();
    assert_eq!(db.list_categories().unwrap().len(), 8);
}

#[test]
fn test_cmd_categories_add_and_delete() {
    let db = setup_test_db();
    commands::cmd_categories_add(
        &db,
        "Pets",
        "expense",
        "none",
        Some("80"),
        Some("#ff0000".to_string()),
        None,
    )
    .unwrap();

    let pets = db.find_category_by_name("Pets").unwrap().unwrap();
    assert_eq!(pets.monthly_limit, 8_000);
    assert_eq!(pets.color, "#ff0000");

    commands::cmd_categories_delete(&db, "Pets").unwrap();
    assert!(db.find_category_by_name("Pets").unwrap().is_none());
}

#[test]
fn test_cmd_categories_add_invalid_vault_kind() {
    let db = setup_test_db();
    let result = commands::cmd_categories_add(&db, "Gold", "expense", "bullion", None, None, None);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Unknown vault kind"));
}

#[test]
fn test_cmd_categories_list_and_budgets() {
    let db = setup_test_db();
    assert!(commands::cmd_categories_list(&db).is_ok());
    assert!(commands::cmd_categories_budgets(&db, day("2024-03-15")).is_ok());
}

// ========== Movement Command Tests ==========

#[test]
fn test_cmd_add_normalizes_sign() {
    let db = setup_test_db();
    commands::cmd_add(&db, "-2500", "Pay", Some("Salary"), Some("2024-03-01")).unwrap();
    commands::cmd_add(&db, "12.50", "Lunch", Some("Food"), Some("2024-03-02")).unwrap();
    commands::cmd_add(&db, "3", "Parking", None, Some("2024-03-03")).unwrap();

    let movements = db.all_movements().unwrap();
    let amounts: Vec<i64> = movements.iter().map(|m| m.amount).collect();
    assert_eq!(amounts, vec![250_000, -1_250, -300]);

    // Every write is audited
    let audit = db.list_audit_log(10).unwrap();
    assert_eq!(audit.iter().filter(|e| e.action == "create").count(), 3);
}

#[test]
fn test_cmd_add_on_vault_category_fails() {
    let db = setup_test_db();
    let result = commands::cmd_add(&db, "10", "Sneaky", Some("Emergency Fund"), None);
    assert!(result.is_err());
    assert!(db.all_movements().unwrap().is_empty());
}

#[test]
fn test_cmd_movements_list_and_delete() {
    let db = setup_test_db();
    assert!(commands::cmd_movements_list(&db, 20, None, None, None).is_ok());

    commands::cmd_add(&db, "12.50", "Lunch", Some("Food"), Some("2024-03-02")).unwrap();
    let id = db.all_movements().unwrap()[0].id;

    assert!(commands::cmd_movements_list(&db, 20, Some("2024-03-01"), None, Some("Food")).is_ok());
    commands::cmd_movements_delete(&db, id).unwrap();
    assert!(db.get_movement(id).unwrap().is_none());

    let result = commands::cmd_movements_delete(&db, id);
    assert!(result.unwrap_err().to_string().contains("not found"));
}

// ========== Vault Command Tests ==========

#[test]
fn test_cmd_vault_deposit_and_withdraw() {
    let db = setup_test_db();
    commands::cmd_vault_deposit(&db, "Emergency Fund", "500", "Top up", Some("2024-03-01"))
        .unwrap();
    commands::cmd_vault_withdraw(&db, "Emergency Fund", "200", "Repair", Some("2024-03-02"))
        .unwrap();

    let fund = db.find_category_by_name("Emergency Fund").unwrap().unwrap();
    assert_eq!(db.vault_balance(fund.id).unwrap(), 30_000);
    assert!(commands::cmd_vault_status(&db).is_ok());
}

#[test]
fn test_cmd_vault_withdraw_over_balance() {
    let db = setup_test_db();
    commands::cmd_vault_deposit(&db, "Investments", "100", "Buy", Some("2024-03-01")).unwrap();

    let result = commands::cmd_vault_withdraw(&db, "Investments", "100.01", "Sell", None);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Insufficient vault balance"));
    assert_eq!(db.all_movements().unwrap().len(), 1);
}

// ========== Recurring Command Tests ==========

#[test]
fn test_cmd_recurring_lifecycle() {
    let db = setup_test_db();
    let today = day("2024-05-15");

    commands::cmd_recurring_add(&db, "Gym", "30", 10, None, false).unwrap();
    let rule = &db.list_recurring_rules().unwrap()[0];
    assert_eq!(rule.amount, -3_000);
    assert!(commands::cmd_recurring_list(&db, today).is_ok());

    commands::cmd_recurring_confirm(&db, rule.id, today).unwrap();
    assert!(commands::cmd_recurring_confirm(&db, rule.id, today).is_err());

    commands::cmd_recurring_set_active(&db, rule.id, false).unwrap();
    assert!(!db.get_recurring_rule(rule.id).unwrap().active);
    commands::cmd_recurring_set_active(&db, rule.id, true).unwrap();

    commands::cmd_recurring_delete(&db, rule.id).unwrap();
    assert!(db.list_recurring_rules().unwrap().is_empty());
}

#[test]
fn test_cmd_recurring_process() {
    let db = setup_test_db();
    commands::cmd_recurring_add(&db, "Netflix", "12.99", 3, Some("Leisure"), true).unwrap();

    let today = day("2024-05-10");
    commands::cmd_recurring_process(&db, today).unwrap();
    commands::cmd_recurring_process(&db, today).unwrap();

    let movements = db.all_movements().unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].date, day("2024-05-03"));
}

#[test]
fn test_cmd_recurring_add_invalid_day() {
    let db = setup_test_db();
    assert!(commands::cmd_recurring_add(&db, "Rent", "900", 32, None, false).is_err());
}

// ========== Goal Command Tests ==========

#[test]
fn test_cmd_goals_lifecycle() {
    let db = setup_test_db();
    let today = day("2024-05-15");
    assert!(commands::cmd_goals_list(&db, today).is_ok());

    commands::cmd_goals_add(&db, "Trip", "3000", "2024-11-30", Some("500")).unwrap();
    let goal = &db.list_goals().unwrap()[0];
    assert_eq!(goal.target_amount, 300_000);
    assert_eq!(goal.current_amount, 50_000);

    commands::cmd_goals_contribute(&db, goal.id, "250.50", today).unwrap();
    commands::cmd_goals_contribute(&db, goal.id, "-0.50", today).unwrap();
    assert_eq!(db.get_goal(goal.id).unwrap().current_amount, 75_000);
    assert!(commands::cmd_goals_contribute(&db, goal.id, "-5000", today).is_err());

    commands::cmd_goals_update(&db, goal.id, None, Some("4000"), None, Some("2025-01-31")).unwrap();
    let updated = db.get_goal(goal.id).unwrap();
    assert_eq!(updated.target_amount, 400_000);
    assert_eq!(updated.target_date, day("2025-01-31"));
    assert!(commands::cmd_goals_list(&db, today).is_ok());

    commands::cmd_goals_delete(&db, goal.id).unwrap();
    assert!(db.list_goals().unwrap().is_empty());

    let audit = db.list_audit_log(10).unwrap();
    assert_eq!(audit.len(), 5);
    assert!(audit.iter().all(|e| e.actor == "cli"));
}

#[test]
fn test_cmd_goals_add_invalid_input() {
    let db = setup_test_db();
    assert!(commands::cmd_goals_add(&db, "Car", "0", "2025-01-01", None).is_err());
    assert!(commands::cmd_goals_add(&db, "Car", "1000", "01/01/2025", None).is_err());
    assert!(commands::cmd_goals_delete(&db, 42).is_err());
    assert!(db.list_goals().unwrap().is_empty());
}

// ========== Report Command Tests ==========

#[test]
fn test_cmd_reports_empty() {
    let db = setup_test_db();
    let today = day("2024-03-15");
    assert!(commands::cmd_report(&db, "30D", today, false).is_ok());
    assert!(commands::cmd_dashboard(&db, today, false).is_ok());
    assert!(commands::cmd_insights(&db, today).is_ok());
}

#[test]
fn test_cmd_reports_with_data() {
    let db = setup_test_db();
    commands::cmd_add(&db, "2000", "Pay", Some("Salary"), Some("2024-03-01")).unwrap();
    commands::cmd_add(&db, "1500", "Rent", Some("Housing"), Some("2024-03-02")).unwrap();

    let today = day("2024-03-15");
    for period in ["7D", "30D", "90D", "12M", "all"] {
        assert!(commands::cmd_report(&db, period, today, false).is_ok());
    }
    assert!(commands::cmd_report(&db, "30D", today, true).is_ok());
    assert!(commands::cmd_dashboard(&db, today, true).is_ok());
}

#[test]
fn test_cmd_report_invalid_period() {
    let db = setup_test_db();
    let result = commands::cmd_report(&db, "2W", day("2024-03-15"), false);
    assert!(result.unwrap_err().to_string().contains("Unknown period"));
}

#[test]
fn test_cmd_fire() {
    let db = setup_test_db();
    commands::cmd_add(&db, "2000", "Pay", Some("Salary"), Some("2024-03-01")).unwrap();
    commands::cmd_add(&db, "1500", "Rent", Some("Housing"), Some("2024-03-02")).unwrap();

    let settings = cofre_core::config::Settings::default();
    let overrides = commands::fire_overrides(Some(5.0), None, Some(35), Some("10000")).unwrap();
    assert_eq!(overrides.current_net_worth, Some(1_000_000));
    assert!(commands::cmd_fire(&db, &settings, &overrides, day("2024-03-15"), false).is_ok());

    let invalid = commands::fire_overrides(None, Some(0.0), None, None).unwrap();
    assert!(commands::cmd_fire(&db, &settings, &invalid, day("2024-03-15"), true).is_err());
}

// ========== Export & Settings Command Tests ==========

#[test]
fn test_cmd_export_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("movements.csv");

    let db = setup_test_db();
    commands::cmd_add(&db, "12.50", "EXPORT TEST", Some("Food"), Some("2024-03-02")).unwrap();
    commands::cmd_add(&db, "1", "Too early", None, Some("2024-01-02")).unwrap();

    commands::cmd_export(&db, Some(output_path.clone()), Some("2024-03-01"), None).unwrap();

    let contents = std::fs::read_to_string(&output_path).unwrap();
    assert!(contents.starts_with("id,date,description,amount,category,kind"));
    assert!(contents.contains("EXPORT TEST,-12.50,Food,expense"));
    assert!(!contents.contains("Too early"));
}

#[test]
fn test_cmd_settings() {
    let db = setup_test_db();
    commands::cmd_settings(&db, Some("1200.50"), Some("brl")).unwrap();
    assert_eq!(
        db.get_ledger_settings().unwrap(),
        LedgerSettings {
            opening_balance: 120_050,
            currency: "BRL".to_string(),
        }
    );

    assert!(commands::cmd_settings(&db, None, Some("reais")).is_err());

    // Stored as plain key/value rows
    let conn = db.conn().unwrap();
    let value: String = conn
        .query_row(
            "SELECT value FROM settings WHERE key = 'opening_balance'",
            rusqlite::params![],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(value, "120050");
}
