//! Background processing of automatic recurring rules
//!
//! Enabled by `[scheduler] recurring_interval_mins` in the settings file
//! (0 disables it). Each tick records every automatic rule that is due or
//! overdue this month; rules already satisfied are left alone, so a tick
//! that finds nothing to do is a no-op.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::AppState;

/// Audit actor for scheduler writes
const SCHEDULER_ACTOR: &str = "scheduler";

/// Start the recurring scheduler as a background task
pub fn start_recurring_scheduler(state: Arc<AppState>, every: Duration) {
    info!(
        interval_secs = every.as_secs(),
        "Starting recurring rule scheduler"
    );

    tokio::spawn(async move {
        let mut ticker = interval(every);

        // Skip the first immediate tick - startup should not write to the ledger
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if let Err(e) = run_recurring_pass(&state, crate::today()).await {
                error!("Scheduled recurring run failed: {}", e);
            }
        }
    });
}

/// Process automatic rules once for `today`; returns how many movements were created
pub async fn run_recurring_pass(state: &AppState, today: NaiveDate) -> cofre_core::Result<usize> {
    let created = state.db.process_automatic_rules(today)?;
    if created.is_empty() {
        return Ok(0);
    }

    state.invalidate_cache().await;
    info!(count = created.len(), %today, "Recorded automatic recurring movements");

    let ids: Vec<String> = created.iter().map(|m| m.id.to_string()).collect();
    if let Err(e) = state.db.log_audit(
        SCHEDULER_ACTOR,
        "process",
        Some("recurring_rule"),
        None,
        Some(&format!("movement_ids={}", ids.join(","))),
    ) {
        warn!("Failed to log scheduled recurring run to audit: {}", e);
    }

    Ok(created.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cofre_core::models::NewRecurringRule;
    use cofre_core::{Database, Settings};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_recurring_pass_is_idempotent_within_a_month() {
        let db = Database::in_memory().unwrap();
        db.create_recurring_rule(&NewRecurringRule {
            description: "Streaming".to_string(),
            amount: 1_299,
            day_of_month: 3,
            category_id: None,
            process_automatically: true,
        })
        .unwrap();
        let state = AppState::new(db, Settings::default());

        assert_eq!(run_recurring_pass(&state, day("2024-05-10")).await.unwrap(), 1);
        assert_eq!(run_recurring_pass(&state, day("2024-05-20")).await.unwrap(), 0);
        // A new month opens the rule again
        assert_eq!(run_recurring_pass(&state, day("2024-06-04")).await.unwrap(), 1);

        let audit = state.db.list_audit_log(10).unwrap();
        assert_eq!(audit.len(), 2);
        assert!(audit.iter().all(|e| e.actor == "scheduler"));
    }

    #[tokio::test]
    async fn test_recurring_pass_drops_cached_snapshots() {
        let db = Database::in_memory().unwrap();
        db.create_recurring_rule(&NewRecurringRule {
            description: "Rent".to_string(),
            amount: 90_000,
            day_of_month: 1,
            category_id: None,
            process_automatically: true,
        })
        .unwrap();
        let state = AppState::new(db, Settings::default());
        state
            .cache
            .insert("dashboard".to_string(), serde_json::json!({"stale": true}))
            .await;
        let before = state.cache_generation();

        run_recurring_pass(&state, day("2024-05-02")).await.unwrap();
        assert!(state.cache.get("dashboard").await.is_none());
        assert!(state.cache_generation() > before);
    }

    #[tokio::test]
    async fn test_recurring_pass_skips_pending_and_manual_rules() {
        let db = Database::in_memory().unwrap();
        db.create_recurring_rule(&NewRecurringRule {
            description: "Later".to_string(),
            amount: 500,
            day_of_month: 25,
            category_id: None,
            process_automatically: true,
        })
        .unwrap();
        db.create_recurring_rule(&NewRecurringRule {
            description: "Manual".to_string(),
            amount: 500,
            day_of_month: 1,
            category_id: None,
            process_automatically: false,
        })
        .unwrap();
        let state = AppState::new(db, Settings::default());

        assert_eq!(run_recurring_pass(&state, day("2024-05-10")).await.unwrap(), 0);
        assert!(state.db.all_movements().unwrap().is_empty());
    }
}
