//! Recurring rule storage, confirmation and automatic processing

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::info;

use super::categories::category_on;
use super::movements::{all_movements, insert_movement};
use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Movement, NewRecurringRule, RecurringRule, RecurringRuleUpdate};
use crate::recurring::{
    confirm_rule, materialize, prepare_rule, project_rules, rules_to_auto_process,
    summarize_commitments, CommitmentSummary, Projection,
};

const RULE_COLUMNS: &str =
    "id, description, amount, day_of_month, category_id, active, process_automatically, created_at";

fn row_to_rule(row: &Row<'_>) -> rusqlite::Result<RecurringRule> {
    let created_at: String = row.get(7)?;
    Ok(RecurringRule {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        day_of_month: row.get(3)?,
        category_id: row.get(4)?,
        active: row.get(5)?,
        process_automatically: row.get(6)?,
        created_at: parse_datetime(&created_at),
    })
}

fn rule_on(conn: &Connection, id: i64) -> Result<RecurringRule> {
    conn.query_row(
        &format!("SELECT {} FROM recurring_rules WHERE id = ?", RULE_COLUMNS),
        params![id],
        row_to_rule,
    )
    .optional()?
    .ok_or_else(|| Error::NotFound(format!("recurring rule {}", id)))
}

fn rules_on(conn: &Connection) -> Result<Vec<RecurringRule>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM recurring_rules ORDER BY day_of_month, id",
        RULE_COLUMNS
    ))?;
    let rules = stmt
        .query_map([], row_to_rule)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rules)
}

impl Database {
    /// Validate, normalize and store a new rule
    pub fn create_recurring_rule(&self, new: &NewRecurringRule) -> Result<RecurringRule> {
        let conn = self.conn()?;
        let category = match new.category_id {
            Some(id) => Some(
                category_on(&conn, id)?
                    .ok_or_else(|| Error::NotFound(format!("category {}", id)))?,
            ),
            None => None,
        };
        let prepared = prepare_rule(new, category.as_ref())?;

        conn.execute(
            r#"
            INSERT INTO recurring_rules
                (description, amount, day_of_month, category_id, process_automatically)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                prepared.description,
                prepared.amount,
                prepared.day_of_month,
                prepared.category_id,
                prepared.process_automatically,
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!(id, description = %prepared.description, "Created recurring rule");
        rule_on(&conn, id)
    }

    /// All rules, active or not
    pub fn list_recurring_rules(&self) -> Result<Vec<RecurringRule>> {
        let conn = self.conn()?;
        rules_on(&conn)
    }

    pub fn get_recurring_rule(&self, id: i64) -> Result<RecurringRule> {
        let conn = self.conn()?;
        rule_on(&conn, id)
    }

    /// Apply a partial update; the amount is re-normalized against the (new) category
    pub fn update_recurring_rule(
        &self,
        id: i64,
        update: &RecurringRuleUpdate,
    ) -> Result<RecurringRule> {
        let conn = self.conn()?;
        let current = rule_on(&conn, id)?;

        let merged = NewRecurringRule {
            description: update
                .description
                .clone()
                .unwrap_or_else(|| current.description.clone()),
            amount: update.amount.unwrap_or(current.amount),
            day_of_month: update.day_of_month.unwrap_or(current.day_of_month),
            category_id: update.category_id.unwrap_or(current.category_id),
            process_automatically: update
                .process_automatically
                .unwrap_or(current.process_automatically),
        };
        let category = match merged.category_id {
            Some(cid) => Some(
                category_on(&conn, cid)?
                    .ok_or_else(|| Error::NotFound(format!("category {}", cid)))?,
            ),
            None => None,
        };
        let prepared = prepare_rule(&merged, category.as_ref())?;

        conn.execute(
            r#"
            UPDATE recurring_rules
            SET description = ?, amount = ?, day_of_month = ?, category_id = ?,
                active = ?, process_automatically = ?
            WHERE id = ?
            "#,
            params![
                prepared.description,
                prepared.amount,
                prepared.day_of_month,
                prepared.category_id,
                update.active.unwrap_or(current.active),
                prepared.process_automatically,
                id,
            ],
        )?;
        rule_on(&conn, id)
    }

    /// Pause or resume a rule
    pub fn set_recurring_rule_active(&self, id: i64, active: bool) -> Result<RecurringRule> {
        self.update_recurring_rule(
            id,
            &RecurringRuleUpdate {
                active: Some(active),
                ..Default::default()
            },
        )
    }

    pub fn delete_recurring_rule(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM recurring_rules WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("recurring rule {}", id)));
        }
        info!(id, "Deleted recurring rule");
        Ok(())
    }

    /// Active rules with their state on `today`
    pub fn recurring_projections(&self, today: NaiveDate) -> Result<Vec<Projection>> {
        let conn = self.conn()?;
        let rules = rules_on(&conn)?;
        let movements = all_movements(&conn)?;
        Ok(project_rules(&rules, &movements, today))
    }

    /// Monthly totals committed by active rules
    pub fn recurring_summary(&self) -> Result<CommitmentSummary> {
        let rules = self.list_recurring_rules()?;
        let categories = self.list_categories()?;
        Ok(summarize_commitments(&rules, &categories))
    }

    /// Record this month's movement for a due rule, dated `today`
    pub fn confirm_recurring_rule(&self, id: i64, today: NaiveDate) -> Result<Movement> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let rule = rule_on(&tx, id)?;
        let movements = all_movements(&tx)?;
        let new = confirm_rule(&rule, &movements, today)?;
        let movement = insert_movement(&tx, &new)?;
        tx.commit()?;

        info!(rule_id = id, movement_id = movement.id, "Confirmed recurring rule");
        Ok(movement)
    }

    /// Materialize every automatic rule that is due or past due this month
    ///
    /// Runs in one transaction; calling it again the same month creates
    /// nothing because the new movements satisfy their rules.
    pub fn process_automatic_rules(&self, today: NaiveDate) -> Result<Vec<Movement>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let rules = rules_on(&tx)?;
        let movements = all_movements(&tx)?;
        let projections = project_rules(&rules, &movements, today);

        let mut created = Vec::new();
        for projection in rules_to_auto_process(&projections) {
            created.push(insert_movement(&tx, &materialize(projection))?);
        }
        tx.commit()?;

        if !created.is_empty() {
            info!(count = created.len(), %today, "Processed automatic recurring rules");
        }
        Ok(created)
    }
}
