//! Savings goal storage

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::info;

use super::{get_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::goals::{apply_contribution, overview, prepare_goal, GoalOverview};
use crate::models::{NewSavingsGoal, SavingsGoal, SavingsGoalUpdate};

const GOAL_COLUMNS: &str =
    "id, name, target_amount, current_amount, target_date, created_at, updated_at";

fn row_to_goal(row: &Row<'_>) -> rusqlite::Result<SavingsGoal> {
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    Ok(SavingsGoal {
        id: row.get(0)?,
        name: row.get(1)?,
        target_amount: row.get(2)?,
        current_amount: row.get(3)?,
        target_date: get_date(row, 4)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

fn goal_on(conn: &Connection, id: i64) -> Result<SavingsGoal> {
    conn.query_row(
        &format!("SELECT {} FROM savings_goals WHERE id = ?", GOAL_COLUMNS),
        params![id],
        row_to_goal,
    )
    .optional()?
    .ok_or_else(|| Error::NotFound(format!("savings goal {}", id)))
}

fn store_goal(conn: &Connection, id: i64, goal: &NewSavingsGoal) -> Result<()> {
    conn.execute(
        r#"
        UPDATE savings_goals
        SET name = ?, target_amount = ?, current_amount = ?, target_date = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
        params![
            goal.name,
            goal.target_amount,
            goal.current_amount,
            goal.target_date.format("%Y-%m-%d").to_string(),
            id,
        ],
    )?;
    Ok(())
}

impl Database {
    pub fn create_goal(&self, new: &NewSavingsGoal) -> Result<SavingsGoal> {
        let prepared = prepare_goal(new)?;
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO savings_goals (name, target_amount, current_amount, target_date)
            VALUES (?, ?, ?, ?)
            "#,
            params![
                prepared.name,
                prepared.target_amount,
                prepared.current_amount,
                prepared.target_date.format("%Y-%m-%d").to_string(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!(id, name = %prepared.name, target = prepared.target_amount, "Created savings goal");
        goal_on(&conn, id)
    }

    /// All goals, nearest target date first
    pub fn list_goals(&self) -> Result<Vec<SavingsGoal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM savings_goals ORDER BY target_date, id",
            GOAL_COLUMNS
        ))?;
        let goals = stmt
            .query_map([], row_to_goal)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(goals)
    }

    pub fn get_goal(&self, id: i64) -> Result<SavingsGoal> {
        let conn = self.conn()?;
        goal_on(&conn, id)
    }

    /// Apply a partial update; the merged goal is validated like a new one
    pub fn update_goal(&self, id: i64, update: &SavingsGoalUpdate) -> Result<SavingsGoal> {
        let conn = self.conn()?;
        let current = goal_on(&conn, id)?;

        let merged = prepare_goal(&NewSavingsGoal {
            name: update.name.clone().unwrap_or(current.name),
            target_amount: update.target_amount.unwrap_or(current.target_amount),
            current_amount: update.current_amount.unwrap_or(current.current_amount),
            target_date: update.target_date.unwrap_or(current.target_date),
        })?;
        store_goal(&conn, id, &merged)?;
        goal_on(&conn, id)
    }

    /// Add to (or, with a negative amount, take from) a goal's saved amount
    pub fn contribute_to_goal(&self, id: i64, amount: i64) -> Result<SavingsGoal> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let goal = goal_on(&tx, id)?;
        let saved = apply_contribution(&goal, amount)?;
        tx.execute(
            "UPDATE savings_goals SET current_amount = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            params![saved, id],
        )?;
        let goal = goal_on(&tx, id)?;
        tx.commit()?;

        info!(id, amount, saved, "Recorded goal contribution");
        Ok(goal)
    }

    pub fn delete_goal(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM savings_goals WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("savings goal {}", id)));
        }
        info!(id, "Deleted savings goal");
        Ok(())
    }

    /// Every goal with its progress on `today`
    pub fn goal_overviews(&self, today: NaiveDate) -> Result<Vec<GoalOverview>> {
        Ok(overview(self.list_goals()?, today))
    }
}
