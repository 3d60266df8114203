//! Snapshots computed from the whole ledger

use chrono::NaiveDate;

use super::movements::all_movements;
use super::Database;
use crate::aggregate::{aggregate, budget_usage, dashboard, BudgetUsage, DashboardSummary, DateWindow, PeriodSnapshot};
use crate::error::Result;
use crate::fire::{simulate_fire, FireInputs, FireOverrides, FireParameters, FireProjection};
use crate::insights::{insights_for, Finding};
use crate::models::{Category, Movement};
use crate::normalize::tag_movements;

impl Database {
    /// Every category and movement, read from one connection
    pub fn load_ledger(&self) -> Result<(Vec<Category>, Vec<Movement>)> {
        let categories = self.list_categories()?;
        let conn = self.conn()?;
        let movements = all_movements(&conn)?;
        Ok((categories, movements))
    }

    /// Analytics snapshot for `window`
    pub fn period_snapshot(&self, window: DateWindow) -> Result<PeriodSnapshot> {
        let (categories, movements) = self.load_ledger()?;
        Ok(aggregate(&movements, &categories, window))
    }

    /// Dashboard for the month containing `today`
    pub fn dashboard_summary(&self, today: NaiveDate) -> Result<DashboardSummary> {
        let (categories, movements) = self.load_ledger()?;
        let settings = self.get_ledger_settings()?;
        Ok(dashboard(
            &movements,
            &categories,
            settings.opening_balance,
            today,
        ))
    }

    /// Budget usage for the month containing `month`
    pub fn budget_usage(&self, month: NaiveDate) -> Result<Vec<BudgetUsage>> {
        let (categories, movements) = self.load_ledger()?;
        let tagged = tag_movements(&movements, &categories);
        Ok(budget_usage(&tagged, &categories, month))
    }

    /// Month-over-month insights
    pub fn insights(&self, today: NaiveDate) -> Result<Vec<Finding>> {
        let (categories, movements) = self.load_ledger()?;
        Ok(insights_for(&movements, &categories, today))
    }

    /// FIRE projection from this month's savings and expense
    pub fn fire_projection(
        &self,
        overrides: &FireOverrides,
        defaults: &FireParameters,
        today: NaiveDate,
    ) -> Result<(FireParameters, FireProjection)> {
        let summary = self.dashboard_summary(today)?;
        let inputs = FireInputs::from_dashboard(&summary);
        let params = overrides.resolve(defaults, &inputs);
        let projection = simulate_fire(&params, inputs.monthly_savings, inputs.monthly_expense)?;
        Ok((params, projection))
    }
}
