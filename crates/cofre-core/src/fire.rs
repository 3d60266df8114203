//! Financial-independence projection
//!
//! Compounds current net worth year by year until it covers
//! `annual expense / withdrawal rate`. The result is an estimate: return,
//! savings and expenses are held constant for the whole horizon.

use serde::{Deserialize, Serialize};

use crate::aggregate::DashboardSummary;
use crate::error::{Error, Notice, Result};

/// Years simulated before giving up on reaching the target
pub const MAX_YEARS: u32 = 60;

/// Conventional retirement age used for `years_gained`
pub const RETIREMENT_AGE: u32 = 65;

/// Oldest accepted `current_age`
pub const MAX_AGE: u32 = 120;

/// User-tunable simulation assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireParameters {
    /// Annual return in percent
    pub expected_return: f64,
    /// Safe withdrawal rate in percent
    pub withdrawal_rate: f64,
    pub current_age: u32,
    /// Minor units
    pub current_net_worth: i64,
}

impl Default for FireParameters {
    fn default() -> Self {
        Self {
            expected_return: 7.0,
            withdrawal_rate: 4.0,
            current_age: 30,
            current_net_worth: 0,
        }
    }
}

/// Parameters a caller may leave out, filled from configured defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FireOverrides {
    pub expected_return: Option<f64>,
    pub withdrawal_rate: Option<f64>,
    pub current_age: Option<u32>,
    pub current_net_worth: Option<i64>,
}

impl FireOverrides {
    /// Resolve against `defaults`; net worth falls back to `inputs.net_worth`
    pub fn resolve(&self, defaults: &FireParameters, inputs: &FireInputs) -> FireParameters {
        FireParameters {
            expected_return: self.expected_return.unwrap_or(defaults.expected_return),
            withdrawal_rate: self.withdrawal_rate.unwrap_or(defaults.withdrawal_rate),
            current_age: self.current_age.unwrap_or(defaults.current_age),
            current_net_worth: self.current_net_worth.unwrap_or(inputs.net_worth),
        }
    }
}

/// One year of the wealth curve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WealthPoint {
    /// Years from now, 0 = today
    pub year: u32,
    pub age: u32,
    pub wealth: i64,
    pub target: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FireProjection {
    pub years_to_target: u32,
    pub target_age: u32,
    pub years_gained: u32,
    pub fire_target: i64,
    /// What the target pays out per month at the withdrawal rate
    pub perpetual_monthly_income: i64,
    pub reached: bool,
    pub wealth_curve: Vec<WealthPoint>,
    pub notices: Vec<Notice>,
}

/// Run the simulation
///
/// `monthly_savings` may be negative. An unreachable target is not an error:
/// the curve stops at [`MAX_YEARS`] and a `SimulationCapReached` notice is
/// attached.
pub fn simulate_fire(
    params: &FireParameters,
    monthly_savings: i64,
    monthly_expense: i64,
) -> Result<FireProjection> {
    if !params.withdrawal_rate.is_finite() || params.withdrawal_rate <= 0.0 {
        return Err(Error::InvalidData(format!(
            "withdrawal rate must be a positive percentage, got {}",
            params.withdrawal_rate
        )));
    }
    if !params.expected_return.is_finite() {
        return Err(Error::InvalidData(format!(
            "expected return must be finite, got {}",
            params.expected_return
        )));
    }
    if params.current_age > MAX_AGE {
        return Err(Error::InvalidData(format!(
            "current age must be at most {}, got {}",
            MAX_AGE, params.current_age
        )));
    }

    let rate = params.withdrawal_rate / 100.0;
    let growth = 1.0 + params.expected_return / 100.0;
    let annual_savings = monthly_savings as f64 * 12.0;
    let target = monthly_expense.abs() as f64 * 12.0 / rate;

    let point = |year: u32, wealth: f64| WealthPoint {
        year,
        age: params.current_age + year,
        wealth: wealth.round() as i64,
        target: target.round() as i64,
    };

    let mut wealth = params.current_net_worth as f64;
    let mut years = 0u32;
    let mut curve = Vec::new();

    while wealth < target && years < MAX_YEARS {
        curve.push(point(years, wealth));
        wealth = wealth * growth + annual_savings;
        years += 1;
    }
    curve.push(point(years, wealth));

    let reached = wealth >= target;
    let target_age = params.current_age + years;
    let mut notices = Vec::new();
    if !reached {
        notices.push(Notice::SimulationCapReached {
            years: MAX_YEARS,
            shortfall: (target - wealth).round() as i64,
        });
        tracing::debug!(target, wealth, "FIRE target not reached within horizon");
    }

    Ok(FireProjection {
        years_to_target: years,
        target_age,
        years_gained: RETIREMENT_AGE.saturating_sub(target_age),
        fire_target: target.round() as i64,
        perpetual_monthly_income: (target * rate / 12.0).round() as i64,
        reached,
        wealth_curve: curve,
        notices,
    })
}

/// Savings, expense and net worth taken from the current month
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FireInputs {
    pub monthly_savings: i64,
    pub monthly_expense: i64,
    pub net_worth: i64,
}

impl FireInputs {
    /// Net worth is the vault total; cash on hand is not assumed to be invested
    pub fn from_dashboard(summary: &DashboardSummary) -> Self {
        Self {
            monthly_savings: summary.month_income - summary.month_expense,
            monthly_expense: summary.month_expense,
            net_worth: summary.vault_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_and_perpetual_income() {
        let params = FireParameters::default();
        let projection = simulate_fire(&params, 100_000, 150_000).unwrap();
        // 1500.00 × 12 / 4%
        assert_eq!(projection.fire_target, 45_000_000);
        assert_eq!(projection.perpetual_monthly_income, 150_000);
    }

    #[test]
    fn test_curve_starts_at_year_zero_and_reaches_target() {
        let params = FireParameters {
            current_net_worth: 1_000_000,
            ..Default::default()
        };
        let projection = simulate_fire(&params, 100_000, 150_000).unwrap();
        assert!(projection.reached);
        assert!(projection.notices.is_empty());

        let first = &projection.wealth_curve[0];
        assert_eq!(first.year, 0);
        assert_eq!(first.age, 30);
        assert_eq!(first.wealth, 1_000_000);

        let last = projection.wealth_curve.last().unwrap();
        assert!(last.wealth >= projection.fire_target);
        assert_eq!(last.year, projection.years_to_target);
        assert_eq!(
            projection.wealth_curve.len() as u32,
            projection.years_to_target + 1
        );

        let penultimate = &projection.wealth_curve[projection.wealth_curve.len() - 2];
        assert!(penultimate.wealth < projection.fire_target);
    }

    #[test]
    fn test_first_year_compounding() {
        let params = FireParameters {
            expected_return: 10.0,
            current_net_worth: 1_000_000,
            ..Default::default()
        };
        let projection = simulate_fire(&params, 10_000, 1_000_000).unwrap();
        // 10_000.00 × 1.1 + 100.00 × 12
        assert_eq!(projection.wealth_curve[1].wealth, 1_220_000);
    }

    #[test]
    fn test_already_reached() {
        let params = FireParameters {
            current_net_worth: 100_000_000,
            current_age: 40,
            ..Default::default()
        };
        let projection = simulate_fire(&params, 0, 100_000).unwrap();
        assert!(projection.reached);
        assert_eq!(projection.years_to_target, 0);
        assert_eq!(projection.target_age, 40);
        assert_eq!(projection.years_gained, 25);
        assert_eq!(projection.wealth_curve.len(), 1);
    }

    #[test]
    fn test_unreachable_target_hits_cap() {
        let params = FireParameters {
            expected_return: 0.0,
            ..Default::default()
        };
        let projection = simulate_fire(&params, -10_000, 200_000).unwrap();
        assert!(!projection.reached);
        assert_eq!(projection.years_to_target, MAX_YEARS);
        assert_eq!(projection.wealth_curve.len() as u32, MAX_YEARS + 1);
        assert_eq!(projection.years_gained, 0);
        assert!(matches!(
            projection.notices[0],
            Notice::SimulationCapReached { years: MAX_YEARS, shortfall } if shortfall > 0
        ));
    }

    #[test]
    fn test_overrides_resolve() {
        let inputs = FireInputs {
            monthly_savings: 50_000,
            monthly_expense: 150_000,
            net_worth: 2_000_000,
        };
        let overrides = FireOverrides {
            withdrawal_rate: Some(3.5),
            ..Default::default()
        };
        let params = overrides.resolve(&FireParameters::default(), &inputs);
        assert_eq!(params.withdrawal_rate, 3.5);
        assert_eq!(params.expected_return, 7.0);
        assert_eq!(params.current_net_worth, 2_000_000);
    }

    #[test]
    fn test_invalid_withdrawal_rate() {
        for rate in [0.0, -4.0, f64::NAN, f64::INFINITY] {
            let params = FireParameters {
                withdrawal_rate: rate,
                ..Default::default()
            };
            assert!(matches!(
                simulate_fire(&params, 1, 1),
                Err(Error::InvalidData(_))
            ));
        }
    }

    #[test]
    fn test_out_of_range_age_rejected() {
        for age in [MAX_AGE + 1, u32::MAX - 5, u32::MAX] {
            let params = FireParameters {
                current_age: age,
                ..Default::default()
            };
            assert!(matches!(
                simulate_fire(&params, 50_000, 100_000),
                Err(Error::InvalidData(_))
            ));
        }

        let oldest = FireParameters {
            current_age: MAX_AGE,
            ..Default::default()
        };
        let projection = simulate_fire(&oldest, 0, 0).unwrap();
        assert_eq!(projection.target_age, MAX_AGE);
    }

    #[test]
    fn test_from_zero_net_worth_curve_rises_to_target() {
        let params = FireParameters {
            current_net_worth: 0,
            ..Default::default()
        };
        let projection = simulate_fire(&params, 50_000, 100_000).unwrap();
        // 1000.00 × 12 / 4%
        assert_eq!(projection.fire_target, 30_000_000);
        assert!(projection.reached);
        // 6000.00 a year at 7% needs 23 years to cover 300_000.00
        assert_eq!(projection.years_to_target, 23);
        assert_eq!(projection.target_age, 53);
        assert_eq!(projection.years_gained, 12);
        assert!(projection
            .wealth_curve
            .windows(2)
            .all(|pair| pair[1].wealth > pair[0].wealth));
    }

    #[test]
    fn test_no_savings_no_return_never_reaches_target() {
        let params = FireParameters {
            expected_return: 0.0,
            current_net_worth: 0,
            ..Default::default()
        };
        let projection = simulate_fire(&params, 0, 100_000).unwrap();
        assert!(!projection.reached);
        assert_eq!(projection.years_to_target, MAX_YEARS);
        assert!(!projection.wealth_curve.is_empty());
        assert!(projection.wealth_curve.iter().all(|p| p.wealth == 0));
        assert_eq!(
            projection.notices,
            vec![Notice::SimulationCapReached {
                years: MAX_YEARS,
                shortfall: 30_000_000,
            }]
        );
    }
}
