use serde::Serialize;

use super::error::{ProjectionError, Result};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Months,
    Years,
}

/// A duration as typed into the calculator form, before conversion to months.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Duration {
    pub value: u32,
    pub unit: DurationUnit,
}

impl Duration {
    pub fn months(self) -> Result<u32> {
        match self.unit {
            DurationUnit::Months => Ok(self.value),
            DurationUnit::Years => self
                .value
                .checked_mul(12)
                .ok_or_else(|| ProjectionError::invalid("duration", "is too large")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthInputs {
    pub initial_capital: f64,
    pub monthly_contribution: f64,
    /// Nominal annual rate in percent (12 means 12%).
    pub annual_rate: f64,
    pub duration_months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthResult {
    pub final_value: f64,
    pub total_contributed: f64,
    pub total_interest_earned: f64,
    pub yield_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthYearResult {
    pub year: u32,
    pub month: u32,
    pub balance: f64,
    pub total_contributed: f64,
    pub total_interest_earned: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub initial_capital: f64,
    pub monthly_contribution: f64,
    pub annual_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementResult {
    pub duration_months: u32,
    #[serde(flatten)]
    pub growth: GrowthResult,
    pub withdrawal_rate: f64,
    pub monthly_income_estimate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredYieldInputs {
    pub target_value: f64,
    pub initial_capital: f64,
    pub monthly_contribution: f64,
    pub duration_months: u32,
}

/// Search bounds for the required-yield solver, in annual percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredYieldConfig {
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for RequiredYieldConfig {
    fn default() -> Self {
        Self {
            search_min: 0.0,
            search_max: 100.0,
            tolerance: 1e-4,
            max_iterations: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredYieldIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_rate: f64,
    pub final_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredYieldResult {
    pub required_annual_rate: f64,
    pub is_achievable: bool,
    /// Projected value at `required_annual_rate`; for an unreachable target this
    /// is the value at the highest rate tested.
    pub final_value: f64,
    pub converged: bool,
    pub iterations: Vec<RequiredYieldIteration>,
}
