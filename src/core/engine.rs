use super::error::{ProjectionError, Result, require_non_negative};
use super::types::{
    GrowthInputs, GrowthResult, GrowthYearResult, RetirementInputs, RetirementResult,
};

/// Yearly share of the retirement pot assumed to be safely withdrawable.
pub const RETIREMENT_WITHDRAWAL_RATE: f64 = 0.04;

pub fn run_growth(inputs: &GrowthInputs) -> Result<GrowthResult> {
    validate_growth_inputs(inputs)?;
    growth_result(
        inputs.initial_capital,
        inputs.monthly_contribution,
        inputs.annual_rate,
        inputs.duration_months,
    )
}

/// Year-end balances of the same projection `run_growth` computes. A trailing
/// row covers a final partial year, so the last balance is always the final value.
pub fn run_growth_schedule(inputs: &GrowthInputs) -> Result<Vec<GrowthYearResult>> {
    validate_growth_inputs(inputs)?;

    let full_years = inputs.duration_months / 12;
    let mut months = (1..=full_years).map(|year| year * 12).collect::<Vec<_>>();
    if inputs.duration_months % 12 != 0 {
        months.push(inputs.duration_months);
    }

    months
        .into_iter()
        .enumerate()
        .map(|(idx, month)| {
            let growth = growth_result(
                inputs.initial_capital,
                inputs.monthly_contribution,
                inputs.annual_rate,
                month,
            )?;
            Ok(GrowthYearResult {
                year: idx as u32 + 1,
                month,
                balance: growth.final_value,
                total_contributed: growth.total_contributed,
                total_interest_earned: growth.total_interest_earned,
            })
        })
        .collect()
}

pub fn run_retirement(inputs: &RetirementInputs) -> Result<RetirementResult> {
    if inputs.retirement_age <= inputs.current_age {
        return Err(ProjectionError::invalid(
            "retirementAge",
            "must be greater than currentAge",
        ));
    }
    let duration_months = (inputs.retirement_age - inputs.current_age)
        .checked_mul(12)
        .ok_or_else(|| ProjectionError::invalid("retirementAge", "is too far in the future"))?;

    let growth = run_growth(&GrowthInputs {
        initial_capital: inputs.initial_capital,
        monthly_contribution: inputs.monthly_contribution,
        annual_rate: inputs.annual_rate,
        duration_months,
    })?;

    Ok(RetirementResult {
        duration_months,
        growth,
        withdrawal_rate: RETIREMENT_WITHDRAWAL_RATE,
        monthly_income_estimate: growth.final_value * RETIREMENT_WITHDRAWAL_RATE / 12.0,
    })
}

pub(crate) fn validate_growth_inputs(inputs: &GrowthInputs) -> Result<()> {
    require_non_negative("initialCapital", inputs.initial_capital)?;
    require_non_negative("monthlyContribution", inputs.monthly_contribution)?;
    require_non_negative("annualRate", inputs.annual_rate)?;
    Ok(())
}

pub(crate) fn growth_result(
    initial_capital: f64,
    monthly_contribution: f64,
    annual_rate: f64,
    duration_months: u32,
) -> Result<GrowthResult> {
    let final_value = projected_value(
        initial_capital,
        monthly_contribution,
        annual_rate,
        duration_months,
    );
    let total_contributed = initial_capital + monthly_contribution * duration_months as f64;
    let total_interest_earned = final_value - total_contributed;
    let yield_percentage = if total_contributed > 0.0 {
        total_interest_earned / total_contributed * 100.0
    } else {
        0.0
    };

    let finite = [
        final_value,
        total_contributed,
        total_interest_earned,
        yield_percentage,
    ]
    .iter()
    .all(|v| v.is_finite());
    if !finite {
        let field = if annual_rate > 0.0 {
            "annualRate"
        } else {
            "initialCapital"
        };
        return Err(ProjectionError::invalid(field, "projection overflows"));
    }

    Ok(GrowthResult {
        final_value,
        total_contributed,
        total_interest_earned,
        yield_percentage,
    })
}

/// Lump sum plus an end-of-month annuity, compounded monthly. Overflow
/// saturates to `+inf`, never NaN, so the value stays monotonic in the rate.
pub(crate) fn projected_value(
    initial_capital: f64,
    monthly_contribution: f64,
    annual_rate: f64,
    duration_months: u32,
) -> f64 {
    let months = duration_months as f64;
    let monthly_rate = annual_rate / 100.0 / 12.0;
    if monthly_rate == 0.0 {
        return initial_capital + monthly_contribution * months;
    }

    // (1 + r)^n - 1, kept accurate for small r.
    let growth_minus_one = (months * monthly_rate.ln_1p()).exp_m1();
    let capital = if initial_capital == 0.0 {
        0.0
    } else {
        initial_capital * (1.0 + growth_minus_one)
    };
    let contributions = if monthly_contribution == 0.0 {
        0.0
    } else {
        monthly_contribution * growth_minus_one / monthly_rate
    };
    capital + contributions
}
