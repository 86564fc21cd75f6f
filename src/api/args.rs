use clap::{Args, ValueEnum};
use serde::Deserialize;

use crate::core::{
    Duration, DurationUnit, GrowthInputs, RequiredYieldConfig, RequiredYieldInputs,
    RetirementInputs,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliDurationUnit {
    Months,
    Years,
}

impl From<CliDurationUnit> for DurationUnit {
    fn from(value: CliDurationUnit) -> Self {
        match value {
            CliDurationUnit::Months => DurationUnit::Months,
            CliDurationUnit::Years => DurationUnit::Years,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ApiDurationUnit {
    #[serde(alias = "month", alias = "meses", alias = "mes")]
    Months,
    #[serde(alias = "year", alias = "anos", alias = "ano")]
    Years,
}

impl From<ApiDurationUnit> for CliDurationUnit {
    fn from(value: ApiDurationUnit) -> Self {
        match value {
            ApiDurationUnit::Months => CliDurationUnit::Months,
            ApiDurationUnit::Years => CliDurationUnit::Years,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct GrowthArgs {
    #[arg(long, default_value_t = 10_000.0, help = "Amount invested up front")]
    pub initial_capital: f64,
    #[arg(long, default_value_t = 500.0, help = "Contribution at the end of every month")]
    pub monthly_contribution: f64,
    #[arg(long, default_value_t = 12.0, help = "Nominal annual rate in percent, e.g. 12")]
    pub annual_rate: f64,
    #[arg(long, default_value_t = 10)]
    pub duration: u32,
    #[arg(long, value_enum, default_value_t = CliDurationUnit::Years)]
    pub duration_unit: CliDurationUnit,
}

#[derive(Args, Debug, Clone)]
pub struct RetirementArgs {
    #[arg(long, default_value_t = 30)]
    pub current_age: u32,
    #[arg(long, default_value_t = 65, help = "Must be greater than --current-age")]
    pub retirement_age: u32,
    #[arg(long, default_value_t = 10_000.0)]
    pub initial_capital: f64,
    #[arg(long, default_value_t = 500.0)]
    pub monthly_contribution: f64,
    #[arg(long, default_value_t = 12.0, help = "Nominal annual rate in percent")]
    pub annual_rate: f64,
}

#[derive(Args, Debug, Clone)]
pub struct RequiredYieldArgs {
    #[arg(long, default_value_t = 1_000_000.0, help = "Value the investment must reach")]
    pub target_value: f64,
    #[arg(long, default_value_t = 10_000.0)]
    pub initial_capital: f64,
    #[arg(long, default_value_t = 500.0)]
    pub monthly_contribution: f64,
    #[arg(long, default_value_t = 10)]
    pub duration: u32,
    #[arg(long, value_enum, default_value_t = CliDurationUnit::Years)]
    pub duration_unit: CliDurationUnit,
    #[arg(
        long,
        default_value_t = 100.0,
        help = "Highest annual rate in percent the search will consider"
    )]
    pub search_max: f64,
    #[arg(
        long,
        default_value_t = 1e-4,
        help = "Search precision in percentage points"
    )]
    pub tolerance: f64,
    #[arg(long, default_value_t = 64)]
    pub max_iterations: u32,
}

pub fn default_growth_args() -> GrowthArgs {
    GrowthArgs {
        initial_capital: 10_000.0,
        monthly_contribution: 500.0,
        annual_rate: 12.0,
        duration: 10,
        duration_unit: CliDurationUnit::Years,
    }
}

pub fn default_retirement_args() -> RetirementArgs {
    RetirementArgs {
        current_age: 30,
        retirement_age: 65,
        initial_capital: 10_000.0,
        monthly_contribution: 500.0,
        annual_rate: 12.0,
    }
}

pub fn default_required_yield_args() -> RequiredYieldArgs {
    let config = RequiredYieldConfig::default();
    RequiredYieldArgs {
        target_value: 1_000_000.0,
        initial_capital: 10_000.0,
        monthly_contribution: 500.0,
        duration: 10,
        duration_unit: CliDurationUnit::Years,
        search_max: config.search_max,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
    }
}

fn duration_months(duration: u32, unit: CliDurationUnit) -> Result<u32, String> {
    Duration {
        value: duration,
        unit: unit.into(),
    }
    .months()
    .map_err(|e| format!("--duration: {e}"))
}

pub fn build_growth_inputs(args: &GrowthArgs) -> Result<GrowthInputs, String> {
    Ok(GrowthInputs {
        initial_capital: args.initial_capital,
        monthly_contribution: args.monthly_contribution,
        annual_rate: args.annual_rate,
        duration_months: duration_months(args.duration, args.duration_unit)?,
    })
}

pub fn build_retirement_inputs(args: &RetirementArgs) -> RetirementInputs {
    RetirementInputs {
        current_age: args.current_age,
        retirement_age: args.retirement_age,
        initial_capital: args.initial_capital,
        monthly_contribution: args.monthly_contribution,
        annual_rate: args.annual_rate,
    }
}

pub fn build_required_yield_request(
    args: &RequiredYieldArgs,
) -> Result<(RequiredYieldInputs, RequiredYieldConfig), String> {
    let inputs = RequiredYieldInputs {
        target_value: args.target_value,
        initial_capital: args.initial_capital,
        monthly_contribution: args.monthly_contribution,
        duration_months: duration_months(args.duration, args.duration_unit)?,
    };
    let config = RequiredYieldConfig {
        search_max: args.search_max,
        tolerance: args.tolerance,
        max_iterations: args.max_iterations,
        ..RequiredYieldConfig::default()
    };
    Ok((inputs, config))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct GrowthPayload {
    initial_capital: Option<f64>,
    monthly_contribution: Option<f64>,
    annual_rate: Option<f64>,
    duration: Option<u32>,
    duration_unit: Option<ApiDurationUnit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RetirementPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    initial_capital: Option<f64>,
    monthly_contribution: Option<f64>,
    annual_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RequiredYieldPayload {
    target_value: Option<f64>,
    initial_capital: Option<f64>,
    monthly_contribution: Option<f64>,
    duration: Option<u32>,
    duration_unit: Option<ApiDurationUnit>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
}

pub(crate) fn growth_args_from_payload(payload: GrowthPayload) -> GrowthArgs {
    let mut args = default_growth_args();
    if let Some(v) = payload.initial_capital {
        args.initial_capital = v;
    }
    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.annual_rate {
        args.annual_rate = v;
    }
    if let Some(v) = payload.duration {
        args.duration = v;
    }
    if let Some(v) = payload.duration_unit {
        args.duration_unit = v.into();
    }
    args
}

pub(crate) fn retirement_args_from_payload(payload: RetirementPayload) -> RetirementArgs {
    let mut args = default_retirement_args();
    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        args.retirement_age = v;
    }
    if let Some(v) = payload.initial_capital {
        args.initial_capital = v;
    }
    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.annual_rate {
        args.annual_rate = v;
    }
    args
}

pub(crate) fn required_yield_args_from_payload(payload: RequiredYieldPayload) -> RequiredYieldArgs {
    let mut args = default_required_yield_args();
    if let Some(v) = payload.target_value {
        args.target_value = v;
    }
    if let Some(v) = payload.initial_capital {
        args.initial_capital = v;
    }
    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.duration {
        args.duration = v;
    }
    if let Some(v) = payload.duration_unit {
        args.duration_unit = v.into();
    }
    if let Some(v) = payload.search_max {
        args.search_max = v;
    }
    if let Some(v) = payload.tolerance {
        args.tolerance = v;
    }
    if let Some(v) = payload.max_iterations {
        args.max_iterations = v;
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_payload_parses_web_keys_and_units() {
        let json = r#"{
          "initialCapital": 2500,
          "monthlyContribution": 150.5,
          "annualRate": 9.5,
          "duration": 18,
          "durationUnit": "meses"
        }"#;
        let payload = serde_json::from_str::<GrowthPayload>(json).expect("json should parse");
        let inputs = build_growth_inputs(&growth_args_from_payload(payload)).expect("valid inputs");
        assert_eq!(inputs.initial_capital, 2_500.0);
        assert_eq!(inputs.monthly_contribution, 150.5);
        assert_eq!(inputs.annual_rate, 9.5);
        assert_eq!(inputs.duration_months, 18);
    }

    #[test]
    fn empty_growth_payload_uses_calculator_defaults() {
        let payload = serde_json::from_str::<GrowthPayload>("{}").expect("json should parse");
        let inputs = build_growth_inputs(&growth_args_from_payload(payload)).expect("valid inputs");
        assert_eq!(inputs.initial_capital, 10_000.0);
        assert_eq!(inputs.duration_months, 120);
    }

    #[test]
    fn duration_in_years_overflowing_months_is_rejected() {
        let mut args = default_growth_args();
        args.duration = u32::MAX;
        let err = build_growth_inputs(&args).expect_err("must reject overflow");
        assert!(err.contains("--duration"));
    }

    #[test]
    fn retirement_payload_overrides_only_given_fields() {
        let json = r#"{ "currentAge": 40, "retirementAge": 60 }"#;
        let payload = serde_json::from_str::<RetirementPayload>(json).expect("json should parse");
        let inputs = build_retirement_inputs(&retirement_args_from_payload(payload));
        assert_eq!(inputs.current_age, 40);
        assert_eq!(inputs.retirement_age, 60);
        assert_eq!(inputs.monthly_contribution, 500.0);
    }

    #[test]
    fn required_yield_payload_maps_search_options() {
        let json = r#"{
          "targetValue": 250000,
          "duration": 60,
          "durationUnit": "months",
          "searchMax": 40,
          "tolerance": 0.01,
          "maxIterations": 12
        }"#;
        let payload =
            serde_json::from_str::<RequiredYieldPayload>(json).expect("json should parse");
        let (inputs, config) =
            build_required_yield_request(&required_yield_args_from_payload(payload))
                .expect("valid request");
        assert_eq!(inputs.target_value, 250_000.0);
        assert_eq!(inputs.duration_months, 60);
        assert_eq!(config.search_min, 0.0);
        assert_eq!(config.search_max, 40.0);
        assert_eq!(config.tolerance, 0.01);
        assert_eq!(config.max_iterations, 12);
    }

    #[test]
    fn unknown_duration_unit_is_a_parse_error() {
        let json = r#"{ "durationUnit": "weeks" }"#;
        assert!(serde_json::from_str::<GrowthPayload>(json).is_err());
    }
}
