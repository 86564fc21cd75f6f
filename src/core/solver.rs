use tracing::debug;

use super::engine::projected_value;
use super::error::{ProjectionError, Result, require_non_negative, require_positive};
use super::types::{
    RequiredYieldConfig, RequiredYieldInputs, RequiredYieldIteration, RequiredYieldResult,
};

/// Highest annual rate, in percent, the search may be asked to consider.
pub const MAX_SEARCH_RATE: f64 = 1_000.0;
pub const MAX_SOLVER_ITERATIONS: u32 = 1_000;
/// Finest precision, in percentage points, the search accepts.
pub const MIN_SOLVER_TOLERANCE: f64 = 1e-9;

/// Smallest annual rate (percent) at which the projection reaches `target_value`.
///
/// The projected value is monotonic in the rate, so the search bisects
/// `[search_min, search_max]` and always reports the upper bound: the result
/// reaches the target and is within `tolerance` of the smallest rate that does.
pub fn solve_required_yield(
    inputs: &RequiredYieldInputs,
    config: RequiredYieldConfig,
) -> Result<RequiredYieldResult> {
    validate_inputs(inputs)?;
    validate_config(config)?;

    let value_at = |annual_rate: f64| {
        projected_value(
            inputs.initial_capital,
            inputs.monthly_contribution,
            annual_rate,
            inputs.duration_months,
        )
    };
    // Overflow saturates to +inf, which reaches any finite target.
    let reaches = |value: f64| value >= inputs.target_value;

    let low_value = value_at(config.search_min);
    if !low_value.is_finite() {
        return Err(overflow_error());
    }
    if reaches(low_value) {
        debug!(
            rate = config.search_min,
            "target already reached at the lower search bound"
        );
        return Ok(RequiredYieldResult {
            required_annual_rate: config.search_min,
            is_achievable: true,
            final_value: low_value,
            converged: true,
            iterations: Vec::new(),
        });
    }

    let high_value = value_at(config.search_max);
    if inputs.duration_months == 0 || !reaches(high_value) {
        debug!(
            rate = config.search_max,
            final_value = high_value,
            "target unreachable within the search bounds"
        );
        return Ok(RequiredYieldResult {
            required_annual_rate: config.search_max,
            is_achievable: false,
            final_value: high_value,
            converged: false,
            iterations: Vec::new(),
        });
    }

    let mut iterations = Vec::with_capacity(config.max_iterations.min(64) as usize);
    let mut lo = config.search_min;
    let mut hi = config.search_max;
    let mut hi_value = high_value;
    let mut converged = false;
    let mut it = 0;
    while it < config.max_iterations {
        it += 1;
        let mid = (lo + hi) * 0.5;
        if mid <= lo || mid >= hi {
            // No representable rate left between the bounds.
            converged = true;
            break;
        }
        let mid_value = value_at(mid);
        iterations.push(RequiredYieldIteration {
            iteration: it,
            lower_bound: lo,
            upper_bound: hi,
            candidate_rate: mid,
            final_value: mid_value,
        });

        if reaches(mid_value) {
            hi = mid;
            hi_value = mid_value;
        } else {
            lo = mid;
        }

        if (hi - lo).abs() <= config.tolerance {
            converged = true;
            break;
        }
    }

    if !hi_value.is_finite() {
        return Err(overflow_error());
    }

    debug!(
        iterations = iterations.len(),
        converged,
        rate = hi,
        "required yield search finished"
    );

    Ok(RequiredYieldResult {
        required_annual_rate: hi,
        is_achievable: true,
        final_value: hi_value,
        converged,
        iterations,
    })
}

fn overflow_error() -> ProjectionError {
    ProjectionError::invalid(
        "durationMonths",
        "projection overflows within the search bounds",
    )
}

fn validate_inputs(inputs: &RequiredYieldInputs) -> Result<()> {
    require_positive("targetValue", inputs.target_value)?;
    require_non_negative("initialCapital", inputs.initial_capital)?;
    require_non_negative("monthlyContribution", inputs.monthly_contribution)?;
    Ok(())
}

fn validate_config(config: RequiredYieldConfig) -> Result<()> {
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err(ProjectionError::invalid("searchBounds", "must be finite"));
    }
    if config.search_min < 0.0 {
        return Err(ProjectionError::invalid("searchMin", "must be >= 0"));
    }
    if config.search_max > MAX_SEARCH_RATE {
        return Err(ProjectionError::invalid(
            "searchMax",
            format!("must be <= {MAX_SEARCH_RATE}"),
        ));
    }
    if config.search_max <= config.search_min {
        return Err(ProjectionError::invalid(
            "searchMax",
            "must be greater than searchMin",
        ));
    }
    if !config.tolerance.is_finite() || config.tolerance < MIN_SOLVER_TOLERANCE {
        return Err(ProjectionError::invalid(
            "tolerance",
            format!("must be >= {MIN_SOLVER_TOLERANCE}"),
        ));
    }
    if config.max_iterations == 0 || config.max_iterations > MAX_SOLVER_ITERATIONS {
        return Err(ProjectionError::invalid(
            "maxIterations",
            format!("must be between 1 and {MAX_SOLVER_ITERATIONS}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn inputs_for_target(target_value: f64) -> RequiredYieldInputs {
        RequiredYieldInputs {
            target_value,
            initial_capital: 10_000.0,
            monthly_contribution: 500.0,
            duration_months: 120,
        }
    }

    #[test]
    fn finds_rate_of_demo_scenario() {
        let target = projected_value(10_000.0, 500.0, 12.0, 120);
        let result =
            solve_required_yield(&inputs_for_target(target), RequiredYieldConfig::default())
                .expect("must solve");

        assert!(result.is_achievable);
        assert!(result.converged);
        assert_close(result.required_annual_rate, 12.0, 1e-3);
        assert!(result.final_value >= target);
        assert!(!result.iterations.is_empty());
        assert!(result.iterations.len() <= 64);
    }

    #[test]
    fn target_met_by_contributions_alone_needs_no_yield() {
        // 10000 + 500 * 120 = 70000 without any interest.
        let result =
            solve_required_yield(&inputs_for_target(70_000.0), RequiredYieldConfig::default())
                .expect("must solve");
        assert!(result.is_achievable);
        assert_eq!(result.required_annual_rate, 0.0);
        assert_eq!(result.final_value, 70_000.0);
        assert!(result.iterations.is_empty());
    }

    #[test]
    fn unreachable_target_reports_highest_tested_rate() {
        let config = RequiredYieldConfig::default();
        let result = solve_required_yield(&inputs_for_target(1e15), config).expect("must return");
        assert!(!result.is_achievable);
        assert_eq!(result.required_annual_rate, config.search_max);
        assert_close(
            result.final_value,
            projected_value(10_000.0, 500.0, config.search_max, 120),
            1e-6,
        );
    }

    #[test]
    fn zero_duration_depends_only_on_initial_capital() {
        let mut inputs = inputs_for_target(5_000.0);
        inputs.duration_months = 0;
        let met = solve_required_yield(&inputs, RequiredYieldConfig::default()).expect("must return");
        assert!(met.is_achievable);
        assert_eq!(met.required_annual_rate, 0.0);

        inputs.target_value = 20_000.0;
        let missed =
            solve_required_yield(&inputs, RequiredYieldConfig::default()).expect("must return");
        assert!(!missed.is_achievable);
        assert_eq!(missed.final_value, 10_000.0);
    }

    #[test]
    fn iteration_cap_still_returns_sufficient_rate() {
        let target = projected_value(10_000.0, 500.0, 7.3, 120);
        let config = RequiredYieldConfig {
            max_iterations: 3,
            ..RequiredYieldConfig::default()
        };
        let result = solve_required_yield(&inputs_for_target(target), config).expect("must solve");
        assert!(result.is_achievable);
        assert!(!result.converged);
        assert_eq!(result.iterations.len(), 3);
        assert!(result.final_value >= target);
        assert!(result.required_annual_rate >= 7.3);
    }

    #[test]
    fn rejects_invalid_target_and_config() {
        let err = solve_required_yield(&inputs_for_target(0.0), RequiredYieldConfig::default())
            .expect_err("zero target must fail");
        assert!(err.to_string().contains("targetValue"));

        let bad_configs = [
            RequiredYieldConfig {
                search_min: 10.0,
                search_max: 5.0,
                ..RequiredYieldConfig::default()
            },
            RequiredYieldConfig {
                search_min: -1.0,
                ..RequiredYieldConfig::default()
            },
            RequiredYieldConfig {
                tolerance: 0.0,
                ..RequiredYieldConfig::default()
            },
            RequiredYieldConfig {
                max_iterations: 0,
                ..RequiredYieldConfig::default()
            },
            RequiredYieldConfig {
                search_max: f64::INFINITY,
                ..RequiredYieldConfig::default()
            },
        ];
        for config in bad_configs {
            assert!(
                solve_required_yield(&inputs_for_target(100_000.0), config).is_err(),
                "config {config:?} must be rejected"
            );
        }
    }

    #[test]
    fn oversized_search_configs_are_rejected() {
        let bad_configs = [
            RequiredYieldConfig {
                max_iterations: 4_000_000_000,
                ..RequiredYieldConfig::default()
            },
            RequiredYieldConfig {
                max_iterations: MAX_SOLVER_ITERATIONS + 1,
                ..RequiredYieldConfig::default()
            },
            RequiredYieldConfig {
                tolerance: 1e-300,
                ..RequiredYieldConfig::default()
            },
            RequiredYieldConfig {
                search_max: 1e6,
                ..RequiredYieldConfig::default()
            },
        ];
        for config in bad_configs {
            assert!(
                solve_required_yield(&inputs_for_target(100_000.0), config).is_err(),
                "config {config:?} must be rejected"
            );
        }
    }

    #[test]
    fn finest_tolerance_stops_well_before_iteration_cap() {
        let target = projected_value(10_000.0, 500.0, 12.0, 120);
        let config = RequiredYieldConfig {
            tolerance: MIN_SOLVER_TOLERANCE,
            max_iterations: MAX_SOLVER_ITERATIONS,
            ..RequiredYieldConfig::default()
        };
        let result = solve_required_yield(&inputs_for_target(target), config).expect("must solve");
        assert!(result.converged);
        assert!(result.iterations.len() <= 64);
        assert_close(result.required_annual_rate, 12.0, 1e-6);
    }

    #[test]
    fn overflowing_upper_bound_still_counts_as_reaching_target() {
        let inputs = RequiredYieldInputs {
            target_value: 10_000_000.0,
            initial_capital: 0.0,
            monthly_contribution: 100.0,
            duration_months: 6_000,
        };
        assert_eq!(
            projected_value(0.0, 100.0, MAX_SEARCH_RATE, 6_000),
            f64::INFINITY
        );

        let wide = RequiredYieldConfig {
            search_max: MAX_SEARCH_RATE,
            ..RequiredYieldConfig::default()
        };
        let wide_result = solve_required_yield(&inputs, wide).expect("must solve");
        let narrow_result =
            solve_required_yield(&inputs, RequiredYieldConfig::default()).expect("must solve");

        assert!(wide_result.is_achievable);
        assert!(wide_result.final_value.is_finite());
        assert!(wide_result.final_value >= inputs.target_value);
        assert_close(
            wide_result.required_annual_rate,
            narrow_result.required_annual_rate,
            2.0 * wide.tolerance,
        );
    }

    #[test]
    fn iteration_cap_inside_overflow_region_is_rejected() {
        let inputs = RequiredYieldInputs {
            target_value: 10_000_000.0,
            initial_capital: 0.0,
            monthly_contribution: 100.0,
            duration_months: 6_000,
        };
        let config = RequiredYieldConfig {
            search_max: MAX_SEARCH_RATE,
            max_iterations: 1,
            ..RequiredYieldConfig::default()
        };
        // One halving leaves the upper bound at 500%, still infinite after 500 years.
        let err = solve_required_yield(&inputs, config).expect_err("non-finite result must fail");
        assert!(err.to_string().contains("durationMonths"));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_recovers_known_rate_within_scan_granularity(
            initial in 0u32..500_000,
            contribution in 1u32..20_000,
            rate_tenths in 1u32..600,
            months in 2u32..480
        ) {
            let rate = rate_tenths as f64 / 10.0;
            let target = projected_value(initial as f64, contribution as f64, rate, months);
            let inputs = RequiredYieldInputs {
                target_value: target,
                initial_capital: initial as f64,
                monthly_contribution: contribution as f64,
                duration_months: months,
            };
            let result = solve_required_yield(&inputs, RequiredYieldConfig::default())
                .expect("must solve");
            prop_assert!(result.is_achievable);
            prop_assert!(
                (result.required_annual_rate - rate).abs() <= 0.1,
                "expected ~{rate}, got {}",
                result.required_annual_rate
            );
            prop_assert!(result.final_value >= target);
        }
    }
}
