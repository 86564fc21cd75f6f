mod engine;
mod error;
mod format;
mod solver;
mod types;

pub use engine::{RETIREMENT_WITHDRAWAL_RATE, run_growth, run_growth_schedule, run_retirement};
pub use error::{ProjectionError, Result};
pub use format::{format_currency, format_percentage};
pub use solver::{
    MAX_SEARCH_RATE, MAX_SOLVER_ITERATIONS, MIN_SOLVER_TOLERANCE, solve_required_yield,
};
pub use types::{
    Duration, DurationUnit, GrowthInputs, GrowthResult, GrowthYearResult, RequiredYieldConfig,
    RequiredYieldInputs, RequiredYieldIteration, RequiredYieldResult, RetirementInputs,
    RetirementResult,
};
