mod engine;
pub mod lenient;
mod normalize;
mod rates;
mod report;
mod types;

pub use engine::{simulate_scenario, trace_scenario_months};
pub use normalize::{
    DEFAULT_INFLATION_RATE, DEFAULT_INITIAL_INVESTMENT, DEFAULT_MONTHLY_INVESTMENT,
    DEFAULT_MONTHLY_WITHDRAWAL, DEFAULT_RATES, DEFAULT_YEARS, MAX_YEARS, MIN_ANNUAL_RATE,
    MIN_YEARS, normalize,
};
pub use rates::{MonthlyRates, monthly_inflation_rate, monthly_nominal_rate, monthly_real_rate};
pub use report::{NEGATIVE_REAL_RATE_WARNING, compute_report};
pub use types::{
    Configuration, MonthTracePoint, ProjectionRow, RawInput, Report, SCENARIO_COUNT, ScenarioRun,
    ScenarioSummary, Totals, ViewMode, WithdrawalSummary, YearlyRow,
};
