use super::engine::{BALANCE_EPSILON, simulate_scenario};
use super::rates::monthly_inflation_rate;
use super::types::{
    Configuration, ProjectionRow, Report, SCENARIO_COUNT, ScenarioRun, ScenarioSummary, Totals,
    WithdrawalSummary,
};

pub const NEGATIVE_REAL_RATE_WARNING: &str =
    "One or more real monthly rates are negative (inflation exceeds annual return).";

/// Builds the full report for a normalized configuration. Pure and deterministic.
pub fn compute_report(config: &Configuration) -> Report {
    let runs: [ScenarioRun; SCENARIO_COUNT] = config.rates.map(|rate| simulate_scenario(config, rate));

    let total_invested_today = total_invested_today(config);
    let total_invested_actual = total_invested_actual(config);

    let scenarios: Vec<ScenarioSummary> = runs
        .iter()
        .enumerate()
        .map(|(index, run)| {
            summarize_scenario(
                index,
                run,
                config.enabled_rates[index],
                total_invested_today,
                total_invested_actual,
            )
        })
        .collect();

    let best_real = best_enabled(&scenarios, |s| s.final_value_real);
    let best_nominal = best_enabled(&scenarios, |s| s.final_value_nominal);
    let years = f64::from(config.years);

    let totals = Totals {
        total_invested_today,
        total_invested_actual,
        total_withdrawn_real: runs
            .iter()
            .map(|r| r.total_withdrawn_real)
            .fold(0.0, f64::max),
        total_withdrawn_nominal: runs
            .iter()
            .map(|r| r.total_withdrawn_nominal)
            .fold(0.0, f64::max),
        average_yearly_increase_real: (best_real - total_invested_today) / years,
        average_yearly_increase_nominal: (best_nominal - total_invested_actual) / years,
    };

    let withdrawal = WithdrawalSummary {
        start_year: config.start_withdrawal_year,
        monthly_amount: config.monthly_withdrawal,
        depletion_year: runs.iter().filter_map(|r| r.depletion_year).min(),
    };

    let mut warnings = Vec::new();
    if runs.iter().any(|r| r.monthly_real_rate < 0.0) {
        warnings.push(NEGATIVE_REAL_RATE_WARNING.to_string());
    }
    if !warnings.is_empty() {
        tracing::debug!(?warnings, "projection produced warnings");
    }

    Report {
        inputs: config.clone(),
        warnings,
        totals,
        withdrawal,
        scenarios,
        projections: build_projection_rows(config, &runs),
    }
}

fn summarize_scenario(
    index: usize,
    run: &ScenarioRun,
    enabled: bool,
    invested_today: f64,
    invested_actual: f64,
) -> ScenarioSummary {
    let (final_value_real, final_value_nominal) = run
        .final_row()
        .map(|row| (row.real_value, row.nominal_value))
        .unwrap_or((0.0, 0.0));

    ScenarioSummary {
        index,
        annual_rate: run.annual_rate,
        enabled,
        real_monthly_rate: run.monthly_real_rate,
        nominal_monthly_rate: run.monthly_nominal_rate,
        final_value_real,
        final_value_nominal,
        times_increase_real: times_increase(final_value_real, invested_today),
        times_increase_nominal: times_increase(final_value_nominal, invested_actual),
        depletion_year: run.depletion_year,
        total_withdrawn_real: run.total_withdrawn_real,
        total_withdrawn_nominal: run.total_withdrawn_nominal,
    }
}

// Withdrawal columns collapse to the largest figure across scenarios.
fn build_projection_rows(
    config: &Configuration,
    runs: &[ScenarioRun; SCENARIO_COUNT],
) -> Vec<ProjectionRow> {
    (0..config.years as usize)
        .map(|idx| {
            let mut row = ProjectionRow {
                year: idx as u32 + 1,
                real_values: [0.0; SCENARIO_COUNT],
                nominal_values: [0.0; SCENARIO_COUNT],
                withdrawn_real: 0.0,
                withdrawn_nominal: 0.0,
            };
            for (scenario, run) in runs.iter().enumerate() {
                if let Some(yearly) = run.rows.get(idx) {
                    row.real_values[scenario] = yearly.real_value;
                    row.nominal_values[scenario] = yearly.nominal_value;
                    row.withdrawn_real = row.withdrawn_real.max(yearly.withdrawn_real);
                    row.withdrawn_nominal = row.withdrawn_nominal.max(yearly.withdrawn_nominal);
                }
            }
            row
        })
        .collect()
}

fn best_enabled(scenarios: &[ScenarioSummary], value: impl Fn(&ScenarioSummary) -> f64) -> f64 {
    scenarios
        .iter()
        .filter(|s| s.enabled)
        .map(value)
        .max_by(f64::total_cmp)
        .unwrap_or(0.0)
}

fn times_increase(final_value: f64, invested: f64) -> Option<f64> {
    (invested > 0.0).then(|| final_value / invested)
}

fn total_invested_today(config: &Configuration) -> f64 {
    config.initial_investment
        + config.monthly_investment * 12.0 * f64::from(config.effective_contribution_years())
}

/// Contributions grown by inflation: each month's deposit is in today's money.
fn total_invested_actual(config: &Configuration) -> f64 {
    let months = config.contribution_months();
    let inflation = monthly_inflation_rate(config.inflation_rate);
    let contributions = if inflation.abs() < BALANCE_EPSILON {
        config.monthly_investment * f64::from(months)
    } else {
        config.monthly_investment * (((1.0 + inflation).powi(months as i32) - 1.0) / inflation)
    };
    config.initial_investment + contributions
}
