use super::rates::MonthlyRates;
use super::types::{Configuration, MonthTracePoint, ScenarioRun, YearlyRow};

/// Balances below this are float noise and snap to zero.
pub(crate) const BALANCE_EPSILON: f64 = 1e-12;

#[derive(Debug)]
struct Ledger {
    balance: f64,
    withdrawn_real: f64,
    withdrawn_nominal: f64,
}

#[derive(Debug, Clone, Copy)]
struct WithdrawalPlan {
    start_month: u32,
    requested: f64,
}

impl WithdrawalPlan {
    fn from_config(config: &Configuration) -> Option<Self> {
        config.withdrawal_start_month().map(|start_month| Self {
            start_month,
            requested: round_cents(config.monthly_withdrawal),
        })
    }

    fn is_active(self, month: u32) -> bool {
        month >= self.start_month && self.requested > 0.0
    }
}

#[derive(Debug, Clone, Copy)]
struct WithdrawalOutcome {
    actual: f64,
    shortfall: bool,
}

pub fn simulate_scenario(config: &Configuration, annual_rate: f64) -> ScenarioRun {
    run_months(config, annual_rate, None)
}

/// Runs the same loop as [`simulate_scenario`] and returns every month.
pub fn trace_scenario_months(config: &Configuration, annual_rate: f64) -> Vec<MonthTracePoint> {
    let mut trace = Vec::with_capacity(config.total_months() as usize);
    run_months(config, annual_rate, Some(&mut trace));
    trace
}

fn run_months(
    config: &Configuration,
    annual_rate: f64,
    mut trace: Option<&mut Vec<MonthTracePoint>>,
) -> ScenarioRun {
    let rates = MonthlyRates::for_scenario(annual_rate, config.inflation_rate);
    let withdrawal = WithdrawalPlan::from_config(config);
    let contribution_months = config.contribution_months();
    let contribution = round_cents(config.monthly_investment);
    let annual_inflation_growth = 1.0 + config.inflation_rate;

    let mut ledger = Ledger {
        balance: round_cents(config.initial_investment),
        withdrawn_real: 0.0,
        withdrawn_nominal: 0.0,
    };
    let mut depletion_year = None;
    let mut rows = Vec::with_capacity(config.years as usize);

    for month in 1..=config.total_months() {
        ledger.balance = floor_dust(ledger.balance);

        let mut withdrawn = 0.0;
        if let Some(plan) = withdrawal.filter(|plan| plan.is_active(month)) {
            let inflation_factor = (1.0 + rates.inflation).powi(month as i32 - 1);
            let outcome = apply_withdrawal(&mut ledger, plan.requested, inflation_factor);
            withdrawn = outcome.actual;
            if outcome.shortfall && depletion_year.is_none() {
                depletion_year = Some(month.div_ceil(12));
            }
        }

        let growth = apply_growth(&mut ledger, rates.real);

        let mut contributed = 0.0;
        if month <= contribution_months {
            ledger.balance = round_cents(ledger.balance + contribution);
            contributed = contribution;
        }

        ledger.balance = floor_dust(ledger.balance);

        if let Some(trace) = trace.as_deref_mut() {
            trace.push(MonthTracePoint {
                month,
                withdrawn,
                growth,
                contributed,
                balance: ledger.balance,
            });
        }

        if month % 12 == 0 {
            let year = month / 12;
            rows.push(YearlyRow {
                year,
                real_value: ledger.balance,
                nominal_value: ledger.balance * annual_inflation_growth.powi(year as i32),
                withdrawn_real: ledger.withdrawn_real,
                withdrawn_nominal: ledger.withdrawn_nominal,
            });
        }
    }

    ScenarioRun {
        annual_rate,
        monthly_real_rate: rates.real,
        monthly_nominal_rate: rates.nominal,
        rows,
        depletion_year,
        total_withdrawn_real: ledger.withdrawn_real,
        total_withdrawn_nominal: ledger.withdrawn_nominal,
    }
}

fn apply_withdrawal(ledger: &mut Ledger, requested: f64, inflation_factor: f64) -> WithdrawalOutcome {
    let actual = round_cents(requested.min(ledger.balance.max(0.0)));
    ledger.balance = round_cents((ledger.balance - actual).max(0.0));
    ledger.withdrawn_real = round_cents(ledger.withdrawn_real + actual);
    ledger.withdrawn_nominal = round_cents(ledger.withdrawn_nominal + actual * inflation_factor);

    WithdrawalOutcome {
        actual,
        shortfall: requested - actual > BALANCE_EPSILON,
    }
}

fn apply_growth(ledger: &mut Ledger, monthly_real_rate: f64) -> f64 {
    let before = ledger.balance;
    ledger.balance = round_cents(before * (1.0 + monthly_real_rate));
    ledger.balance - before
}

fn floor_dust(balance: f64) -> f64 {
    if balance < BALANCE_EPSILON { 0.0 } else { balance }
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
