use super::types::{Configuration, RawInput, SCENARIO_COUNT};

pub const MIN_YEARS: u32 = 1;
pub const MAX_YEARS: u32 = 60;

// Growth factors at or below zero have no monthly root.
pub const MIN_ANNUAL_RATE: f64 = -0.999_999;

pub const DEFAULT_INITIAL_INVESTMENT: f64 = 5_000.0;
pub const DEFAULT_MONTHLY_INVESTMENT: f64 = 300.0;
pub const DEFAULT_YEARS: u32 = 30;
pub const DEFAULT_MONTHLY_WITHDRAWAL: f64 = 0.0;
pub const DEFAULT_INFLATION_RATE: f64 = 0.02;
pub const DEFAULT_RATES: [f64; SCENARIO_COUNT] = [0.05, 0.10, 0.15, 0.20];

/// Coerces arbitrary input into a valid [`Configuration`]. Never fails.
pub fn normalize(raw: &RawInput) -> Configuration {
    let years = finite_or(raw.years, f64::from(DEFAULT_YEARS))
        .round()
        .clamp(f64::from(MIN_YEARS), f64::from(MAX_YEARS)) as u32;

    let mut rates = DEFAULT_RATES;
    let mut enabled_rates = [true; SCENARIO_COUNT];
    for idx in 0..SCENARIO_COUNT {
        let raw_rate = raw
            .rates
            .as_ref()
            .and_then(|list| list.get(idx).copied().flatten());
        rates[idx] = clamp_rate(finite_or(raw_rate, DEFAULT_RATES[idx]));

        if let Some(flag) = raw
            .enabled_rates
            .as_ref()
            .and_then(|list| list.get(idx).copied().flatten())
        {
            enabled_rates[idx] = flag;
        }
    }
    if !enabled_rates.iter().any(|&enabled| enabled) {
        enabled_rates[0] = true;
    }

    Configuration {
        initial_investment: finite_or(raw.initial_investment, DEFAULT_INITIAL_INVESTMENT).max(0.0),
        monthly_investment: finite_or(raw.monthly_investment, DEFAULT_MONTHLY_INVESTMENT).max(0.0),
        years,
        contribution_years: optional_year(raw.contribution_years, 0, years),
        start_withdrawal_year: optional_year(raw.start_withdrawal_year, 1, years),
        monthly_withdrawal: finite_or(raw.monthly_withdrawal, DEFAULT_MONTHLY_WITHDRAWAL).max(0.0),
        inflation_rate: clamp_rate(finite_or(raw.inflation_rate, DEFAULT_INFLATION_RATE)),
        enabled_rates,
        rates,
    }
}

impl Default for Configuration {
    fn default() -> Self {
        normalize(&RawInput::default())
    }
}

fn finite_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(fallback)
}

fn clamp_rate(rate: f64) -> f64 {
    rate.max(MIN_ANNUAL_RATE)
}

// Missing stays unset: unset and 0 mean different things for these fields.
fn optional_year(value: Option<f64>, min: u32, max: u32) -> Option<u32> {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(f64::from(min), f64::from(max)) as u32)
}
