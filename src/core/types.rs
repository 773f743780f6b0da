use serde::{Deserialize, Serialize};

use super::lenient;

pub const SCENARIO_COUNT: usize = 4;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Real,
    Nominal,
}

impl ViewMode {
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Real => "real",
            ViewMode::Nominal => "nominal",
        }
    }
}

// `None` means missing or malformed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawInput {
    #[serde(deserialize_with = "lenient::number")]
    pub initial_investment: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub monthly_investment: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub years: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub contribution_years: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub start_withdrawal_year: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub monthly_withdrawal: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub inflation_rate: Option<f64>,
    #[serde(deserialize_with = "lenient::flag_list")]
    pub enabled_rates: Option<Vec<Option<bool>>>,
    #[serde(deserialize_with = "lenient::number_list")]
    pub rates: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub initial_investment: f64,
    pub monthly_investment: f64,
    pub years: u32,
    pub contribution_years: Option<u32>,
    pub start_withdrawal_year: Option<u32>,
    pub monthly_withdrawal: f64,
    pub inflation_rate: f64,
    pub enabled_rates: [bool; SCENARIO_COUNT],
    pub rates: [f64; SCENARIO_COUNT],
}

impl Configuration {
    pub fn effective_contribution_years(&self) -> u32 {
        self.contribution_years.unwrap_or(self.years)
    }

    pub fn total_months(&self) -> u32 {
        self.years * 12
    }

    pub fn contribution_months(&self) -> u32 {
        self.effective_contribution_years() * 12
    }

    pub fn withdrawal_start_month(&self) -> Option<u32> {
        self.start_withdrawal_year
            .filter(|_| self.monthly_withdrawal > 0.0)
            .map(|year| year.saturating_sub(1) * 12 + 1)
    }
}

impl From<&Configuration> for RawInput {
    fn from(config: &Configuration) -> Self {
        RawInput {
            initial_investment: Some(config.initial_investment),
            monthly_investment: Some(config.monthly_investment),
            years: Some(f64::from(config.years)),
            contribution_years: config.contribution_years.map(f64::from),
            start_withdrawal_year: config.start_withdrawal_year.map(f64::from),
            monthly_withdrawal: Some(config.monthly_withdrawal),
            inflation_rate: Some(config.inflation_rate),
            enabled_rates: Some(config.enabled_rates.iter().map(|&e| Some(e)).collect()),
            rates: Some(config.rates.iter().map(|&r| Some(r)).collect()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyRow {
    pub year: u32,
    pub real_value: f64,
    pub nominal_value: f64,
    pub withdrawn_real: f64,
    pub withdrawn_nominal: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTracePoint {
    pub month: u32,
    pub withdrawn: f64,
    pub growth: f64,
    pub contributed: f64,
    pub balance: f64,
}

impl MonthTracePoint {
    pub fn year(&self) -> u32 {
        self.month.div_ceil(12)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRun {
    pub annual_rate: f64,
    pub monthly_real_rate: f64,
    pub monthly_nominal_rate: f64,
    pub rows: Vec<YearlyRow>,
    pub depletion_year: Option<u32>,
    pub total_withdrawn_real: f64,
    pub total_withdrawn_nominal: f64,
}

impl ScenarioRun {
    pub fn final_row(&self) -> Option<&YearlyRow> {
        self.rows.last()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_invested_today: f64,
    pub total_invested_actual: f64,
    pub total_withdrawn_real: f64,
    pub total_withdrawn_nominal: f64,
    pub average_yearly_increase_real: f64,
    pub average_yearly_increase_nominal: f64,
}

impl Totals {
    pub fn invested(&self, view: ViewMode) -> f64 {
        match view {
            ViewMode::Real => self.total_invested_today,
            ViewMode::Nominal => self.total_invested_actual,
        }
    }

    pub fn average_yearly_increase(&self, view: ViewMode) -> f64 {
        match view {
            ViewMode::Real => self.average_yearly_increase_real,
            ViewMode::Nominal => self.average_yearly_increase_nominal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalSummary {
    pub start_year: Option<u32>,
    pub monthly_amount: f64,
    pub depletion_year: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub index: usize,
    pub annual_rate: f64,
    pub enabled: bool,
    pub real_monthly_rate: f64,
    pub nominal_monthly_rate: f64,
    pub final_value_real: f64,
    pub final_value_nominal: f64,
    // None when nothing was invested.
    pub times_increase_real: Option<f64>,
    pub times_increase_nominal: Option<f64>,
    pub depletion_year: Option<u32>,
    pub total_withdrawn_real: f64,
    pub total_withdrawn_nominal: f64,
}

impl ScenarioSummary {
    pub fn final_value(&self, view: ViewMode) -> f64 {
        match view {
            ViewMode::Real => self.final_value_real,
            ViewMode::Nominal => self.final_value_nominal,
        }
    }

    pub fn times_increase(&self, view: ViewMode) -> Option<f64> {
        match view {
            ViewMode::Real => self.times_increase_real,
            ViewMode::Nominal => self.times_increase_nominal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRow {
    pub year: u32,
    pub real_values: [f64; SCENARIO_COUNT],
    pub nominal_values: [f64; SCENARIO_COUNT],
    // max across scenarios
    pub withdrawn_real: f64,
    pub withdrawn_nominal: f64,
}

impl ProjectionRow {
    pub fn values(&self, view: ViewMode) -> &[f64; SCENARIO_COUNT] {
        match view {
            ViewMode::Real => &self.real_values,
            ViewMode::Nominal => &self.nominal_values,
        }
    }

    pub fn withdrawn(&self, view: ViewMode) -> f64 {
        match view {
            ViewMode::Real => self.withdrawn_real,
            ViewMode::Nominal => self.withdrawn_nominal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub inputs: Configuration,
    pub warnings: Vec<String>,
    pub totals: Totals,
    pub withdrawal: WithdrawalSummary,
    pub scenarios: Vec<ScenarioSummary>,
    pub projections: Vec<ProjectionRow>,
}

impl Report {
    pub fn enabled_scenarios(&self) -> impl Iterator<Item = &ScenarioSummary> {
        self.scenarios.iter().filter(|s| s.enabled)
    }
}
