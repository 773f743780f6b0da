//! Annual to monthly rate conversions. All geometric.

const TWELFTH: f64 = 1.0 / 12.0;

pub fn monthly_nominal_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(TWELFTH) - 1.0
}

pub fn monthly_inflation_rate(inflation_rate: f64) -> f64 {
    (1.0 + inflation_rate).powf(TWELFTH) - 1.0
}

/// Negative whenever inflation outpaces the annual return.
pub fn monthly_real_rate(annual_rate: f64, inflation_rate: f64) -> f64 {
    ((1.0 + annual_rate) / (1.0 + inflation_rate)).powf(TWELFTH) - 1.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyRates {
    pub real: f64,
    pub nominal: f64,
    pub inflation: f64,
}

impl MonthlyRates {
    pub fn for_scenario(annual_rate: f64, inflation_rate: f64) -> Self {
        Self {
            real: monthly_real_rate(annual_rate, inflation_rate),
            nominal: monthly_nominal_rate(annual_rate),
            inflation: monthly_inflation_rate(inflation_rate),
        }
    }
}
