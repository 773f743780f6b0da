//! Query-string form of the inputs, as used in shareable links. Percentages
//! are stored multiplied by 100.

use std::collections::HashMap;

use crate::core::lenient::{parse_flag, parse_number};
use crate::core::{Configuration, RawInput, SCENARIO_COUNT, ViewMode};

use super::error::ApiError;

pub const VIEW_KEY: &str = "view";

pub fn raw_input_from_query(params: &HashMap<String, String>) -> RawInput {
    let number = |key: &str| params.get(key).and_then(|v| parse_number(v));
    let percent = |key: &str| number(key).map(|v| v / 100.0);

    let rates: Vec<Option<f64>> = (1..=SCENARIO_COUNT)
        .map(|i| percent(&format!("rate{i}")))
        .collect();
    let enabled: Vec<Option<bool>> = (1..=SCENARIO_COUNT)
        .map(|i| params.get(&format!("enabled{i}")).and_then(|v| parse_flag(v)))
        .collect();

    RawInput {
        initial_investment: number("initial"),
        monthly_investment: number("monthly"),
        years: number("years"),
        contribution_years: number("contributionYears"),
        start_withdrawal_year: number("withdrawalStart"),
        monthly_withdrawal: number("withdrawal"),
        inflation_rate: percent("inflation"),
        enabled_rates: Some(enabled),
        rates: Some(rates),
    }
}

pub fn view_from_query(params: &HashMap<String, String>) -> Result<ViewMode, ApiError> {
    match params.get(VIEW_KEY).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(ViewMode::Real),
        Some(v) if v.is_empty() || v == "real" => Ok(ViewMode::Real),
        Some(v) if v == "nominal" => Ok(ViewMode::Nominal),
        Some(v) => Err(ApiError::invalid(
            VIEW_KEY,
            format!("expected real or nominal, got {v:?}"),
        )),
    }
}

/// Serializes a configuration back to query form. Unset optional years are omitted.
pub fn encode_query(config: &Configuration) -> String {
    let mut pairs: Vec<(String, String)> = vec![
        ("initial".into(), encode_number(config.initial_investment)),
        ("monthly".into(), encode_number(config.monthly_investment)),
        ("years".into(), config.years.to_string()),
    ];
    if let Some(years) = config.contribution_years {
        pairs.push(("contributionYears".into(), years.to_string()));
    }
    if let Some(year) = config.start_withdrawal_year {
        pairs.push(("withdrawalStart".into(), year.to_string()));
    }
    pairs.push(("withdrawal".into(), encode_number(config.monthly_withdrawal)));
    pairs.push(("inflation".into(), encode_number(config.inflation_rate * 100.0)));
    for (idx, rate) in config.rates.iter().enumerate() {
        pairs.push((format!("rate{}", idx + 1), encode_number(rate * 100.0)));
    }
    for (idx, enabled) in config.enabled_rates.iter().enumerate() {
        let flag = if *enabled { "1" } else { "0" };
        pairs.push((format!("enabled{}", idx + 1), flag.to_string()));
    }

    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

// Six decimals hides float noise such as 7.000000000000001.
fn encode_number(value: f64) -> String {
    let scaled = value * 1e6;
    if !scaled.is_finite() {
        return format!("{value}");
    }
    let rounded = scaled.round() / 1e6;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn decode(query: &str) -> HashMap<String, String> {
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn percent_fields_are_divided_by_100() {
        let raw = raw_input_from_query(&params(&[
            ("inflation", "3"),
            ("rate1", "7.5"),
            ("rate4", "12"),
            ("initial", "1000"),
        ]));

        assert_eq!(raw.inflation_rate, Some(0.03));
        assert_eq!(raw.initial_investment, Some(1_000.0));
        let rates = raw.rates.expect("rates present");
        assert_eq!(rates[0], Some(0.075));
        assert_eq!(rates[1], None);
        assert_eq!(rates[3], Some(0.12));
    }

    #[test]
    fn empty_query_normalizes_to_defaults() {
        let raw = raw_input_from_query(&HashMap::new());
        assert_eq!(normalize(&raw), Configuration::default());
    }

    #[test]
    fn blank_optional_years_stay_unset() {
        let raw = raw_input_from_query(&params(&[
            ("contributionYears", ""),
            ("withdrawalStart", " "),
        ]));
        let config = normalize(&raw);
        assert_eq!(config.contribution_years, None);
        assert_eq!(config.start_withdrawal_year, None);
    }

    #[test]
    fn malformed_values_fall_back() {
        let raw = raw_input_from_query(&params(&[("years", "ten"), ("enabled2", "maybe")]));
        let config = normalize(&raw);
        assert_eq!(config.years, 30);
        assert!(config.enabled_rates[1]);
    }

    #[test]
    fn encode_then_decode_preserves_configuration() {
        let config = normalize(&RawInput {
            initial_investment: Some(12_345.67),
            years: Some(25.0),
            contribution_years: Some(0.0),
            start_withdrawal_year: Some(20.0),
            monthly_withdrawal: Some(1_500.0),
            inflation_rate: Some(0.07),
            enabled_rates: Some(vec![Some(true), Some(false), Some(true), Some(false)]),
            ..RawInput::default()
        });
        let query = encode_query(&config);

        assert!(query.contains("inflation=7&"));
        assert!(query.contains("contributionYears=0"));
        assert!(query.contains("enabled2=0"));

        let decoded = normalize(&raw_input_from_query(&decode(&query)));
        assert_eq!(decoded.years, config.years);
        assert_eq!(decoded.contribution_years, config.contribution_years);
        assert_eq!(decoded.start_withdrawal_year, config.start_withdrawal_year);
        assert_eq!(decoded.enabled_rates, config.enabled_rates);
        assert!((decoded.inflation_rate - config.inflation_rate).abs() < 1e-12);
        for (a, b) in decoded.rates.iter().zip(config.rates.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn huge_amounts_survive_encoding() {
        let config = normalize(&RawInput {
            initial_investment: Some(1e305),
            ..RawInput::default()
        });
        let query = encode_query(&config);
        assert!(!query.contains("inf"));

        let decoded = normalize(&raw_input_from_query(&decode(&query)));
        assert_eq!(decoded.initial_investment, 1e305);
    }

    #[test]
    fn unset_optional_years_are_omitted() {
        let query = encode_query(&Configuration::default());
        assert!(!query.contains("contributionYears"));
        assert!(!query.contains("withdrawalStart"));
    }

    #[test]
    fn view_parses_known_values_only() {
        assert_eq!(view_from_query(&HashMap::new()).ok(), Some(ViewMode::Real));
        assert_eq!(
            view_from_query(&params(&[("view", "Nominal")])).ok(),
            Some(ViewMode::Nominal)
        );
        assert!(view_from_query(&params(&[("view", "sideways")])).is_err());
    }
}
