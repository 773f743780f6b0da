pub const PLACEHOLDER: &str = "--";

const COMPACT_UNITS: [(f64, &str); 4] = [(1e3, "K"), (1e6, "M"), (1e9, "B"), (1e12, "T")];

pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let (sign, body) = grouped(value, 0, false);
    format!("{sign}${body}")
}

pub fn format_compact_currency(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }

    let abs = value.abs();
    let mut unit = COMPACT_UNITS.iter().rposition(|(scale, _)| abs >= *scale);
    loop {
        let scale = unit.map_or(1.0, |idx| COMPACT_UNITS[idx].0);
        let scaled = round_to(abs / scale, 1);
        let next = unit.map_or(0, |idx| idx + 1);
        if scaled >= 1000.0 && next < COMPACT_UNITS.len() {
            unit = Some(next);
            continue;
        }

        let suffix = unit.map_or("", |idx| COMPACT_UNITS[idx].1);
        let sign = if value < 0.0 && scaled > 0.0 { "-" } else { "" };
        let (_, body) = grouped(scaled, 1, true);
        return format!("{sign}${body}{suffix}");
    }
}

/// Fraction to percent: `0.0725` renders as `7.25%`.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let (sign, body) = grouped(value * 100.0, 2, true);
    format!("{sign}{body}%")
}

pub fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let (sign, body) = grouped(v, 2, false);
            format!("{sign}{body}x")
        }
        _ => PLACEHOLDER.to_string(),
    }
}

pub fn format_integer(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let (sign, body) = grouped(value, 0, false);
    format!("{sign}{body}")
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// Rounds half away from zero, groups the integer part with commas and
// returns the sign separately so callers can put a symbol after it.
fn grouped(value: f64, decimals: usize, trim_fraction: bool) -> (&'static str, String) {
    let rounded = round_to(value.abs(), decimals as i32);
    let sign = if value < 0.0 && rounded > 0.0 { "-" } else { "" };

    let text = format!("{rounded:.decimals$}");
    let (int_part, fraction) = match text.split_once('.') {
        Some((int_part, fraction)) => (int_part, fraction),
        None => (text.as_str(), ""),
    };
    let fraction = if trim_fraction {
        fraction.trim_end_matches('0')
    } else {
        fraction
    };

    let mut body = group_thousands(int_part);
    if !fraction.is_empty() {
        body.push('.');
        body.push_str(fraction);
    }
    (sign, body)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
