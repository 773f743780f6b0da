use thiserror::Error;

use super::format::format_percent;
use crate::core::{MonthTracePoint, Report, ViewMode};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer flush failed: {0}")]
    Flush(String),

    #[error("CSV output is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Flattens the projection table for the chosen view. Disabled scenarios are
/// left out; a withdrawn column is added when a withdrawal phase is set.
pub fn projection_csv(report: &Report, view: ViewMode) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    let view_label = view.label();

    let enabled: Vec<usize> = report.enabled_scenarios().map(|s| s.index).collect();
    let with_withdrawals = report.withdrawal.start_year.is_some();

    let mut header = vec!["Year".to_string()];
    for &idx in &enabled {
        let rate = format_percent(report.scenarios[idx].annual_rate);
        header.push(format!("{rate} ({view_label})"));
    }
    if with_withdrawals {
        header.push(format!("Withdrawn ({view_label})"));
    }
    wtr.write_record(&header)?;

    for row in &report.projections {
        let values = row.values(view);
        let mut record = vec![row.year.to_string()];
        record.extend(enabled.iter().map(|&idx| format!("{:.2}", values[idx])));
        if with_withdrawals {
            record.push(format!("{:.2}", row.withdrawn(view)));
        }
        wtr.write_record(&record)?;
    }

    finish(wtr)
}

pub fn month_trace_csv(trace: &[MonthTracePoint]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["Month", "Year", "Withdrawn", "Growth", "Contributed", "Balance"])?;
    for point in trace {
        wtr.write_record([
            point.month.to_string(),
            point.year().to_string(),
            format!("{:.2}", point.withdrawn),
            format!("{:.2}", point.growth),
            format!("{:.2}", point.contributed),
            format!("{:.2}", point.balance),
        ])?;
    }
    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::Flush(e.error().to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
