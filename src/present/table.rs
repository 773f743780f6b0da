use tabled::{
    Table,
    builder::Builder,
    settings::{Alignment, Modify, object::Columns},
};

use super::format::{
    PLACEHOLDER, format_compact_currency, format_currency, format_integer, format_percent,
    format_ratio,
};
use crate::core::{Report, ViewMode};

pub fn render_report(report: &Report, view: ViewMode) -> String {
    let mut sections = vec![
        summary_table(report, view).to_string(),
        scenario_table(report, view).to_string(),
    ];
    if !report.warnings.is_empty() {
        let lines: Vec<String> = report
            .warnings
            .iter()
            .map(|w| format!("  - {w}"))
            .collect();
        sections.push(format!("Warnings:\n{}", lines.join("\n")));
    }
    sections.push(year_table(report, view).to_string());

    let mut out = sections.join("\n\n");
    out.push('\n');
    out
}

fn summary_table(report: &Report, view: ViewMode) -> Table {
    let totals = &report.totals;
    let invested_label = match view {
        ViewMode::Real => "Total invested (today's $)",
        ViewMode::Nominal => "Total invested (actual $)",
    };

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    builder.push_record([
        invested_label.to_string(),
        format!(
            "{} over {} years",
            format_currency(totals.invested(view)),
            format_integer(f64::from(report.inputs.years))
        ),
    ]);
    builder.push_record([
        "Average yearly increase".to_string(),
        format_currency(totals.average_yearly_increase(view)),
    ]);

    if let Some(start_year) = report.withdrawal.start_year {
        let depletion = match report.withdrawal.depletion_year {
            Some(year) => format!("depleted in year {year}"),
            None => "never depleted".to_string(),
        };
        builder.push_record([
            "Withdrawals".to_string(),
            format!(
                "{} a month from year {start_year}: {depletion}",
                format_currency(report.withdrawal.monthly_amount)
            ),
        ]);
    }

    Table::from(builder)
}

fn scenario_table(report: &Report, view: ViewMode) -> Table {
    let mut builder = Builder::default();
    builder.push_record([
        "Annual rate",
        "Final value",
        "Times increase",
        "Real monthly rate",
        "Depleted in year",
    ]);
    for scenario in report.enabled_scenarios() {
        builder.push_record([
            format_percent(scenario.annual_rate),
            format_currency(scenario.final_value(view)),
            format_ratio(scenario.times_increase(view)),
            format_percent(scenario.real_monthly_rate),
            scenario
                .depletion_year
                .map_or_else(|| PLACEHOLDER.to_string(), |year| year.to_string()),
        ]);
    }

    let mut table = Table::from(builder);
    table.with(Modify::new(Columns::new(1..)).with(Alignment::right()));
    table
}

fn year_table(report: &Report, view: ViewMode) -> Table {
    let enabled: Vec<usize> = report.enabled_scenarios().map(|s| s.index).collect();
    let with_withdrawals = report.withdrawal.start_year.is_some();

    let mut header = vec!["Year".to_string()];
    header.extend(
        enabled
            .iter()
            .map(|&idx| format_percent(report.scenarios[idx].annual_rate)),
    );
    if with_withdrawals {
        header.push("Withdrawn".to_string());
    }

    let mut builder = Builder::default();
    builder.push_record(header);
    for row in &report.projections {
        let values = row.values(view);
        let mut record = vec![row.year.to_string()];
        record.extend(
            enabled
                .iter()
                .map(|&idx| format_compact_currency(values[idx])),
        );
        if with_withdrawals {
            record.push(format_compact_currency(row.withdrawn(view)));
        }
        builder.push_record(record);
    }

    let mut table = Table::from(builder);
    table.with(Modify::new(Columns::new(1..)).with(Alignment::right()));
    table
}
