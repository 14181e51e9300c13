use crate::core::{Breakdown, ProjectionResult};

const METRIC_LABEL_WIDTH: usize = 26;

/// Whole-unit amount with the currency symbol and comma thousands separators.
pub fn format_amount(value: f64, currency: &str) -> String {
    let rounded = value.round_ties_even();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{currency}{grouped}")
    } else {
        format!("{currency}{grouped}")
    }
}

pub fn render_report(result: &ProjectionResult, currency: &str, show_table: bool) -> String {
    let unit = match result.breakdown {
        Breakdown::Yearly => "year",
        Breakdown::Monthly => "month",
    };
    let plural = if result.periods.len() == 1 { "" } else { "s" };

    let mut lines = vec![
        format!(
            "SIP projection over {} {unit}{plural}",
            result.periods.len()
        ),
        String::new(),
        metric_line("Total Invested", result.total_invested, currency),
        metric_line("Final Returns", result.final_compounded_value, currency),
        metric_line(
            "Inflation Adjusted Value",
            result.final_inflation_adjusted_value,
            currency,
        ),
        String::new(),
        "Investment vs Returns".to_string(),
        metric_line("Total Invested", result.total_invested, currency),
        metric_line("Returns Gained", result.returns_gained(), currency),
        String::new(),
        "Lumpsum comparison (illustrative: total invested as one sum at time zero)".to_string(),
        metric_line(
            "Lumpsum Value",
            result.lumpsum_comparison_value,
            currency,
        ),
    ];

    if show_table {
        lines.push(String::new());
        lines.extend(render_table(result, currency));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn metric_line(label: &str, value: f64, currency: &str) -> String {
    format!(
        "  {label:<width$}{}",
        format_amount(value, currency),
        width = METRIC_LABEL_WIDTH
    )
}

fn render_table(result: &ProjectionResult, currency: &str) -> Vec<String> {
    let index_header = match result.breakdown {
        Breakdown::Yearly => "Year".to_string(),
        Breakdown::Monthly => "Month".to_string(),
    };
    let headers = [
        index_header,
        format!("Total Invested ({currency})"),
        format!("Future Value ({currency})"),
        format!("Value After Inflation ({currency})"),
    ];

    let rows: Vec<[String; 4]> = result
        .periods
        .iter()
        .map(|record| {
            [
                record.period_index.to_string(),
                format_amount(record.cumulative_invested, ""),
                format_amount(record.compounded_value, ""),
                format_amount(record.inflation_adjusted_value, ""),
            ]
        })
        .collect();

    let mut widths = headers.each_ref().map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[String; 4]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!("{}{cell}", " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_row(&headers));
    lines.extend(rows.iter().map(format_row));
    lines
}
