//! Formatted terminal output for the `summary` and `sample` commands.
//!
//! We keep formatting code in one place so the aggregation and statistics
//! code stays free of presentation concerns.

use crate::aggregate::{LabeledTable, Totals, UserShare};
use crate::app::pipeline::{DashboardSnapshot, TableName, TrendLine};
use crate::domain::Record;
use crate::error::InsufficientData;
use crate::stats::CorrelationMatrix;

/// Format the full dashboard summary: KPIs, every table, correlation, trends.
pub fn format_summary(snapshot: &DashboardSnapshot, source: &str) -> String {
    let mut out = String::new();

    out.push_str("=== bike-dash - Bike Rental Dashboard ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!("Filter: {}\n\n", snapshot.filter.describe()));

    out.push_str(&format_kpis(&snapshot.totals, snapshot.user_share));
    out.push('\n');

    for name in TableName::ALL {
        out.push_str(&format!("{}:\n", name.title()));
        match snapshot.labeled(name) {
            Some(table) => out.push_str(&format_table(&table)),
            None => out.push_str(&format_correlation(&snapshot.correlation)),
        }
        out.push('\n');
    }

    out.push_str("Trends (OLS):\n");
    for trend in &snapshot.trends {
        out.push_str(&format_trend(trend));
    }
    out.push('\n');

    out.push_str("Insights:\n");
    for line in super::derive_insights(snapshot) {
        out.push_str(&format!("- {line}\n"));
    }

    out
}

/// Totals and the casual/registered split.
pub fn format_kpis(totals: &Totals, share: Option<UserShare>) -> String {
    let mut out = String::new();
    out.push_str(&format!("Records:      {}\n", fmt_count(totals.records as u64)));
    out.push_str(&format!("Total rides:  {}\n", fmt_count(totals.cnt)));
    out.push_str(&format!("Casual:       {}\n", fmt_count(totals.casual)));
    out.push_str(&format!("Registered:   {}\n", fmt_count(totals.registered)));
    match share {
        Some(s) => out.push_str(&format!(
            "User share:   casual {:.1}% | registered {:.1}%\n",
            s.casual * 100.0,
            s.registered * 100.0
        )),
        None => out.push_str("User share:   n/a\n"),
    }
    out
}

/// Fixed-width rendering of a labeled table.
pub fn format_table(table: &LabeledTable) -> String {
    if table.rows.is_empty() {
        return "  (no records)\n".to_string();
    }

    let mut header: Vec<String> = table.key_columns.clone();
    header.push("n".to_string());
    header.extend(table.measures.iter().map(|m| m.name().to_string()));

    let body: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            let mut cells = row.keys.clone();
            cells.push(row.records.to_string());
            cells.extend(row.values.iter().map(|v| format!("{v:.2}")));
            cells
        })
        .collect();

    let keys = table.key_columns.len();
    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            body.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(header[i].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&render_line(&header, &widths, keys));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&render_line(&rule, &widths, keys));
    for cells in &body {
        out.push_str(&render_line(cells, &widths, keys));
    }
    out
}

/// Key cells left-aligned, numbers right-aligned.
fn render_line(cells: &[String], widths: &[usize], keys: usize) -> String {
    let parts: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (c, &w))| if i < keys { format!("{c:<w$}") } else { format!("{c:>w$}") })
        .collect();
    format!("  {}\n", parts.join("  ").trim_end())
}

pub fn format_correlation(result: &Result<CorrelationMatrix, InsufficientData>) -> String {
    let m = match result {
        Ok(m) => m,
        Err(e) => return format!("  ({e})\n"),
    };

    let label_w = m.columns().iter().map(|c| c.len()).max().unwrap_or(0);
    let mut out = format!("  {:<label_w$}", "");
    for (i, _) in m.columns().iter().enumerate() {
        out.push_str(&format!(" {:>6}", format!("[{i}]")));
    }
    out.push('\n');
    for (i, (name, row)) in m.columns().iter().zip(m.values()).enumerate() {
        out.push_str(&format!("  {name:<label_w$}"));
        for v in row {
            out.push_str(&format!(" {:>6}", fmt_r(*v)));
        }
        out.push_str(&format!("  [{i}]\n"));
    }
    out.push_str(&format!("  (n = {})\n", fmt_count(m.records() as u64)));
    out
}

pub fn format_trend(trend: &TrendLine) -> String {
    match &trend.fit {
        Ok(fit) => format!(
            "  {} ~ {}: slope={:.3} intercept={:.3} R²={} n={}\n",
            fit.y,
            fit.x,
            fit.slope,
            fit.intercept,
            fmt_r(fit.r_squared),
            fit.n
        ),
        Err(e) => format!("  {} ~ {}: ({e})\n", trend.y, trend.x),
    }
}

/// The first `rows` records as a fixed-width listing.
pub fn format_sample(records: &[&Record], rows: usize) -> String {
    if records.is_empty() {
        return "(no records)\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<19} {:<8} {:<16} {:<16} {:>4} {:>6} {:>5} {:>7} {:>10} {:>6}\n",
        "datetime", "season", "weather", "workingday", "hour", "temp", "hum", "casual", "registered", "cnt"
    ));
    for r in records.iter().take(rows) {
        out.push_str(&format!(
            "{:<19} {:<8} {:<16} {:<16} {:>4} {:>6.1} {:>5.2} {:>7} {:>10} {:>6}\n",
            r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            truncate(&r.season_label, 8),
            truncate(&r.weathersit_label, 16),
            truncate(&r.workingday_label, 16),
            r.hour_of_day,
            r.temp_actual,
            r.hum_actual,
            r.casual,
            r.registered,
            r.cnt
        ));
    }
    if records.len() > rows {
        out.push_str(&format!("... {} more\n", fmt_count((records.len() - rows) as u64)));
    }
    out
}

/// `1234567` -> `1,234,567`.
pub fn fmt_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Coefficient with two decimals; `n/a` when undefined.
pub fn fmt_r(v: f64) -> String {
    if v.is_nan() { "n/a".to_string() } else { format!("{v:.2}") }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
