//! Output formatting utilities

use console::style;
use tabled::builder::Builder;
use tabled::settings::{object::Columns, Alignment, Style};

use crate::cli::OutputFormat;
use crate::core::resolved::{format_pct, format_usd, Resolved};

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto => OutputFormat::Text,
        other => other,
    }
}

/// Money cell, red when negative, dimmed when unresolved
pub fn usd(value: Option<f64>) -> String {
    let text = format_usd(value);
    match value {
        None => style(text).dim().to_string(),
        Some(v) if v < 0.0 => style(text).red().to_string(),
        Some(_) => text,
    }
}

/// Percentage cell from a fraction
pub fn pct(value: Option<f64>) -> String {
    let text = format_pct(value);
    match value {
        None => style(text).dim().to_string(),
        Some(v) if v < 0.0 => style(text).red().to_string(),
        Some(_) => text,
    }
}

/// Money cell for a resolved amount
pub fn usd_resolved(value: &Resolved<f64>) -> String {
    usd(value.value().copied())
}

/// Labelled value line used by the text views
pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<22} {}", style(label).bold(), value);
}

/// Section heading
pub fn heading(title: &str) {
    println!();
    println!("{}", style(title).bold().underlined());
}

/// Horizontal rule
pub fn rule() {
    println!("{}", style("─".repeat(60)).dim());
}

/// Render rows as a rounded table, numeric columns right-aligned
pub fn table(header: &[&str], rows: Vec<Vec<String>>, right_aligned_from: usize) -> String {
    let mut builder = Builder::default();
    builder.push_record(header.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    if right_aligned_from < header.len() {
        table.modify(Columns::new(right_aligned_from..), Alignment::right());
    }
    table.to_string()
}
