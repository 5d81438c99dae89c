//! Display formatting utilities for CLI output

use chrono::{DateTime, Utc};
use colored::*;
use console::{measure_text_width, truncate_str};
use serde_json::Value;

use crate::normalize::Table;
use crate::record::value_text;
use crate::stats::Summary;

/// Widest a table cell may grow before it is truncated
const MAX_CELL_WIDTH: usize = 32;
/// Width of the longest bar in a breakdown
const BAR_WIDTH: usize = 30;

/// Highlight every case-insensitive occurrence of `needle` in `text`
pub fn highlight_match(text: &str, needle: &str) -> String {
  let haystack = text.to_lowercase();
  let needle = needle.to_lowercase();
  // Byte offsets from the lowercased copy only line up when lowercasing kept lengths
  if needle.is_empty() || haystack.len() != text.len() {
    return text.to_string();
  }

  let mut highlighted = String::with_capacity(text.len());
  let mut end = 0;
  for (start, _) in haystack.match_indices(&needle) {
    highlighted.push_str(&text[end..start]);
    end = start + needle.len();
    highlighted.push_str(&text[start..end].yellow().bold().to_string());
  }
  highlighted.push_str(&text[end..]);
  highlighted
}

/// Text of one cell; the relevance score reads as a percentage
pub fn format_cell(column: &str, value: &Value) -> String {
  match value_text(value) {
    Some(text) if column == "Score" => format!("{text}%"),
    Some(text) => text.replace('\n', " "),
    None => String::new(),
  }
}

/// Render a table as aligned text lines, header first.
///
/// `company` highlights the matching part of each company name.
pub fn render_table(table: &Table, limit: Option<usize>, company: Option<&str>) -> Vec<String> {
  let shown = limit.map_or(table.rows.len(), |limit| limit.min(table.rows.len()));
  let cells: Vec<Vec<String>> = table.rows[..shown]
    .iter()
    .map(|row| {
      row
        .iter()
        .zip(&table.columns)
        .map(|(value, column)| {
          truncate_str(&format_cell(column, value), MAX_CELL_WIDTH, "…").into_owned()
        })
        .collect()
    })
    .collect();

  let widths: Vec<usize> = table
    .columns
    .iter()
    .enumerate()
    .map(|(i, column)| {
      cells
        .iter()
        .map(|row| measure_text_width(&row[i]))
        .chain([measure_text_width(column)])
        .max()
        .unwrap_or(0)
    })
    .collect();

  let company_column = table.column_index("Company");

  let mut lines = Vec::with_capacity(cells.len() + 1);
  let header: Vec<String> = table
    .columns
    .iter()
    .zip(&widths)
    .map(|(column, width)| pad(&column.bold().to_string(), *width))
    .collect();
  lines.push(header.join("  ").trim_end().to_string());

  for row in cells {
    let line: Vec<String> = row
      .iter()
      .enumerate()
      .map(|(i, cell)| {
        let text = match company {
          Some(needle) if Some(i) == company_column => highlight_match(cell, needle),
          _ => cell.clone(),
        };
        pad(&text, widths[i])
      })
      .collect();
    lines.push(line.join("  ").trim_end().to_string());
  }

  lines
}

/// Pad to a display width, ignoring ANSI escapes
fn pad(text: &str, width: usize) -> String {
  let visible = measure_text_width(text);
  format!("{text}{}", " ".repeat(width.saturating_sub(visible)))
}

/// Horizontal text bars for a value breakdown
pub fn render_bars(counts: &[(String, usize)]) -> Vec<String> {
  let max = counts.iter().map(|(_, count)| *count).max().unwrap_or(0);
  let label_width = counts.iter().map(|(label, _)| measure_text_width(label)).max().unwrap_or(0);

  counts
    .iter()
    .map(|(label, count)| {
      let length = if max == 0 { 0 } else { (count * BAR_WIDTH).div_ceil(max) };
      format!("{}  {} {count}", pad(label, label_width), "█".repeat(length).cyan())
    })
    .collect()
}

/// Stats strip as one line
pub fn render_summary(summary: &Summary) -> String {
  summary
    .entries()
    .iter()
    .map(|(label, value)| format!("{}: {}", label.dimmed(), value.to_string().bold()))
    .collect::<Vec<_>>()
    .join("   ")
}

/// When the shown snapshot was pulled from the service
pub fn render_fetched(fetched_at: DateTime<Utc>) -> String {
  format!("fetched {}", fetched_at.format("%Y-%m-%d %H:%M:%S UTC"))
}

/// Active filters as bracketed pills
pub fn render_pills(labels: &[String]) -> Option<String> {
  if labels.is_empty() {
    return None;
  }
  Some(labels.iter().map(|label| format!("[{}]", label.cyan())).collect::<Vec<_>>().join(" "))
}
