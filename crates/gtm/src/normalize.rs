//! Record normalization into a display table
//!
//! Records from one collection do not share a field set. The normalizer takes
//! the union of their fields, hides bookkeeping fields, renames the known ones
//! and puts the important columns first.

use serde_json::Value;
use std::collections::HashMap;

use crate::record::Record;

/// Column hiding, renaming and ordering rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPolicy {
  /// Raw fields never shown
  pub hidden: &'static [&'static str],
  /// Raw field name to display name
  pub display_names: &'static [(&'static str, &'static str)],
  /// Display names that lead the table, in this order
  pub priority: &'static [&'static str],
}

pub const DEFAULT_POLICY: ColumnPolicy = ColumnPolicy {
  hidden: &[
    "source_section",
    "added_at",
    "date_found",
    "updated_at",
    "last_verified_at",
    "source_url",
    "video_title",
    "context",
    "extracted_from",
    "added_date",
    "confidence",
    "selection_rationale",
  ],
  display_names: &[
    ("company_name", "Company"),
    ("category", "Type"),
    ("vector_db_used", "Vector DB"),
    ("source_channel", "Source"),
    ("source", "Source"),
    ("use_case", "Use Case"),
    ("industry", "Industry"),
    ("company_size", "Size"),
    ("notes", "Notes"),
    ("relevance", "Score"),
  ],
  priority: &["Score", "Company", "Type", "Vector DB", "Source", "Use Case", "Industry"],
};

impl Default for ColumnPolicy {
  fn default() -> Self {
    DEFAULT_POLICY
  }
}

/// Uniform tabular view of a record set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
  pub columns: Vec<String>,
  /// One row per record, one cell per column; missing fields are null
  pub rows: Vec<Vec<Value>>,
}

impl Table {
  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn column_index(&self, name: &str) -> Option<usize> {
    self.columns.iter().position(|column| column == name)
  }

  /// Rows as records keyed by display name, in column order
  pub fn to_records(&self) -> Vec<Record> {
    self
      .rows
      .iter()
      .map(|row| self.columns.iter().cloned().zip(row.iter().cloned()).collect())
      .collect()
  }
}

/// A display column and the raw fields feeding it, in first-seen order
struct Column<'a> {
  name: &'a str,
  sources: Vec<&'a str>,
}

impl ColumnPolicy {
  fn is_hidden(&self, field: &str) -> bool {
    self.hidden.contains(&field)
  }

  /// Display name for a raw field
  pub fn display_name<'a>(&self, field: &'a str) -> &'a str {
    self
      .display_names
      .iter()
      .find(|(raw, _)| *raw == field)
      .map_or(field, |(_, display)| *display)
  }

  /// Normalize records into a table.
  ///
  /// When several raw fields share a display name they fill one column, and
  /// each cell takes the first non-null of them.
  pub fn apply(&self, records: &[Record]) -> Table {
    let mut columns: Vec<Column> = Vec::new();
    let mut by_name: HashMap<&str, usize> = HashMap::new();

    for field in records.iter().flat_map(|record| record.keys()) {
      if self.is_hidden(field) {
        continue;
      }
      let name = self.display_name(field.as_str());
      let index = *by_name.entry(name).or_insert_with(|| {
        columns.push(Column { name, sources: Vec::new() });
        columns.len() - 1
      });
      let sources = &mut columns[index].sources;
      if !sources.contains(&field.as_str()) {
        sources.push(field.as_str());
      }
    }

    let mut ordered: Vec<&Column> = Vec::with_capacity(columns.len());
    for name in self.priority {
      if let Some(&index) = by_name.get(name) {
        ordered.push(&columns[index]);
      }
    }
    ordered.extend(columns.iter().filter(|column| !self.priority.contains(&column.name)));

    let rows = records
      .iter()
      .map(|record| {
        ordered
          .iter()
          .map(|column| {
            column
              .sources
              .iter()
              .filter_map(|field| record.get(*field))
              .find(|value| !value.is_null())
              .cloned()
              .unwrap_or(Value::Null)
          })
          .collect()
      })
      .collect();

    Table { columns: ordered.iter().map(|column| column.name.to_string()).collect(), rows }
  }
}

/// Normalize with the default column policy
pub fn normalize(records: &[Record]) -> Table {
  DEFAULT_POLICY.apply(records)
}
