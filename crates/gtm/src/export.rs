//! CSV and JSON export of a normalized table
//!
//! Both formats carry exactly the table's columns in table order.

use serde_json::Value;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::normalize::Table;
use crate::record::value_text;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
  Csv,
  Json,
}

impl ExportFormat {
  pub fn extension(self) -> &'static str {
    match self {
      ExportFormat::Csv => "csv",
      ExportFormat::Json => "json",
    }
  }

  /// `<collection>.<extension>`
  pub fn default_file_name(self, collection: &str) -> PathBuf {
    PathBuf::from(format!("{collection}.{}", self.extension()))
  }

  /// Render a table in this format
  pub fn render(self, table: &Table) -> Result<String> {
    match self {
      ExportFormat::Csv => to_csv(table),
      ExportFormat::Json => to_json(table),
    }
  }
}

impl fmt::Display for ExportFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.extension())
  }
}

/// Write the header row and one row per record; null cells are empty
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
  let mut writer = csv::Writer::from_writer(writer);
  if table.columns.is_empty() {
    return Ok(());
  }

  writer.write_record(&table.columns)?;
  for row in &table.rows {
    writer.write_record(row.iter().map(cell_text))?;
  }
  writer.flush()?;
  Ok(())
}

pub fn to_csv(table: &Table) -> Result<String> {
  let mut buffer = Vec::new();
  write_csv(table, &mut buffer)?;
  Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Array of objects keyed by column name, nulls kept
pub fn to_json(table: &Table) -> Result<String> {
  Ok(serde_json::to_string(&table.to_records())?)
}

/// Render `table` and write it to `path`
pub fn export_to_path(table: &Table, format: ExportFormat, path: &Path) -> Result<()> {
  let content = format.render(table)?;
  std::fs::write(path, content)?;
  bentley::verbose!(&format!("Exported {} rows to {}", table.len(), path.display()));
  Ok(())
}

fn cell_text(value: &Value) -> String {
  value_text(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::normalize::normalize;
  use crate::record::record_from;
  use serde_json::json;
  use tempfile::TempDir;

  fn table() -> Table {
    normalize(&[
      record_from([("company_name", json!("Acme, Inc.")), ("relevance", json!(90))]),
      record_from([("company_name", json!("Globex")), ("notes", json!("said \"yes\""))]),
    ])
  }

  #[test]
  fn test_csv_quotes_and_blanks_nulls() {
    let csv = to_csv(&table()).unwrap();

    assert_eq!(
      csv,
      "Score,Company,Notes\n90,\"Acme, Inc.\",\n,Globex,\"said \"\"yes\"\"\"\n"
    );
  }

  #[test]
  fn test_json_keeps_column_order_and_nulls() {
    let json = to_json(&table()).unwrap();

    assert_eq!(
      json,
      r#"[{"Score":90,"Company":"Acme, Inc.","Notes":null},{"Score":null,"Company":"Globex","Notes":"said \"yes\""}]"#
    );
  }

  #[test]
  fn test_empty_table_exports() {
    assert_eq!(to_csv(&Table::default()).unwrap(), "");
    assert_eq!(to_json(&Table::default()).unwrap(), "[]");
  }

  #[test]
  fn test_export_to_path_and_default_names() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(ExportFormat::Csv.default_file_name("leads"));

    export_to_path(&table(), ExportFormat::Csv, &path).unwrap();

    assert!(path.ends_with("leads.csv"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("Score,Company,Notes\n"));
    assert_eq!(ExportFormat::Json.default_file_name("leads"), PathBuf::from("leads.json"));
  }
}
