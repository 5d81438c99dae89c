//! Capability detection for a collection's records
//!
//! Collections do not share a schema, so the filters and statistics ask a
//! [`SchemaProfile`] which known fields exist instead of probing every record.

use crate::record::{fields, Record};

/// Which well-known fields a collection carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaProfile {
  pub has_category: bool,
  pub has_vector_db: bool,
  pub has_company: bool,
  pub has_industry: bool,
  /// `source_channel` when any record has it, else `source`, else none
  pub source_field: Option<&'static str>,
}

impl SchemaProfile {
  /// Detect capabilities from the union of all record fields
  pub fn detect(records: &[Record]) -> Self {
    let has = |field: &str| records.iter().any(|record| record.contains_key(field));

    let source_field = if has(fields::SOURCE_CHANNEL) {
      Some(fields::SOURCE_CHANNEL)
    } else if has(fields::SOURCE) {
      Some(fields::SOURCE)
    } else {
      None
    };

    Self {
      has_category: has(fields::CATEGORY),
      has_vector_db: has(fields::VECTOR_DB),
      has_company: has(fields::COMPANY),
      has_industry: has(fields::INDUSTRY),
      source_field,
    }
  }

  /// Whether `field` is usable for filtering and counting
  pub fn supports(&self, field: &str) -> bool {
    match field {
      fields::CATEGORY => self.has_category,
      fields::VECTOR_DB => self.has_vector_db,
      fields::COMPANY => self.has_company,
      fields::INDUSTRY => self.has_industry,
      other => self.source_field == Some(other),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::record_from;
  use serde_json::{json, Value};

  #[test]
  fn test_source_channel_preferred_over_source() {
    let records = vec![
      record_from([("source", json!("conference"))]),
      record_from([("source_channel", json!("youtube"))]),
    ];

    let profile = SchemaProfile::detect(&records);

    assert_eq!(profile.source_field, Some("source_channel"));
    assert!(profile.supports("source_channel"));
    assert!(!profile.supports("source"));
  }

  #[test]
  fn test_source_fallback_and_absence() {
    let with_source = SchemaProfile::detect(&[record_from([("source", json!("blog"))])]);
    assert_eq!(with_source.source_field, Some("source"));

    let without = SchemaProfile::detect(&[record_from([("notes", json!("n/a"))])]);
    assert_eq!(without.source_field, None);
  }

  #[test]
  fn test_detects_fields_present_in_any_record() {
    let records = vec![
      record_from([("company_name", json!("Acme"))]),
      record_from([("category", json!("customer")), ("industry", Value::Null)]),
    ];

    let profile = SchemaProfile::detect(&records);

    assert!(profile.has_company);
    assert!(profile.has_category);
    assert!(profile.has_industry);
    assert!(!profile.has_vector_db);
  }

  #[test]
  fn test_empty_collection_supports_nothing() {
    assert_eq!(SchemaProfile::detect(&[]), SchemaProfile::default());
  }
}
