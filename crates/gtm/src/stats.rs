//! Summary counts, facet options and insight breakdowns

use std::collections::HashMap;

use crate::filter::Dimension;
use crate::record::{field_text, fields, Record};
use crate::schema::SchemaProfile;

const TOP_VECTOR_DBS: usize = 8;
const TOP_SOURCES: usize = 6;
const TOP_INDUSTRIES: usize = 6;

/// Distinct counts shown in the stats strip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
  pub records: usize,
  pub companies: usize,
  pub vector_dbs: usize,
  pub types: usize,
  pub sources: usize,
}

impl Summary {
  /// Count over `records`; fields the collection lacks count as zero
  pub fn compute(records: &[Record], profile: &SchemaProfile) -> Self {
    let distinct = |field: Option<&str>| field.map_or(0, |f| value_counts(records, f).len());
    let when = |present: bool, field: &'static str| present.then_some(field);

    Self {
      records: records.len(),
      companies: distinct(when(profile.has_company, fields::COMPANY)),
      vector_dbs: distinct(when(profile.has_vector_db, fields::VECTOR_DB)),
      types: distinct(when(profile.has_category, fields::CATEGORY)),
      sources: distinct(profile.source_field),
    }
  }

  /// `(label, value)` pairs in display order
  pub fn entries(&self) -> [(&'static str, usize); 5] {
    [
      ("Records", self.records),
      ("Companies", self.companies),
      ("Vector DBs", self.vector_dbs),
      ("Types", self.types),
      ("Sources", self.sources),
    ]
  }
}

/// Occurrences of each non-null value of `field`, most frequent first.
///
/// Ties keep the order in which the values first appear.
pub fn value_counts(records: &[Record], field: &str) -> Vec<(String, usize)> {
  let mut counts: Vec<(String, usize)> = Vec::new();
  let mut index: HashMap<String, usize> = HashMap::new();

  for value in records.iter().filter_map(|record| field_text(record, field)) {
    match index.get(&value) {
      Some(&i) => counts[i].1 += 1,
      None => {
        index.insert(value.clone(), counts.len());
        counts.push((value, 1));
      }
    }
  }

  counts.sort_by(|a, b| b.1.cmp(&a.1));
  counts
}

/// Selectable options for a filter dimension, labelled `value (count)`
pub fn facet_options(
  records: &[Record],
  profile: &SchemaProfile,
  dimension: Dimension,
) -> Vec<String> {
  match dimension.field(profile) {
    Some(field) => value_counts(records, field)
      .into_iter()
      .map(|(value, count)| format!("{value} ({count})"))
      .collect(),
    None => Vec::new(),
  }
}

/// Value part of a facet label; anything not ending in ` (<count>)` is returned as is
pub fn extract_value(label: &str) -> &str {
  match label.rsplit_once(" (") {
    Some((value, tail)) if is_count_suffix(tail) => value,
    _ => label,
  }
}

fn is_count_suffix(tail: &str) -> bool {
  tail
    .strip_suffix(')')
    .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// "Showing X of Y records"
pub fn showing_label(shown: usize, total: usize) -> String {
  format!("Showing {shown} of {total} records")
}

/// Breakdowns drawn on the insights view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Insights {
  pub vector_dbs: Vec<(String, usize)>,
  pub types: Vec<(String, usize)>,
  pub sources: Vec<(String, usize)>,
  pub industries: Vec<(String, usize)>,
}

impl Insights {
  /// Breakdowns over the filtered set, or over everything when the filter
  /// left nothing
  pub fn compute(filtered: &[Record], full: &[Record], profile: &SchemaProfile) -> Self {
    let scope = if filtered.is_empty() { full } else { filtered };
    let counts = |field: Option<&str>, top: Option<usize>| {
      let mut counts = field.map(|f| value_counts(scope, f)).unwrap_or_default();
      if let Some(top) = top {
        counts.truncate(top);
      }
      counts
    };

    Self {
      vector_dbs: counts(Dimension::VectorDb.field(profile), Some(TOP_VECTOR_DBS)),
      types: counts(Dimension::Category.field(profile), None),
      sources: counts(Dimension::Source.field(profile), Some(TOP_SOURCES)),
      industries: counts(profile.has_industry.then_some(fields::INDUSTRY), Some(TOP_INDUSTRIES)),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.vector_dbs.is_empty()
      && self.types.is_empty()
      && self.sources.is_empty()
      && self.industries.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::record_from;
  use serde_json::{json, Value};

  fn records() -> Vec<Record> {
    vec![
      record_from([("company_name", json!("Acme")), ("vector_db_used", json!("pinecone"))]),
      record_from([("company_name", json!("Globex")), ("vector_db_used", json!("chroma"))]),
      record_from([("company_name", json!("Acme")), ("vector_db_used", json!("chroma"))]),
      record_from([("company_name", Value::Null), ("source", json!("blog"))]),
    ]
  }

  #[test]
  fn test_value_counts_sorted_with_stable_ties() {
    let records = vec![
      record_from([("category", json!("b"))]),
      record_from([("category", json!("a"))]),
      record_from([("category", json!("a"))]),
      record_from([("category", json!("c"))]),
      record_from([("category", Value::Null)]),
    ];

    let counts = value_counts(&records, "category");

    assert_eq!(counts, vec![("a".to_string(), 2), ("b".to_string(), 1), ("c".to_string(), 1)]);
  }

  #[test]
  fn test_summary_counts_distinct_values() {
    let records = records();
    let profile = SchemaProfile::detect(&records);

    let summary = Summary::compute(&records, &profile);

    assert_eq!(summary, Summary { records: 4, companies: 2, vector_dbs: 2, types: 0, sources: 1 });
    assert_eq!(summary.entries()[1], ("Companies", 2));
  }

  #[test]
  fn test_facet_labels_and_extraction() {
    let records = records();
    let profile = SchemaProfile::detect(&records);

    let options = facet_options(&records, &profile, Dimension::VectorDb);

    assert_eq!(options, vec!["chroma (2)", "pinecone (1)"]);
    assert_eq!(extract_value(&options[0]), "chroma");
    assert_eq!(extract_value("Series (A) (3)"), "Series (A)");
    assert_eq!(extract_value("plain"), "plain");
    assert_eq!(extract_value("Series (A)"), "Series (A)");
    assert_eq!(extract_value("Partner (reseller) (4)"), "Partner (reseller)");
    assert_eq!(extract_value("odd ()"), "odd ()");
  }

  #[test]
  fn test_facets_for_missing_dimension_are_empty() {
    let records = records();
    let profile = SchemaProfile::detect(&records);

    assert!(facet_options(&records, &profile, Dimension::Category).is_empty());
  }

  #[test]
  fn test_showing_label() {
    assert_eq!(showing_label(0, 12), "Showing 0 of 12 records");
  }

  #[test]
  fn test_insights_fall_back_to_full_set() {
    let full = records();
    let profile = SchemaProfile::detect(&full);

    let insights = Insights::compute(&[], &full, &profile);

    assert_eq!(insights.vector_dbs[0], ("chroma".to_string(), 2));
    assert_eq!(insights.sources, vec![("blog".to_string(), 1)]);
    assert!(insights.types.is_empty());
  }

  #[test]
  fn test_insights_truncate_and_drop_nulls() {
    let mut full: Vec<Record> = (0..10)
      .map(|i| record_from([("industry", json!(format!("industry-{i}")))]))
      .collect();
    full.push(record_from([("industry", Value::Null)]));
    let profile = SchemaProfile::detect(&full);

    let insights = Insights::compute(&full[..3], &full, &profile);
    assert_eq!(insights.industries.len(), 3);

    let insights = Insights::compute(&full, &full, &profile);
    assert_eq!(insights.industries.len(), 6);
    assert!(insights.industries.iter().all(|(value, _)| value.starts_with("industry-")));
  }
}
