//! Record representation shared by the pager, filter engine and normalizer
//!
//! Collections carry arbitrary metadata per record, so a record is an
//! insertion-ordered map of field name to JSON scalar rather than a struct.

use indexmap::IndexMap;
use serde_json::Value;

/// One metadata record as returned by the remote collection
pub type Record = IndexMap<String, Value>;

/// Field names the pipeline knows about
pub mod fields {
  pub const CATEGORY: &str = "category";
  pub const VECTOR_DB: &str = "vector_db_used";
  pub const SOURCE_CHANNEL: &str = "source_channel";
  pub const SOURCE: &str = "source";
  pub const COMPANY: &str = "company_name";
  pub const INDUSTRY: &str = "industry";
  pub const RELEVANCE: &str = "relevance";
}

/// Textual form of a scalar value, `None` for null or a missing field.
///
/// Nested values are not expected in metadata; they render as compact JSON.
pub fn value_text(value: &Value) -> Option<String> {
  match value {
    Value::Null => None,
    Value::String(s) => Some(s.clone()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Number(n) => Some(n.to_string()),
    other => Some(other.to_string()),
  }
}

/// Textual form of a record's field, `None` when absent or null
pub fn field_text(record: &Record, field: &str) -> Option<String> {
  record.get(field).and_then(value_text)
}

/// Build a record from `(field, value)` pairs, keeping their order
pub fn record_from<I, K>(pairs: I) -> Record
where
  I: IntoIterator<Item = (K, Value)>,
  K: Into<String>,
{
  pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
