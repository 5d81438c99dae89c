//! Filter engine
//!
//! A view is computed in two phases. Base selection swaps the full snapshot for
//! ranked semantic-query results when a query is active; the remaining
//! predicates then narrow that base. The predicates are conjunctive, so their
//! order does not matter, but base selection always comes first because it
//! changes both the rows and their shape (a leading relevance field).

use serde_json::json;
use std::collections::HashSet;

use crate::client::{CollectionClient, QueryRequest, QueryResponse};
use crate::error::{Result, ViewerError};
use crate::pager::Snapshot;
use crate::record::{field_text, fields, Record};
use crate::schema::SchemaProfile;

/// Number of nearest neighbors requested for a semantic query
pub const DEFAULT_QUERY_RESULTS: usize = 200;

/// Length of the query excerpt shown in the search pill
const SEARCH_PILL_CHARS: usize = 30;

/// User-selected constraints for one view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
  /// Free-text semantic query; replaces the base set when non-empty
  pub query: Option<String>,
  pub categories: Vec<String>,
  pub vector_dbs: Vec<String>,
  pub sources: Vec<String>,
  /// Case-insensitive company name substring
  pub company: Option<String>,
}

impl FilterCriteria {
  /// Query text with surrounding whitespace removed, if any is left
  pub fn active_query(&self) -> Option<&str> {
    self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
  }

  fn active_company(&self) -> Option<&str> {
    self.company.as_deref().filter(|c| !c.is_empty())
  }

  /// True when no criterion is set
  pub fn is_empty(&self) -> bool {
    self.active_query().is_none()
      && self.categories.is_empty()
      && self.vector_dbs.is_empty()
      && self.sources.is_empty()
      && self.active_company().is_none()
  }

  pub fn clear(&mut self) {
    *self = Self::default();
  }

  /// Narrowing predicates for the non-query criteria
  pub fn predicates(&self) -> Vec<Predicate> {
    let mut predicates = Vec::new();
    if !self.categories.is_empty() {
      predicates.push(Predicate::member(Dimension::Category, &self.categories));
    }
    if !self.vector_dbs.is_empty() {
      predicates.push(Predicate::member(Dimension::VectorDb, &self.vector_dbs));
    }
    if !self.sources.is_empty() {
      predicates.push(Predicate::member(Dimension::Source, &self.sources));
    }
    if let Some(company) = self.active_company() {
      predicates.push(Predicate::CompanyContains(company.to_lowercase()));
    }
    predicates
  }

  /// Labels for the active-filter pills
  pub fn active_labels(&self) -> Vec<String> {
    let mut labels = Vec::new();
    labels.extend(self.categories.iter().map(|v| format!("Type: {v}")));
    labels.extend(self.vector_dbs.iter().map(|v| format!("DB: {v}")));
    labels.extend(self.sources.iter().map(|v| format!("Source: {v}")));
    if let Some(company) = self.active_company() {
      labels.push(format!("Company: {company}"));
    }
    if let Some(query) = self.active_query() {
      let excerpt: String = query.chars().take(SEARCH_PILL_CHARS).collect();
      labels.push(format!("Search: {excerpt}..."));
    }
    labels
  }
}

/// Set-membership filter dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
  Category,
  VectorDb,
  Source,
}

impl Dimension {
  /// Record field this dimension reads, given the collection's profile
  pub fn field(self, profile: &SchemaProfile) -> Option<&'static str> {
    let field = match self {
      Dimension::Category => fields::CATEGORY,
      Dimension::VectorDb => fields::VECTOR_DB,
      Dimension::Source => return profile.source_field,
    };
    profile.supports(field).then_some(field)
  }
}

/// One narrowing step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
  /// Keep records whose field value is one of `values`
  Member { dimension: Dimension, values: HashSet<String> },
  /// Keep records whose company name contains the lowercase needle
  CompanyContains(String),
}

impl Predicate {
  fn member(dimension: Dimension, values: &[String]) -> Self {
    Predicate::Member { dimension, values: values.iter().cloned().collect() }
  }

  /// Whether `record` survives this predicate.
  ///
  /// A predicate over a field the collection does not have keeps everything.
  pub fn matches(&self, record: &Record, profile: &SchemaProfile) -> bool {
    match self {
      Predicate::Member { dimension, values } => match dimension.field(profile) {
        Some(field) => field_text(record, field).is_some_and(|value| values.contains(&value)),
        None => true,
      },
      Predicate::CompanyContains(needle) => {
        if !profile.has_company {
          return true;
        }
        field_text(record, fields::COMPANY)
          .is_some_and(|company| company.to_lowercase().contains(needle.as_str()))
      }
    }
  }
}

/// Keep the records that pass every predicate, preserving order
pub fn narrow(
  records: Vec<Record>,
  predicates: &[Predicate],
  profile: &SchemaProfile,
) -> Vec<Record> {
  records
    .into_iter()
    .filter(|record| predicates.iter().all(|predicate| predicate.matches(record, profile)))
    .collect()
}

/// Relevance percentage for a query distance: `max(0, 1 - d) * 100`, rounded
pub fn relevance_percent(distance: f32) -> u32 {
  let closeness = 1.0 - f64::from(distance);
  if !closeness.is_finite() {
    return 0;
  }
  (closeness.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Turn the first query's results into ranked records with a leading
/// `relevance` field
pub fn ranked_records(response: QueryResponse) -> Vec<Record> {
  let metadatas = response.metadatas.into_iter().next().unwrap_or_default();
  let distances = response.distances.into_iter().next().unwrap_or_default();

  metadatas
    .into_iter()
    .enumerate()
    .map(|(rank, metadata)| {
      let mut record = metadata.unwrap_or_default();
      let relevance = distances.get(rank).copied().flatten().map(relevance_percent);
      record.shift_insert(0, fields::RELEVANCE.to_string(), json!(relevance));
      record
    })
    .collect()
}

/// Pick the working set: ranked query results when a query is active,
/// otherwise a copy of the snapshot
pub async fn select_base<C>(
  client: &C,
  snapshot: &Snapshot,
  criteria: &FilterCriteria,
  n_results: usize,
) -> Result<Vec<Record>>
where
  C: CollectionClient + ?Sized,
{
  let Some(query) = criteria.active_query() else {
    return Ok(snapshot.records.clone());
  };

  let handle = client.get_collection(&snapshot.collection).await?;
  let response = client
    .query(&handle, QueryRequest::text(query, n_results))
    .await
    .map_err(|e| ViewerError::retrieval(&snapshot.collection, e))?;
  let records = ranked_records(response);

  bentley::verbose!(&format!("Semantic query '{query}' matched {} records", records.len()));
  Ok(records)
}

/// Compute the filtered record set for a snapshot
pub async fn filter_records<C>(
  client: &C,
  snapshot: &Snapshot,
  profile: &SchemaProfile,
  criteria: &FilterCriteria,
  n_results: usize,
) -> Result<Vec<Record>>
where
  C: CollectionClient + ?Sized,
{
  let base = select_base(client, snapshot, criteria, n_results).await?;
  Ok(narrow(base, &criteria.predicates(), profile))
}
