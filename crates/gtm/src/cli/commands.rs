use anyhow::{Context, Result};
use colored::*;
use dialoguer::Password;
use std::path::{Path, PathBuf};

use crate::cli::display::{
  render_bars, render_fetched, render_pills, render_summary, render_table,
};
use crate::client::{BoxedCollectionClient, ChromaHttpClient, CollectionClient, HttpEmbedder};
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::export::{export_to_path, ExportFormat};
use crate::filter::{Dimension, FilterCriteria};
use crate::session::{CollectionView, ViewerSession};

/// Build the Chroma client described by the configuration
pub fn build_client(config: &ViewerConfig) -> Result<BoxedCollectionClient> {
  let mut client = ChromaHttpClient::new(config.into())?;
  if let Some(embedding) = &config.embedding {
    let embedder = HttpEmbedder::new(embedding.clone(), config.timeout_secs)?;
    client = client.with_embedder(Box::new(embedder));
  } else {
    bentley::verbose!("No embedding endpoint configured; semantic search is unavailable");
  }
  Ok(BoxedCollectionClient::new(client))
}

/// Load configuration, connect and pass the password gate
pub fn open_session(
  config_path: Option<&Path>,
  password: Option<String>,
) -> Result<ViewerSession<BoxedCollectionClient>> {
  let config = ViewerConfig::load(config_path).context("Failed to load configuration")?;
  config.validate()?;

  let mut session = ViewerSession::new(build_client(&config)?, &config);
  let password = match password {
    Some(password) => Some(password),
    None if session.requires_password() && console::user_attended() => Some(prompt_password()?),
    None => None,
  };
  session.authenticate(password.as_deref())?;
  Ok(session)
}

fn prompt_password() -> Result<String> {
  Ok(Password::new().with_prompt("GTM password").interact()?)
}

/// Use the named collection, or the first one the service lists
pub async fn resolve_collection<C: CollectionClient>(
  session: &ViewerSession<C>,
  collection: Option<&str>,
) -> Result<String> {
  if let Some(name) = collection {
    return Ok(name.to_string());
  }
  let collections = session.collections().await?;
  Ok(collections.into_iter().next().ok_or(ViewerError::NoCollections)?)
}

pub async fn list_collections<C: CollectionClient>(session: &ViewerSession<C>) -> Result<()> {
  let collections = session.collections().await?;

  println!("{} Collections:", "◈".cyan());
  for name in collections {
    println!("  {}", name.blue());
  }
  Ok(())
}

/// Stats strip plus the selectable filter values for each dimension
pub async fn show_stats<C: CollectionClient>(
  session: &mut ViewerSession<C>,
  collection: &str,
) -> Result<()> {
  let view = session.view(collection, &FilterCriteria::default()).await?;

  print_stats(&view);

  let dimensions = [
    ("Type", Dimension::Category),
    ("Vector DB", Dimension::VectorDb),
    ("Source", Dimension::Source),
  ];
  for (title, dimension) in dimensions {
    let options = view.facets(dimension);
    if options.is_empty() {
      continue;
    }
    println!();
    println!("{}", title.bold());
    for option in options {
      println!("  {option}");
    }
  }
  Ok(())
}

/// Collection header with the fetch time, then the stats strip
pub fn print_stats(view: &CollectionView) {
  println!(
    "{} {} {}",
    "◈".cyan(),
    view.collection().bold(),
    render_fetched(view.snapshot.fetched_at).dimmed()
  );
  println!("{}", render_summary(&view.summary()));
}

/// Filtered records as a table
pub async fn show_records<C: CollectionClient>(
  session: &mut ViewerSession<C>,
  collection: &str,
  criteria: &FilterCriteria,
  limit: Option<usize>,
) -> Result<()> {
  let view = session.view(collection, criteria).await?;
  print_view(&view, limit);
  Ok(())
}

/// Print pills, the results counter and the table for a view
pub fn print_view(view: &CollectionView, limit: Option<usize>) {
  if let Some(pills) = render_pills(&view.active_labels()) {
    println!("{pills}");
  }
  println!("{}", view.showing().dimmed());

  let table = view.table();
  if table.is_empty() {
    println!("No results match your filters");
    return;
  }

  println!();
  for line in render_table(&table, limit, view.criteria.company.as_deref()) {
    println!("{line}");
  }
  if let Some(limit) = limit.filter(|limit| *limit < table.len()) {
    println!("{}", format!("... {} more rows", table.len() - limit).dimmed());
  }
}

/// Write the filtered records to a file and return its path
pub async fn export_records<C: CollectionClient>(
  session: &mut ViewerSession<C>,
  collection: &str,
  criteria: &FilterCriteria,
  format: ExportFormat,
  output: Option<&Path>,
) -> Result<PathBuf> {
  let view = session.view(collection, criteria).await?;
  let path = output.map_or_else(|| format.default_file_name(collection), Path::to_path_buf);

  export_to_path(&view.table(), format, &path)
    .with_context(|| format!("Failed to write {}", path.display()))?;
  bentley::success!(&format!("Exported {} records to {}", view.filtered.len(), path.display()));
  Ok(path)
}

/// Breakdowns over the filtered records, or all of them when nothing matches
pub async fn show_insights<C: CollectionClient>(
  session: &mut ViewerSession<C>,
  collection: &str,
  criteria: &FilterCriteria,
) -> Result<()> {
  let view = session.view(collection, criteria).await?;
  print_insights(&view);
  Ok(())
}

pub fn print_insights(view: &CollectionView) {
  let insights = view.insights();
  if insights.is_empty() {
    println!("No data for insights");
    return;
  }

  let sections = [
    ("Vector DB", &insights.vector_dbs),
    ("Type", &insights.types),
    ("Source", &insights.sources),
    ("Industry", &insights.industries),
  ];
  for (title, counts) in sections {
    if counts.is_empty() {
      continue;
    }
    println!("{}", title.bold());
    for line in render_bars(counts) {
      println!("  {line}");
    }
    println!();
  }
}
