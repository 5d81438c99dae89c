//! Terminal front end over the viewer session

pub mod browse;
pub mod commands;
pub mod display;

use clap::{Args, ValueEnum};

use crate::export::ExportFormat;
use crate::filter::FilterCriteria;
use crate::stats::extract_value;

/// Filter options shared by every command that shows records
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
  /// Semantic search text; replaces the record set with ranked matches
  #[arg(short, long)]
  pub query: Option<String>,
  /// Keep records of this type (repeatable)
  #[arg(short = 't', long = "type", value_name = "TYPE")]
  pub types: Vec<String>,
  /// Keep records using this vector database (repeatable)
  #[arg(short = 'd', long = "db", value_name = "DB")]
  pub vector_dbs: Vec<String>,
  /// Keep records from this source (repeatable)
  #[arg(short, long = "source", value_name = "SOURCE")]
  pub sources: Vec<String>,
  /// Case-insensitive company name substring
  #[arg(short, long)]
  pub company: Option<String>,
}

impl From<FilterArgs> for FilterCriteria {
  fn from(args: FilterArgs) -> Self {
    // Facet labels pasted from `gtm stats` carry a trailing count
    let values = |labels: Vec<String>| -> Vec<String> {
      labels.iter().map(|label| extract_value(label).to_string()).collect()
    };

    FilterCriteria {
      query: args.query,
      categories: values(args.types),
      vector_dbs: values(args.vector_dbs),
      sources: values(args.sources),
      company: args.company,
    }
  }
}

/// Export format accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
  Csv,
  Json,
}

impl From<FormatArg> for ExportFormat {
  fn from(format: FormatArg) -> Self {
    match format {
      FormatArg::Csv => ExportFormat::Csv,
      FormatArg::Json => ExportFormat::Json,
    }
  }
}
