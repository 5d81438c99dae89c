//! Interactive browse mode
//!
//! A line-oriented loop over one session. Each line changes the filter
//! criteria or the collection and redraws the view, so the snapshot cache and
//! refresh behave the same way across interactions.

use anyhow::{anyhow, bail, Result};
use colored::*;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::cli::commands::{export_records, print_insights, print_stats, print_view};
use crate::client::CollectionClient;
use crate::export::ExportFormat;
use crate::filter::FilterCriteria;
use crate::session::ViewerSession;
use crate::stats::extract_value;

const HELP: &str = "\
Commands:
  search <text>       semantic search (no text clears it)
  type <a, b>         keep these types (no values clears)
  db <a, b>           keep these vector databases
  source <a, b>       keep these sources
  company <text>      company name contains text
  clear               drop every filter
  use <collection>    switch collection (filters reset)
  refresh             clear the cache and refetch
  export csv|json [path]
  insights            breakdowns for the current view
  stats               stats strip for the collection
  show                redraw the table
  help                this text
  quit                leave";

/// One parsed browse-mode line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
  Search(Option<String>),
  Types(Vec<String>),
  VectorDbs(Vec<String>),
  Sources(Vec<String>),
  Company(Option<String>),
  Clear,
  Use(String),
  Refresh,
  Export { format: ExportFormat, output: Option<PathBuf> },
  Insights,
  Stats,
  Show,
  Help,
  Quit,
}

/// Parse one input line; a blank line redraws the view
pub fn parse_command(line: &str) -> Result<BrowseCommand> {
  let line = line.trim();
  let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
  let rest = rest.trim();
  let text = || (!rest.is_empty()).then(|| rest.to_string());

  let command = match word.to_lowercase().as_str() {
    "" | "show" => BrowseCommand::Show,
    "search" | "q" => BrowseCommand::Search(text()),
    "type" => BrowseCommand::Types(split_values(rest)),
    "db" => BrowseCommand::VectorDbs(split_values(rest)),
    "source" => BrowseCommand::Sources(split_values(rest)),
    "company" => BrowseCommand::Company(text()),
    "clear" => BrowseCommand::Clear,
    "use" => BrowseCommand::Use(text().ok_or_else(|| anyhow!("use needs a collection name"))?),
    "refresh" => BrowseCommand::Refresh,
    "export" => parse_export(rest)?,
    "insights" => BrowseCommand::Insights,
    "stats" => BrowseCommand::Stats,
    "help" | "?" => BrowseCommand::Help,
    "quit" | "exit" => BrowseCommand::Quit,
    other => bail!("Unknown command '{other}' (try 'help')"),
  };
  Ok(command)
}

fn parse_export(rest: &str) -> Result<BrowseCommand> {
  let mut parts = rest.split_whitespace();
  let format = match parts.next() {
    Some("csv") | None => ExportFormat::Csv,
    Some("json") => ExportFormat::Json,
    Some(other) => bail!("Unknown export format '{other}' (csv or json)"),
  };
  Ok(BrowseCommand::Export { format, output: parts.next().map(PathBuf::from) })
}

/// Comma-separated values, with any `(count)` suffix from a facet label removed
fn split_values(rest: &str) -> Vec<String> {
  rest
    .split(',')
    .map(|value| extract_value(value.trim()).to_string())
    .filter(|value| !value.is_empty())
    .collect()
}

/// What the loop should do after a command updated the state
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
  Redraw,
  Refresh,
  Export { format: ExportFormat, output: Option<PathBuf> },
  Insights,
  Stats,
  Help,
  Quit,
}

/// Selected collection and filters for a browse session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseState {
  pub collection: String,
  pub criteria: FilterCriteria,
}

impl BrowseState {
  pub fn new(collection: String, criteria: FilterCriteria) -> Self {
    Self { collection, criteria }
  }

  fn apply(&mut self, command: BrowseCommand) -> Step {
    match command {
      BrowseCommand::Search(query) => self.criteria.query = query,
      BrowseCommand::Types(values) => self.criteria.categories = values,
      BrowseCommand::VectorDbs(values) => self.criteria.vector_dbs = values,
      BrowseCommand::Sources(values) => self.criteria.sources = values,
      BrowseCommand::Company(company) => self.criteria.company = company,
      BrowseCommand::Clear => self.criteria.clear(),
      BrowseCommand::Use(collection) => {
        self.collection = collection;
        self.criteria.clear();
      }
      BrowseCommand::Refresh => return Step::Refresh,
      BrowseCommand::Export { format, output } => return Step::Export { format, output },
      BrowseCommand::Insights => return Step::Insights,
      BrowseCommand::Stats => return Step::Stats,
      BrowseCommand::Show => {}
      BrowseCommand::Help => return Step::Help,
      BrowseCommand::Quit => return Step::Quit,
    }
    Step::Redraw
  }
}

/// Run the browse loop until `quit` or end of input
pub async fn run_browse<C, R>(
  session: &mut ViewerSession<C>,
  mut state: BrowseState,
  limit: Option<usize>,
  input: R,
) -> Result<()>
where
  C: CollectionClient,
  R: BufRead,
{
  let interactive = console::user_attended();
  redraw(session, &state, limit).await;

  let mut lines = input.lines();
  loop {
    if interactive {
      print!("{} ", format!("gtm:{}>", state.collection).cyan());
      std::io::stdout().flush()?;
    }
    let Some(line) = lines.next() else {
      break;
    };

    let command = match parse_command(&line?) {
      Ok(command) => command,
      Err(error) => {
        bentley::warn!(&error.to_string());
        continue;
      }
    };

    match state.apply(command) {
      Step::Redraw => redraw(session, &state, limit).await,
      Step::Refresh => {
        session.refresh();
        redraw(session, &state, limit).await;
      }
      Step::Export { format, output } => {
        let result = export_records(
          session,
          &state.collection,
          &state.criteria,
          format,
          output.as_deref(),
        )
        .await;
        if let Err(error) = result {
          bentley::error!(&format!("{error:#}"));
        }
      }
      Step::Insights => match session.view(&state.collection, &state.criteria).await {
        Ok(view) => print_insights(&view),
        Err(error) => {
          bentley::error!(&error.to_string());
        }
      },
      Step::Stats => match session.view(&state.collection, &FilterCriteria::default()).await {
        Ok(view) => print_stats(&view),
        Err(error) => {
          bentley::error!(&error.to_string());
        }
      },
      Step::Help => println!("{HELP}"),
      Step::Quit => break,
    }
  }

  Ok(())
}

/// Recompute and print the current view; failures are reported, not fatal
async fn redraw<C: CollectionClient>(
  session: &mut ViewerSession<C>,
  state: &BrowseState,
  limit: Option<usize>,
) {
  match session.view(&state.collection, &state.criteria).await {
    Ok(view) => {
      println!("{} {}", "◈".cyan(), view.collection().bold());
      print_view(&view, limit);
    }
    Err(error) => {
      bentley::error!(&error.to_string());
    }
  }
}
