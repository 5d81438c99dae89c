use anyhow::Result;
use clap::{Parser, Subcommand};
use gtm::cli::browse::{run_browse, BrowseState};
use gtm::cli::{commands, FilterArgs, FormatArg};
use gtm::filter::FilterCriteria;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gtm")]
#[command(about = "Chroma GTM - browse, filter and export records from hosted Chroma collections")]
#[command(version)]
struct Cli {
  /// Configuration file (defaults to $GTM_CONFIG or the user config dir)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// App password; prompted for when required and not given
  #[arg(long, global = true, env = "GTM_PASSWORD", hide_env_values = true)]
  password: Option<String>,

  /// Show diagnostic output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// List collections in the configured database
  Collections,
  /// Show the stats strip and filter values of a collection
  Stats {
    /// Collection name (defaults to the first listed)
    collection: Option<String>,
  },
  /// Show filtered records as a table
  Show {
    /// Collection name (defaults to the first listed)
    collection: Option<String>,
    #[command(flatten)]
    filters: FilterArgs,
    /// Maximum rows to print
    #[arg(short, long)]
    limit: Option<usize>,
  },
  /// Export filtered records to CSV or JSON
  Export {
    /// Collection name (defaults to the first listed)
    collection: Option<String>,
    #[command(flatten)]
    filters: FilterArgs,
    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: FormatArg,
    /// Output file (defaults to <collection>.<format>)
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// Show breakdowns by vector DB, type, source and industry
  Insights {
    /// Collection name (defaults to the first listed)
    collection: Option<String>,
    #[command(flatten)]
    filters: FilterArgs,
  },
  /// Browse a collection interactively
  Browse {
    /// Collection name (defaults to the first listed)
    collection: Option<String>,
    #[command(flatten)]
    filters: FilterArgs,
    /// Maximum rows to print per view
    #[arg(short, long, default_value = "25")]
    limit: usize,
  },
}

async fn handle(cli: Cli) -> Result<()> {
  let mut session = commands::open_session(cli.config.as_deref(), cli.password)?;

  match cli.command {
    Command::Collections => commands::list_collections(&session).await?,
    Command::Stats { collection } => {
      let collection = commands::resolve_collection(&session, collection.as_deref()).await?;
      commands::show_stats(&mut session, &collection).await?;
    }
    Command::Show { collection, filters, limit } => {
      let collection = commands::resolve_collection(&session, collection.as_deref()).await?;
      let criteria = FilterCriteria::from(filters);
      commands::show_records(&mut session, &collection, &criteria, limit).await?;
    }
    Command::Export { collection, filters, format, output } => {
      let collection = commands::resolve_collection(&session, collection.as_deref()).await?;
      let criteria = FilterCriteria::from(filters);
      commands::export_records(
        &mut session,
        &collection,
        &criteria,
        format.into(),
        output.as_deref(),
      )
      .await?;
    }
    Command::Insights { collection, filters } => {
      let collection = commands::resolve_collection(&session, collection.as_deref()).await?;
      let criteria = FilterCriteria::from(filters);
      commands::show_insights(&mut session, &collection, &criteria).await?;
    }
    Command::Browse { collection, filters, limit } => {
      let collection = commands::resolve_collection(&session, collection.as_deref()).await?;
      let state = BrowseState::new(collection, FilterCriteria::from(filters));
      let stdin = std::io::stdin();
      run_browse(&mut session, state, Some(limit), stdin.lock()).await?;
    }
  }

  session.end();
  Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  bentley::init(cli.verbose);

  handle(cli).await?;
  Ok(())
}
