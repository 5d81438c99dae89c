//! Leveled logging for the gtm tools
//!
//! - Standard levels: `verbose()`, `info()`, `warn()`, `error()`, `success()`
//! - Multi-line messages keep the prefix on every line
//! - All output goes to stderr so stdout stays clean for tables and exports
//! - `init()` also wires up `tracing` so library events (reqwest, hyper) surface
//!   when verbose output is on
//!
//! Call sites use the macros: `bentley::info!(&format!("Fetched {count} records"))`.

use colored::*;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Log levels understood by bentley
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Verbose,
  Info,
  Warn,
  Error,
  Success,
}

impl Level {
  fn label(self) -> &'static str {
    match self {
      Level::Verbose => "verb",
      Level::Info => "info",
      Level::Warn => "warn",
      Level::Error => "error",
      Level::Success => "sccs",
    }
  }

  fn color(self) -> Color {
    match self {
      Level::Verbose => Color::Cyan,
      Level::Info => Color::Blue,
      Level::Warn => Color::Yellow,
      Level::Error => Color::Red,
      Level::Success => Color::Green,
    }
  }
}

/// Initialize logging for a binary.
///
/// Sets verbose output and installs a tracing subscriber filtered by `RUST_LOG`
/// when present, otherwise by a default that keeps dependencies quiet.
pub fn init(verbose: bool) {
  set_verbose(verbose);

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if verbose {
      EnvFilter::new("info")
    } else {
      EnvFilter::new("gtm=info,warn")
    }
  });

  // A second init (tests, embedded use) keeps the first subscriber
  let _ = tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(filter)
    .try_init();
}

pub fn set_verbose(verbose: bool) {
  VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
  VERBOSE.load(Ordering::Relaxed)
}

/// Core logging function that handles the actual output
pub fn log(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

/// Format a colored prefix for log messages
fn format_prefix(color: Color, prefix: &str) -> String {
  format!("[{}]{:<width$}", prefix.color(color).bold(), "", width = 7 - prefix.len() - 2)
}

/// Render a message into prefixed output lines for the given level
pub fn render(level: Level, message: &str) -> Vec<String> {
  let prefix = format_prefix(level.color(), level.label());
  message.lines().map(|line| format!("{prefix} {line}")).collect()
}

fn emit(level: Level, message: &str) {
  if level == Level::Verbose && !is_verbose() {
    return;
  }
  for line in render(level, message) {
    log(&line);
  }
}

/// Verbose logging - diagnostic detail, hidden unless enabled
pub fn verbose(message: &str) {
  emit(Level::Verbose, message);
}

/// Info level logging - general information
pub fn info(message: &str) {
  emit(Level::Info, message);
}

/// Warning level logging - something needs attention
pub fn warn(message: &str) {
  emit(Level::Warn, message);
}

/// Error level logging - something went wrong
pub fn error(message: &str) {
  emit(Level::Error, message);
}

/// Success level logging - something completed successfully
pub fn success(message: &str) {
  emit(Level::Success, message);
}

/// Macros for coverage-excluded logging - these expand with LCOV_EXCL_LINE at call sites
#[macro_export]
macro_rules! verbose {
  ($msg:expr) => {
    $crate::verbose($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! info {
  ($msg:expr) => {
    $crate::info($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! warn {
  ($msg:expr) => {
    $crate::warn($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! error {
  ($msg:expr) => {
    $crate::error($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! success {
  ($msg:expr) => {
    $crate::success($msg); // LCOV_EXCL_LINE
  };
}
