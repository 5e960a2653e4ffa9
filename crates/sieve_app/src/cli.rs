//! Command-line arguments for the `sieve` binary.

use std::path::PathBuf;

use clap::Parser;

/// Republish only the feed items that stay free to read across runs.
///
/// Each invocation is one run: fetch the upstream entries, check every page
/// for a paywall or email gate, advance the per-URL streaks and rewrite the
/// filtered RSS document.
#[derive(Parser, Debug)]
#[command(name = "sieve")]
#[command(author, version, about)]
pub struct Args {
    /// RON configuration file; missing fields take their defaults
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// State file carrying streaks between runs
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Filtered RSS document to write
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Plain-text diagnostics for the run
    #[arg(long, value_name = "FILE")]
    pub debug_file: Option<PathBuf>,

    /// Upstream RSS or Atom feed
    #[arg(long, value_name = "URL")]
    pub feed_url: Option<String>,

    /// HTML listing page used when the feed fails or is empty
    #[arg(long, value_name = "URL")]
    pub listing_url: Option<String>,

    /// Consecutive FREE runs required before an item is published (1-100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub confirm_runs: Option<u32>,

    /// Minimum visible words for an article body to count as open
    #[arg(long)]
    pub min_words: Option<usize>,

    /// Concurrent page checks (1-16)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub workers: Option<u8>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub report_json: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Also write log lines to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}
