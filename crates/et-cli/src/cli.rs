//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use et_core::Granularity;

/// Epic timelines.
///
/// Reads a calendar export and reports how many hours went into each epic
/// (a keyword category) per day, week, month, quarter or year.
#[derive(Debug, Parser)]
#[command(name = "et", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show hours per epic per bucket.
    Report(ReportArgs),

    /// Show the events an epic matched in each bucket.
    Details(DetailsArgs),

    /// List the time buckets for a date range.
    Buckets(BucketsArgs),

    /// List the configured epics.
    Epics {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Date range and bucket size.
#[derive(Debug, Clone, Default, Args)]
pub struct RangeArgs {
    /// First day (YYYY-MM-DD, "today", or e.g. "2 weeks ago").
    /// Defaults to the day of the earliest event.
    #[arg(long)]
    pub from: Option<String>,

    /// Last day, inclusive. Defaults to the day of the latest event.
    #[arg(long)]
    pub to: Option<String>,

    /// Bucket size: day, week, month, quarter or year.
    #[arg(short, long)]
    pub granularity: Option<Granularity>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Calendar export (.ics, or .json event list).
    #[arg(short, long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct DetailsArgs {
    /// Calendar export (.ics, or .json event list).
    #[arg(short, long)]
    pub input: PathBuf,

    /// Name of the epic to drill into.
    #[arg(short, long)]
    pub epic: String,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct BucketsArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_report_with_range() {
        let cli = Cli::try_parse_from([
            "et", "report", "-i", "cal.ics", "--from", "2025-09-22", "--to", "today", "-g", "week",
        ])
        .unwrap();

        let Some(Commands::Report(args)) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.input, PathBuf::from("cal.ics"));
        assert_eq!(args.range.from.as_deref(), Some("2025-09-22"));
        assert_eq!(args.range.to.as_deref(), Some("today"));
        assert_eq!(args.range.granularity, Some(Granularity::Week));
        assert!(!args.json);
    }

    #[test]
    fn rejects_unknown_granularity() {
        let result = Cli::try_parse_from(["et", "buckets", "--from", "today", "-g", "hourly"]);
        assert!(result.is_err());
    }
}
