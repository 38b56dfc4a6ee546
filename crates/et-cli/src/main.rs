use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use et_cli::commands::{buckets, details, epics, report};
use et_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut out = io::stdout().lock();
    match command {
        Commands::Report(args) => report::run(&mut out, args, &config)?,
        Commands::Details(args) => details::run(&mut out, args, &config)?,
        Commands::Buckets(args) => buckets::run(&mut out, args, &config)?,
        Commands::Epics { json } => {
            let epics = config.epic_set().context("invalid epic configuration")?;
            epics::run(&mut out, &epics, *json)?;
        }
    }

    Ok(())
}
