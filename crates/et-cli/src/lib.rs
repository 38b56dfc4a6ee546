//! Epic timelines CLI library.
//!
//! This crate provides the CLI interface, configuration and calendar import
//! for the epic timelines engine.

mod cli;
pub mod commands;
mod config;
pub mod ics;

pub use cli::{BucketsArgs, Cli, Commands, DetailsArgs, RangeArgs, ReportArgs};
pub use config::Config;
