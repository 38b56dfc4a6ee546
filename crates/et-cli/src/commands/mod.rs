//! CLI subcommand implementations.

pub mod buckets;
pub mod details;
pub mod epics;
pub mod report;
mod timeline;
pub mod util;
