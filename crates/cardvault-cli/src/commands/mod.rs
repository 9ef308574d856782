//! Subcommand implementations

pub mod files;
pub mod ingest;
pub mod output;
pub mod show;
pub mod watch;
