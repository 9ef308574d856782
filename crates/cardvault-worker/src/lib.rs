//! Cardvault Worker Library
//!
//! The long-running half of the pipeline: a directory watch that reports
//! files once their writes settle, and the coordinator that archives and
//! indexes each of them as an isolated task.

pub mod coordinator;
pub mod watch;

pub use coordinator::{IngestCoordinator, IngestOutcome};
pub use watch::{wait_until_stable, DirectoryWatch, ReadyFile, WatchConfig};
