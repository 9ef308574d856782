//! Cardvault DB Library
//!
//! The metadata index: an abstract record store keyed by archive path, and
//! its SQLite implementation.

pub mod db;

pub use db::{FileIndex, IndexError, IndexResult, SqliteFileIndex};
