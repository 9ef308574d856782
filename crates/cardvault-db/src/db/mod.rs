//! Index repositories
//
// Error type shared by every index backend
pub mod error;
//
// Backend-agnostic index contract
pub mod index;
//
// SQLite-backed `files` table
pub mod files;
//
// Table definitions, created on connect
pub mod schema;

pub use error::{IndexError, IndexResult};
pub use files::SqliteFileIndex;
pub use index::FileIndex;
