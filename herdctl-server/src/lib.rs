//! herdctl-server: livestock records over HTTP
//!
//! Serves animal and breeding records from whichever storage backend the
//! environment selects (SQLite, PostgreSQL or MySQL).

pub mod db;
pub mod http;

pub use db::{connect, StorageDriver, StorageError};
pub use http::{run_server, ServerConfig};
