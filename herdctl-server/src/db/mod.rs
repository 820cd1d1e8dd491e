//! Database layer - storage drivers and repositories
//!
//! # Design Principles
//!
//! - One `StorageDriver` trait, three backends, chosen once at startup
//! - Repositories hold a `&dyn StorageDriver` and never branch on backend
//! - Rely on DB constraints, surface conflicts - no check-then-insert
//! - No transactions: each write and its re-read are independent

pub mod driver;
pub mod mysql;
pub mod pool;
pub mod postgres;
pub mod repos;
pub mod schema;
pub mod sqlite;

pub use driver::{ExecOutcome, Param, Row, Statement, StatementKind, StorageDriver, StorageError};
pub use mysql::MySqlDriver;
pub use pool::{connect, connect_with_options, DEFAULT_MAX_CONNECTIONS};
pub use postgres::PostgresDriver;
pub use repos::{AnimalRepo, BreedingRepo, RepoError};
pub use sqlite::SqliteDriver;
