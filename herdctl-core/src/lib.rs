//! herdctl-core: livestock records domain model and backend selection
//!
//! Shared by the HTTP server and the CLI. Holds no storage code.

pub mod config;
pub mod error;
pub mod models;

pub use config::{Backend, DatabaseConfig, MySqlConfig};
pub use error::{ConfigError, Result};
pub use models::{
    iso_timestamp, Animal, BirthRegistration, BirthStatus, BreedingRecord, Deleted, NewAnimal,
    NewBreedingRecord,
};
