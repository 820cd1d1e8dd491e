//! Command implementations for the herdctl CLI

pub mod backend;
pub mod migrate;
pub mod serve;

// Re-export dispatcher functions for flat access from main.rs
pub use backend::run_backend;
pub use migrate::run_migrate;
pub use serve::run_serve;
