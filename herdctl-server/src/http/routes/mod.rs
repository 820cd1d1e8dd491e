//! Route handlers organized by resource

pub mod animals;
pub mod breeding;
pub mod health;
