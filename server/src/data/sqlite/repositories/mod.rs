//! SQLite repository modules
//!
//! Free functions over a shared pool, one module per table family.

pub mod counters;
pub mod readings;
pub mod weather;
