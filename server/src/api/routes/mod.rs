//! API route modules

pub mod counters;
pub mod health;
pub mod stats;
pub mod weather;
