//! Data layer: SQLite persistence and store traits

pub mod series;
pub mod sqlite;
pub mod types;
