//! Compteurs server library
//!
//! Montpellier bicycle and pedestrian counter statistics: ingestion from the
//! city's open-data portal and Open-Meteo, SQLite storage, and the JSON
//! statistics API the dashboard consumes.

pub mod api;
pub mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
