//! Domain logic: calendar arithmetic, aggregation, ingestion

pub mod calendar;
pub mod ingest;
pub mod stats;
