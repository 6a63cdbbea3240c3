//! SQLite schema definitions
//!
//! Initial schema with all tables. Timestamps are INTEGER unix seconds, UTC;
//! any Paris-local interpretation happens in `domain::calendar`, never here.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Counters (metadata maintained by ingestion)
-- =============================================================================
CREATE TABLE IF NOT EXISTS counters (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    serial TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    first_seen INTEGER NOT NULL,
    last_seen INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_counters_active ON counters(active);

-- =============================================================================
-- 2. Counter readings (append-only time series)
-- =============================================================================
CREATE TABLE IF NOT EXISTS counter_readings (
    counter_id TEXT NOT NULL REFERENCES counters(id) ON DELETE CASCADE,
    timestamp INTEGER NOT NULL,
    value REAL NOT NULL,
    PRIMARY KEY (counter_id, timestamp)
) WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS idx_readings_timestamp ON counter_readings(timestamp);

-- =============================================================================
-- 3. Weather readings (upserted, superseded rows overwritten)
-- =============================================================================
CREATE TABLE IF NOT EXISTS weather_readings (
    zone TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    temperature REAL,
    precipitation REAL,
    PRIMARY KEY (zone, timestamp)
) WITHOUT ROWID;
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_contains_all_tables() {
        for table in [
            "schema_version",
            "schema_migrations",
            "counters",
            "counter_readings",
            "weather_readings",
        ] {
            assert!(SCHEMA.contains(table), "schema missing table {}", table);
        }
    }
}
