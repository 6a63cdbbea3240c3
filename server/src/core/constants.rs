// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Compteurs";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "compteurs";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".compteurs";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "compteurs.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "COMPTEURS_CONFIG";

// =============================================================================
// Environment Variables
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "COMPTEURS_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "COMPTEURS_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "COMPTEURS_LOG";

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "COMPTEURS_DATA_DIR";

/// Environment variable to disable the ingestion scheduler
pub const ENV_INGEST_ENABLED: &str = "COMPTEURS_INGEST_ENABLED";

/// Environment variable for the ingestion interval in minutes
pub const ENV_INGEST_INTERVAL: &str = "COMPTEURS_INGEST_INTERVAL_MINUTES";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5380;

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database file name
pub const SQLITE_DB_FILENAME: &str = "compteurs.db";

/// Maximum pool connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 8;

/// Busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 5;

/// Negative value = KiB of page cache (here 64 MiB)
pub const SQLITE_CACHE_SIZE: &str = "-65536";

/// WAL autocheckpoint threshold in pages
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// Interval between background WAL checkpoints, in seconds
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Ingestion
// =============================================================================

/// Montpellier open-data catalogue of eco-counter devices
pub const DEFAULT_COUNTERS_URL: &str =
    "https://portail-api-data.montpellier3m.fr/ecocounter?limit=1000";

/// Montpellier open-data per-counter time series endpoint (id is appended)
pub const DEFAULT_TIMESERIES_URL: &str =
    "https://portail-api-data.montpellier3m.fr/ecocounter_timeseries";

/// Open-Meteo forecast endpoint for weather observations
pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Montpellier city centre, for the weather query
pub const MONTPELLIER_LATITUDE: f64 = 43.6109;
pub const MONTPELLIER_LONGITUDE: f64 = 3.8763;

/// Weather zone key used for Montpellier-wide observations
pub const WEATHER_ZONE_MONTPELLIER: &str = "montpellier";

/// Default ingestion interval in minutes
pub const DEFAULT_INGEST_INTERVAL_MINUTES: u64 = 60;

/// Minimum ingestion interval, to stay polite with the upstream APIs
pub const MIN_INGEST_INTERVAL_MINUTES: u64 = 10;

/// How far back the very first sync of a counter reaches, in days
pub const DEFAULT_BACKFILL_DAYS: u32 = 365;

/// HTTP timeout for upstream open-data requests, in seconds
pub const INGEST_HTTP_TIMEOUT_SECS: u64 = 30;

/// A counter absent from the catalogue for this long is marked inactive
pub const COUNTER_INACTIVE_AFTER_SECS: i64 = 7 * 24 * 3600;

// =============================================================================
// Shutdown
// =============================================================================

/// Seconds to wait for background tasks during graceful shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;
