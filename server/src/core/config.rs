use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::stats::daily::DEFAULT_ZERO_RUN_MAX_DAYS;
use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_BACKFILL_DAYS, DEFAULT_COUNTERS_URL, DEFAULT_HOST,
    DEFAULT_INGEST_INTERVAL_MINUTES, DEFAULT_PORT, DEFAULT_TIMESERIES_URL, DEFAULT_WEATHER_URL,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Ingestion configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct IngestFileConfig {
    pub enabled: Option<bool>,
    pub interval_minutes: Option<u64>,
    pub counters_url: Option<String>,
    pub timeseries_url: Option<String>,
    pub weather_url: Option<String>,
    pub backfill_days: Option<u32>,
}

/// Statistics configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StatsFileConfig {
    /// Longest run of consecutive zero days kept in weekday averages
    pub zero_run_max_days: Option<usize>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub ingest: Option<IngestFileConfig>,
    pub stats: Option<StatsFileConfig>,
    pub data_dir: Option<String>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                current.host = server.host;
            }
            if server.port.is_some() {
                current.port = server.port;
            }
        }

        if let Some(ingest) = other.ingest {
            let current = self.ingest.get_or_insert_with(IngestFileConfig::default);
            if ingest.enabled.is_some() {
                current.enabled = ingest.enabled;
            }
            if ingest.interval_minutes.is_some() {
                current.interval_minutes = ingest.interval_minutes;
            }
            if ingest.counters_url.is_some() {
                current.counters_url = ingest.counters_url;
            }
            if ingest.timeseries_url.is_some() {
                current.timeseries_url = ingest.timeseries_url;
            }
            if ingest.weather_url.is_some() {
                current.weather_url = ingest.weather_url;
            }
            if ingest.backfill_days.is_some() {
                current.backfill_days = ingest.backfill_days;
            }
        }

        if let Some(stats) = other.stats {
            let current = self.stats.get_or_insert_with(StatsFileConfig::default);
            if stats.zero_run_max_days.is_some() {
                current.zero_run_max_days = stats.zero_run_max_days;
            }
        }

        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }

        if other.debug.is_some() {
            self.debug = other.debug;
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Ingestion configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub enabled: bool,
    pub interval_minutes: u64,
    pub counters_url: String,
    pub timeseries_url: String,
    pub weather_url: String,
    pub backfill_days: u32,
}

/// Statistics configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct StatsConfig {
    pub zero_run_max_days: usize,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ingest: IngestConfig,
    pub stats: StatsConfig,
    pub data_dir: Option<PathBuf>,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.compteurs/compteurs.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let file_server = file_config.server.unwrap_or_default();
        let file_ingest = file_config.ingest.unwrap_or_default();
        let file_stats = file_config.stats.unwrap_or_default();

        // Layer configs: defaults -> file config -> CLI/env overrides
        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let ingest = IngestConfig {
            enabled: cli.ingest.or(file_ingest.enabled).unwrap_or(true),
            interval_minutes: cli
                .ingest_interval
                .or(file_ingest.interval_minutes)
                .unwrap_or(DEFAULT_INGEST_INTERVAL_MINUTES),
            counters_url: file_ingest
                .counters_url
                .unwrap_or_else(|| DEFAULT_COUNTERS_URL.to_string()),
            timeseries_url: file_ingest
                .timeseries_url
                .unwrap_or_else(|| DEFAULT_TIMESERIES_URL.to_string()),
            weather_url: file_ingest
                .weather_url
                .unwrap_or_else(|| DEFAULT_WEATHER_URL.to_string()),
            backfill_days: file_ingest.backfill_days.unwrap_or(DEFAULT_BACKFILL_DAYS),
        };

        let stats = StatsConfig {
            zero_run_max_days: file_stats
                .zero_run_max_days
                .unwrap_or(DEFAULT_ZERO_RUN_MAX_DAYS),
        };

        let data_dir = cli
            .data_dir
            .clone()
            .or_else(|| file_config.data_dir.map(|d| expand_path(&d)));

        let debug = cli.debug || file_config.debug.unwrap_or(false);

        Ok(Self {
            server: ServerConfig { host, port },
            ingest,
            stats,
            data_dir,
            debug,
        })
    }

    /// Default configuration for tests (no file or env lookups)
    #[cfg(test)]
    pub fn default_for_test() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            ingest: IngestConfig {
                enabled: false,
                interval_minutes: DEFAULT_INGEST_INTERVAL_MINUTES,
                counters_url: DEFAULT_COUNTERS_URL.to_string(),
                timeseries_url: DEFAULT_TIMESERIES_URL.to_string(),
                weather_url: DEFAULT_WEATHER_URL.to_string(),
                backfill_days: DEFAULT_BACKFILL_DAYS,
            },
            stats: StatsConfig {
                zero_run_max_days: DEFAULT_ZERO_RUN_MAX_DAYS,
            },
            data_dir: None,
            debug: false,
        }
    }
}

/// Profile config path: ~/.compteurs/compteurs.json
fn get_profile_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overlay_wins() {
        let mut base: FileConfig = serde_json::from_str(
            r#"{"server": {"host": "0.0.0.0"}, "ingest": {"interval_minutes": 30}}"#,
        )
        .unwrap();
        let overlay: FileConfig =
            serde_json::from_str(r#"{"server": {"port": 9000}, "ingest": {"enabled": false}}"#)
                .unwrap();
        base.merge(overlay);

        let server = base.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(9000));
        let ingest = base.ingest.unwrap();
        assert_eq!(ingest.enabled, Some(false));
        assert_eq!(ingest.interval_minutes, Some(30));
    }

    #[test]
    fn test_unknown_fields_captured() {
        let config: FileConfig =
            serde_json::from_str(r#"{"server": {}, "sevrer": {"port": 1}}"#).unwrap();
        match &config.extra {
            serde_json::Value::Object(map) => assert!(map.contains_key("sevrer")),
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_without_files() {
        let config = AppConfig::default_for_test();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.stats.zero_run_max_days, DEFAULT_ZERO_RUN_MAX_DAYS);
        assert!(config.ingest.counters_url.contains("ecocounter"));
    }
}
