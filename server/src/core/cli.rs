use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_DATA_DIR, ENV_HOST, ENV_INGEST_ENABLED, ENV_INGEST_INTERVAL, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "compteurs")]
#[command(version, about = "Montpellier bike & pedestrian counter dashboard", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Data directory override
    #[arg(long, global = true, env = ENV_DATA_DIR)]
    pub data_dir: Option<PathBuf>,

    /// Enable or disable background ingestion
    #[arg(long, global = true, env = ENV_INGEST_ENABLED)]
    pub ingest: Option<bool>,

    /// Ingestion interval in minutes
    #[arg(long, global = true, env = ENV_INGEST_INTERVAL)]
    pub ingest_interval: Option<u64>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Data ingestion commands
    Ingest {
        #[command(subcommand)]
        command: IngestCommands,
    },
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum IngestCommands {
    /// Run a single ingestion pass and exit
    Run,
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete the local data directory (database included). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub ingest: Option<bool>,
    pub ingest_interval: Option<u64>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        debug: cli.debug,
        config: cli.config,
        data_dir: cli.data_dir,
        ingest: cli.ingest,
        ingest_interval: cli.ingest_interval,
    };
    (config, cli.command)
}
