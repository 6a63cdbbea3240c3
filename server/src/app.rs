//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::cli::{self, CliConfig, Commands, IngestCommands, SystemCommands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::core::storage::AppStorage;
use crate::data::sqlite::SqliteService;
use crate::domain::ingest::IngestService;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub storage: AppStorage,
    pub database: Arc<SqliteService>,
    pub ingest: Arc<IngestService>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::System {
                command: system_cmd,
            }) => {
                return Self::handle_system_command(system_cmd, &cli_config);
            }
            Some(Commands::Ingest {
                command: IngestCommands::Run,
            }) => {
                let app = Self::init(&cli_config).await?;
                return Self::run_ingest_once(app).await;
            }
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init(&config).await?;

        let database = Arc::new(SqliteService::init(&storage).await?);
        let ingest = IngestService::new(Arc::clone(&database), config.ingest.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize ingest service: {}", e))?;
        let shutdown = ShutdownService::new(Arc::clone(&database));

        Ok(Self {
            shutdown,
            config,
            storage,
            database,
            ingest,
        })
    }

    fn handle_system_command(cmd: SystemCommands, cli: &CliConfig) -> Result<()> {
        match cmd {
            SystemCommands::Prune { yes } => Self::prune_data(yes, cli),
        }
    }

    fn prune_data(skip_confirm: bool, cli: &CliConfig) -> Result<()> {
        let data_dir = AppStorage::resolve_data_dir(cli.data_dir.as_deref());

        if !data_dir.exists() {
            println!(
                "Nothing to prune. Data directory does not exist: {}",
                data_dir.display()
            );
            return Ok(());
        }

        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);

        println!("This will permanently delete the local data directory:");
        println!("  {}", data_dir.display());
        println!();
        println!(
            "Make sure the server is not running. \
             Deleting data while the server is running will cause data corruption."
        );

        if !skip_confirm {
            print!("\nContinue? [y/N] ");
            std::io::Write::flush(&mut std::io::stdout())?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;

            if !matches!(input.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Aborted.");
                return Ok(());
            }
        }

        std::fs::remove_dir_all(&data_dir)
            .with_context(|| format!("Failed to delete data directory: {}", data_dir.display()))?;
        println!("Pruned: {}", data_dir.display());
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    /// One ingestion pass, then a clean close (for `compteurs ingest run`)
    async fn run_ingest_once(app: Self) -> Result<()> {
        let report = app.ingest.sync().await;
        println!(
            "Ingested {} readings from {} counters ({} failed), {} weather rows",
            report.readings_inserted,
            report.counters_seen,
            report.counters_failed,
            report.weather_rows
        );
        app.shutdown.shutdown().await;
        Ok(())
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.start_background_tasks().await;

        tracing::info!(
            host = %app.config.server.host,
            port = app.config.server.port,
            data_dir = %app.storage.data_dir().display(),
            ingest = app.config.ingest.enabled,
            "Server starting"
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    pub async fn start_background_tasks(&self) {
        self.shutdown
            .register(
                self.database
                    .start_checkpoint_task(self.shutdown.subscribe()),
            )
            .await;

        if let Some(h) = self.ingest.start_sync_task(self.shutdown.subscribe()) {
            self.shutdown.register(h).await;
        }

        tracing::debug!("Background tasks started");
    }
}
