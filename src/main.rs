#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dbag::collection::scheduler::{collect_and_log, spawn_collection_loop};
use dbag::collection::MetricManager;
use dbag::config::{self, load_configuration};
use dbag::http::server::run_http_server;
use dbag::http::state::HttpServerState;
use dbag::metric_types::{MetricTypeRegistry, register_builtin_types};
use dbag::storage::storage_factory::create_storage_from_connection_string;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{Level, event, info};

#[derive(Parser, Debug)]
#[command(name = "dbag", version, about = "Collects business metrics into a database")]
struct Cli {
    /// Defaults to `serve`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the HTTP server and the periodic collection
    Serve,
    /// Collect every metric once, then exit
    Collect,
    /// Create or migrate the database schema, then exit
    Migrate,
    /// List the registered metric types
    MetricTypes,
}

impl Command {
    /// `metric-types` only reads the registry and leaves the schema untouched.
    fn migrates_schema(self) -> bool {
        !matches!(self, Command::MetricTypes)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(async_main(cli.command.unwrap_or(Command::Serve)))
}

async fn async_main(command: Command) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    load_configuration().context("Failed to load configuration")?;
    let config = config::get().context("Failed to get configuration")?;

    let _sentry = config.sentry_dsn.as_ref().map(|dsn| {
        sentry::init((
            dsn.clone(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    info!("Connecting to storage: {}", config.storage_connection_string);
    let storage = create_storage_from_connection_string(&config.storage_connection_string)
        .await
        .context("Failed to create storage backend")?;

    let mut registry = MetricTypeRegistry::new();
    register_builtin_types(&mut registry, storage.clone());

    if !command.migrates_schema() {
        for (label, metric_type) in registry.list_registered() {
            println!("{}\t{}", label, metric_type.description());
        }
        return Ok(());
    }

    storage
        .create_or_migrate()
        .await
        .context("Failed to create or migrate database schema")?;
    if command == Command::Migrate {
        info!("Database schema is up to date");
        return Ok(());
    }

    let manager = Arc::new(
        MetricManager::new(Arc::new(registry), storage)
            .with_options(config.collect_options()?),
    );

    if command == Command::Collect {
        return match collect_and_log(&manager).await {
            Some(report) if report.is_success() => Ok(()),
            Some(report) => anyhow::bail!(
                "{} of {} metrics failed to collect",
                report.failures.len(),
                report.attempted()
            ),
            None => anyhow::bail!("Metric collection failed"),
        };
    }

    let collection_loop = spawn_collection_loop(
        manager.clone(),
        config.collect_interval()?,
        config.collect_on_startup,
    );

    let address = SocketAddr::from((config.endpoint, config.port));
    let result = run_http_server(
        HttpServerState {
            name: Arc::new("dbag".to_string()),
            manager,
        },
        address,
    )
    .await;
    collection_loop.abort();

    match result {
        Ok(()) => {
            event!(Level::INFO, "HTTP server stopped gracefully");
            Ok(())
        }
        Err(err) => {
            event!(Level::ERROR, "HTTP server failed: {:#}", err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["dbag"]);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["dbag", "metric-types"]);
        assert_eq!(cli.command, Some(Command::MetricTypes));
    }

    #[test]
    fn test_only_metric_types_skips_migrations() {
        assert!(!Command::MetricTypes.migrates_schema());
        assert!(Command::Serve.migrates_schema());
        assert!(Command::Collect.migrates_schema());
        assert!(Command::Migrate.migrates_schema());
    }
}
