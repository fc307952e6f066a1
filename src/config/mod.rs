use anyhow::Error;
use confique::Config;
use std::{
    net::IpAddr,
    sync::{Arc, OnceLock},
    time::Duration,
};

use crate::collection::CollectOptions;

#[derive(Debug, Config)]
pub struct DbagConfig {
    #[config(env = "DBAG_PORT", default = 3000)]
    pub port: u16,
    #[config(env = "DBAG_ENDPOINT", default = "127.0.0.1")]
    pub endpoint: IpAddr,

    #[config(env = "DBAG_HTTP_SERVER_TIMEOUT_SECONDS", default = 30)]
    pub http_server_timeout_seconds: u64,

    #[config(env = "DBAG_STORAGE_CONNECTION_STRING", default = "sqlite://dbag.db")]
    pub storage_connection_string: String,

    /// Daily by default
    #[config(env = "DBAG_COLLECT_INTERVAL_SECONDS", default = 86400)]
    pub collect_interval_seconds: u64,

    #[config(env = "DBAG_COLLECT_TIMEOUT_SECONDS", default = 30)]
    pub collect_timeout_seconds: u64,

    #[config(env = "DBAG_COLLECT_CONCURRENCY", default = 1)]
    pub collect_concurrency: usize,

    #[config(env = "DBAG_COLLECT_ON_STARTUP", default = false)]
    pub collect_on_startup: bool,

    #[config(env = "DBAG_SENTRY_DSN")]
    pub sentry_dsn: Option<String>,
}

impl DbagConfig {
    pub fn load() -> Result<DbagConfig, Error> {
        let c = DbagConfig::builder().env().file("settings.toml").load()?;

        Ok(c)
    }

    pub fn collect_options(&self) -> Result<CollectOptions, Error> {
        if self.collect_concurrency == 0 {
            anyhow::bail!("Collect concurrency must be at least 1");
        }
        if self.collect_timeout_seconds == 0 {
            anyhow::bail!("Collect timeout must be at least 1 second");
        }
        Ok(CollectOptions {
            timeout: Duration::from_secs(self.collect_timeout_seconds),
            concurrency: self.collect_concurrency,
        })
    }

    pub fn collect_interval(&self) -> Result<Duration, Error> {
        if self.collect_interval_seconds == 0 {
            anyhow::bail!("Collect interval must be at least 1 second");
        }
        Ok(Duration::from_secs(self.collect_interval_seconds))
    }
}

static DBAG_CONFIG: OnceLock<Arc<DbagConfig>> = OnceLock::new();

pub fn get() -> Result<Arc<DbagConfig>, Error> {
    DBAG_CONFIG.get().cloned().ok_or_else(|| {
        Error::msg(
            "Configuration not loaded. Please call load_configuration() before using the configuration",
        )
    })
}

pub fn load_configuration() -> Result<(), Error> {
    // Check if the configuration has already been loaded
    if DBAG_CONFIG.get().is_some() {
        return Ok(());
    }

    let config = DbagConfig::load()?;
    DBAG_CONFIG.get_or_init(|| Arc::new(config));

    Ok(())
}
