//! Application configuration.
//!
//! Values are layered with the `config` crate: built-in defaults, then the
//! optional `config.toml` in the user config directory, then `FREEGAMES_*`
//! environment variables. Credentials never have a built-in value.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Directory under the user config dir holding `config.toml`.
pub const CONFIG_DIR_NAME: &str = "freegames";
/// Prefix for environment overrides (`FREEGAMES_API_KEY`, ...).
pub const ENV_PREFIX: &str = "FREEGAMES";

const DEFAULT_BASE_URL: &str = "https://free-to-play-games-database.p.rapidapi.com/api";
const DEFAULT_API_HOST: &str = "free-to-play-games-database.p.rapidapi.com";
const DEFAULT_LOADING_TIMEOUT_SECS: u64 = 5;

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# freegames configuration
#
# The API key can also be supplied through FREEGAMES_API_KEY.
api_key = ""
api_host = "free-to-play-games-database.p.rapidapi.com"
base_url = "https://free-to-play-games-database.p.rapidapi.com/api"

# Seconds before the UI reports that games are not loading.
loading_timeout_secs = 5

# connect_timeout_secs = 10
# log_dir = "/tmp/freegames-logs"
"#;

/// Runtime configuration shared by the API client and the front end.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Access credential sent as `x-rapidapi-key`.
    pub api_key: String,
    /// Target host sent as `x-rapidapi-host`.
    pub api_host: String,
    /// Base URL the `/games` and `/game` endpoints hang off.
    pub base_url: String,
    /// Caller-level safety timer for pending catalog loads.
    pub loading_timeout_secs: u64,
    /// Optional TCP connect timeout. Requests themselves never time out.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Directory for the log file; defaults to `./logs`.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the default file location and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path()?)
    }

    /// Load configuration using `path` as the (optional) file layer.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = base_builder()?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the API client cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            bail!(
                "no API key configured; set {}_API_KEY or api_key in the config file",
                ENV_PREFIX
            );
        }
        if self.base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }
        if self.api_host.trim().is_empty() {
            bail!("api_host must not be empty");
        }
        Ok(())
    }

    /// Safety timer used by the front end while a load is pending.
    pub fn loading_timeout(&self) -> Duration {
        Duration::from_secs(self.loading_timeout_secs)
    }

    /// Optional connect timeout for the HTTP client.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    /// Directory where the log file is written.
    pub fn log_dir(&self) -> Result<PathBuf> {
        match &self.log_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?.join("logs")),
        }
    }
}

fn base_builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(Config::builder()
        .set_default("api_key", "")?
        .set_default("api_host", DEFAULT_API_HOST)?
        .set_default("base_url", DEFAULT_BASE_URL)?
        .set_default("loading_timeout_secs", DEFAULT_LOADING_TIMEOUT_SECS as i64)?)
}

/// Location of `config.toml` inside the user configuration directory.
pub fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("unable to determine user config directory")?;
    Ok(base.join(CONFIG_DIR_NAME).join("config.toml"))
}

/// Write the commented template if no config file exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = default_config_path()?;
    write_template(&path)?;
    Ok(path)
}

fn write_template(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write default config {}", path.display()))
}
