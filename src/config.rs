use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use directories_next::ProjectDirs;
use serde::Deserialize;

/// Name of the config file looked up when no path is given.
const CONFIG_FILE_NAME: &str = "pastelet.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// Public URL prefix for links to pastes. Derived from the request's
    /// `Host` header when unset.
    pub base_url: Option<String>,
    /// Sweep expired pastes on this period while serving. Unset means
    /// expired pastes are only removed when someone requests them.
    pub purge_interval_secs: Option<u64>,
    pub database: Database,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            base_url: None,
            purge_interval_secs: None,
            database: Database::default(),
        }
    }
}

impl Default for Database {
    fn default() -> Self {
        Database {
            url: "sqlite://pastelet.db?mode=rwc".into(),
            max_connections: 5,
        }
    }
}

impl Config {
    /// Load the config file (if any), then apply environment overrides.
    ///
    /// An explicitly given path must exist. Otherwise `./pastelet.toml` and
    /// the platform config directory are tried in order, and defaults are
    /// used when neither exists.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Override settings from environment variables. Empty values count as
    /// unset.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        let lookup = |key: &str| var(key).filter(|value| !value.is_empty());

        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port.parse().context("PORT is not a valid port number")?;
        }
        if let Some(base_url) = lookup("BASE_URL") {
            self.base_url = Some(base_url);
        }
        if let Some(secs) = lookup("PURGE_INTERVAL_SECS") {
            self.purge_interval_secs = Some(
                secs.parse()
                    .context("PURGE_INTERVAL_SECS is not a number of seconds")?,
            );
        }

        Ok(())
    }

    fn validate(&mut self) -> anyhow::Result<()> {
        if let Some(base_url) = &mut self.base_url {
            let trimmed = base_url.trim_end_matches('/').len();
            base_url.truncate(trimmed);
        }
        if self.purge_interval_secs == Some(0) {
            bail!("purge_interval_secs must be greater than zero");
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be greater than zero");
        }
        Ok(())
    }
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dirs) = ProjectDirs::from("", "", "pastelet") {
        paths.push(dirs.config_dir().join(CONFIG_FILE_NAME));
    }
    paths
}
