//! Configuration manager for accounts.
//!
//! Values come from built-in defaults, then an optional `config.yaml`,
//! then environment variables.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "accounts";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors that may occur during the configuration loading process.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to deserialize configuration file: {0}")]
    Deserialize(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("`{key}` must be a port number, got {value:?}")]
    InvalidPort { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// HTTP listening port.
    pub port: u16,
    /// Expose Prometheus metrics on `GET /metrics`.
    pub metrics: bool,
    /// Related to PostgreSQL configuration.
    #[serde(skip_serializing)]
    pub postgres: Postgres,
}

/// PostgreSQL configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Postgres {
    /// Hostname of PostgreSQL instance.
    pub host: String,
    pub port: u16,
    /// Database name.
    pub database: String,
    /// Username credential to connect.
    pub username: String,
    /// Password credential to connect.
    pub password: String,
    /// Maximum pool connections.
    pub pool_size: u32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            metrics: false,
            postgres: Postgres::default(),
        }
    }
}

impl Default for Postgres {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5432,
            database: DEFAULT_DATABASE_NAME.into(),
            username: DEFAULT_CREDENTIALS.into(),
            password: DEFAULT_CREDENTIALS.into(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl Configuration {
    /// Load the whole configuration from the process environment.
    ///
    /// `CONFIG_PATH` selects the YAML file, `config.yaml` otherwise.
    pub fn load() -> Result<Self, Error> {
        let path = std::env::var("CONFIG_PATH")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());

        Self::read(Path::new(&path))?.with_env(|key| std::env::var(key).ok())
    }

    /// Reads a YAML file. A missing file yields the defaults.
    pub fn read(path: &Path) -> Result<Self, Error> {
        match File::open(path) {
            Ok(file) => Ok(serde_yaml::from_reader(file)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                Ok(Self::default())
            },
            Err(err) => Err(err.into()),
        }
    }

    /// Override values with environment variables, read through `var`.
    pub fn with_env<F>(mut self, var: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(user) = var("DB_USER") {
            self.postgres.username = user;
        }
        if let Some(host) = var("DB_HOST") {
            self.postgres.host = host;
        }
        if let Some(database) = var("DB_DATABASE") {
            self.postgres.database = database;
        }
        if let Some(password) = var("DB_PASSWORD") {
            self.postgres.password = password;
        }
        if let Some(port) = var("DB_PORT") {
            self.postgres.port = parse_port("DB_PORT", port)?;
        }
        if let Some(port) = var("PORT") {
            self.port = parse_port("PORT", port)?;
        }

        Ok(self)
    }
}

fn parse_port(key: &'static str, value: String) -> Result<u16, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidPort { key, value })
}
