//! Server configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file,
//! then `PATIENTS_*` environment variables (e.g. `PATIENTS_PORT=9000`).

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATA_PATH: &str = "patients.json";
/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "patients";

/// Which record store backs the service.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub backend: StorageBackend,
}

impl ServerConfig {
    /// Load configuration. An explicit `config_file` must exist; the default
    /// `patients.toml` is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("data_path", DEFAULT_DATA_PATH)?
            .set_default("backend", "json")?
            .add_source(file)
            .add_source(Environment::with_prefix("PATIENTS"))
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
