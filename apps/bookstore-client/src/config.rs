//! Layered configuration for the storefront client.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. YAML file given with `--config`
//! 3. environment variables `BOOKSTORE__<SECTION>__<KEY>`
//! 4. command-line flags

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bookstore_http::{DEFAULT_USER_AGENT, HttpClient, HttpClientBuilder, TransportSecurity};
use bookstore_session::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "BOOKSTORE__";

const STORAGE_DIR: &str = "bookstore-client";
const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file does not exist: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid api.timeout {value:?}: {source}")]
    InvalidTimeout {
        value: String,
        #[source]
        source: humantime::DurationError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub locale: LocaleConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Backend root, e.g. `https://api.bookstore.example/api`.
    pub base_url: String,
    /// Per-request timeout in humantime notation (`30s`, `1m 30s`).
    pub timeout: String,
    pub user_agent: Option<String>,
    /// Accept plain `http://` backends.
    pub allow_insecure_http: bool,
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:5001/api".to_owned(),
            timeout: "30s".to_owned(),
            user_agent: None,
            allow_insecure_http: false,
            max_body_size: 10 * 1024 * 1024,
        }
    }
}

impl ApiConfig {
    /// # Errors
    /// Returns [`ConfigError::InvalidTimeout`] if `timeout` does not parse.
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(self.timeout.trim()).map_err(|source| {
            ConfigError::InvalidTimeout {
                value: self.timeout.clone(),
                source,
            }
        })
    }

    /// Client builder for this section. The request context is attached
    /// later, once storage is open.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidTimeout`] if `timeout` does not parse.
    pub fn http_builder(&self) -> Result<HttpClientBuilder, ConfigError> {
        let mut builder = HttpClient::builder()
            .timeout(self.timeout()?)
            .max_body_size(self.max_body_size)
            .user_agent(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT));
        if self.allow_insecure_http {
            builder = builder.transport(TransportSecurity::AllowInsecureHttp);
        }
        Ok(builder)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// JSON file for the `file` backend. Defaults to the platform data
    /// directory.
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map_or_else(|| PathBuf::from("."), |dir| dir.join(STORAGE_DIR))
                .join(STORAGE_FILE)
        })
    }

    /// # Errors
    /// Returns a [`StorageError`] if the storage file cannot be opened.
    pub fn open(&self) -> Result<Arc<dyn KeyValueStore>, StorageError> {
        match self.backend {
            StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
            StorageBackend::File => Ok(Arc::new(JsonFileStore::open(self.resolved_path())?)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocaleConfig {
    /// Language used until the user picks one.
    pub default: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default: bookstore_http::DEFAULT_LOCALE.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            json: false,
        }
    }
}

/// Flag values that override every other source.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub storage: Option<PathBuf>,
    pub memory_storage: bool,
    pub verbose: u8,
}

impl AppConfig {
    /// Defaults, then `path`, then the environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingFile`] when `path` is given but absent,
    /// and [`ConfigError::Load`] when a source does not parse or does not
    /// match the schema.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file(path));
        }

        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;
        config.api.timeout()?;
        Ok(config)
    }

    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(url) = &cli.base_url {
            self.api.base_url.clone_from(url);
        }
        if let Some(path) = &cli.storage {
            self.storage.backend = StorageBackend::File;
            self.storage.path = Some(path.clone());
        }
        if cli.memory_storage {
            self.storage.backend = StorageBackend::Memory;
        }
        match cli.verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
    }

    /// # Errors
    /// Returns an error if the configuration cannot be rendered.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_saphyr::to_string(self)?)
    }
}
