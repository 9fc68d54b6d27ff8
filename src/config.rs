//! Client configuration.
//!
//! Resolution order, later wins: built-in defaults, the JSON config file,
//! then explicit overrides (environment variables and command-line flags).
//!
//! ```json
//! {
//!   "backend_url": "https://books.example.com/api",
//!   "catalog_url": "https://openlibrary.org",
//!   "session_path": ".bookfinder/session.json",
//!   "notification_ms": 3000,
//!   "timeout_sec": 30
//! }
//! ```
//!
//! Every field is optional. Unknown fields are rejected. `notification_ms`
//! and `timeout_sec` must be > 0 when provided. A relative `session_path` is
//! resolved against the working directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use catalog_api::DEFAULT_CATALOG_BASE_URL;
use library_api::DEFAULT_BACKEND_BASE_URL;
use serde::Deserialize;
use session_store::default_session_path;
use thiserror::Error;
use url::Url;

use crate::notify::DEFAULT_NOTIFICATION_TTL;

pub const CONFIG_PATH_ENV_VAR: &str = "BOOKFINDER_CONFIG_PATH";
pub const BACKEND_URL_ENV_VAR: &str = "BOOKFINDER_BACKEND_URL";
pub const CATALOG_URL_ENV_VAR: &str = "BOOKFINDER_CATALOG_URL";
pub const SESSION_PATH_ENV_VAR: &str = "BOOKFINDER_SESSION_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("`{field}` must be > 0")]
    NotPositive { field: &'static str },
    #[error("`{field}` is not an absolute http(s) URL: {value}")]
    InvalidUrl { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookfinderConfig {
    pub backend_url: String,
    pub catalog_url: String,
    pub session_path: PathBuf,
    pub notification_ttl: Duration,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    backend_url: Option<String>,
    catalog_url: Option<String>,
    session_path: Option<PathBuf>,
    notification_ms: Option<u64>,
    timeout_sec: Option<u64>,
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub backend_url: Option<String>,
    pub catalog_url: Option<String>,
    pub session_path: Option<PathBuf>,
}

impl BookfinderConfig {
    pub fn defaults(cwd: &Path) -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_BASE_URL.to_string(),
            catalog_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            session_path: default_session_path(cwd),
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
            timeout: None,
        }
    }

    pub fn load(cwd: &Path, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = Self::defaults(cwd);

        if let Some(path) = non_empty_path(overrides.config_path.as_deref()) {
            let path = resolve(cwd, path);
            let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            let file = serde_json::from_str::<FileConfig>(&raw)
                .map_err(|source| ConfigError::Parse { path, source })?;
            config.apply_file(cwd, file)?;
        }

        config.apply_overrides(cwd, overrides);
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, cwd: &Path, file: FileConfig) -> Result<(), ConfigError> {
        if let Some(value) = non_blank(file.backend_url.as_deref()) {
            self.backend_url = value;
        }
        if let Some(value) = non_blank(file.catalog_url.as_deref()) {
            self.catalog_url = value;
        }
        if let Some(path) = non_empty_path(file.session_path.as_deref()) {
            self.session_path = resolve(cwd, path);
        }
        if let Some(millis) = file.notification_ms {
            if millis == 0 {
                return Err(ConfigError::NotPositive {
                    field: "notification_ms",
                });
            }
            self.notification_ttl = Duration::from_millis(millis);
        }
        if let Some(seconds) = file.timeout_sec {
            if seconds == 0 {
                return Err(ConfigError::NotPositive {
                    field: "timeout_sec",
                });
            }
            self.timeout = Some(Duration::from_secs(seconds));
        }
        Ok(())
    }

    fn apply_overrides(&mut self, cwd: &Path, overrides: &ConfigOverrides) {
        if let Some(value) = non_blank(overrides.backend_url.as_deref()) {
            self.backend_url = value;
        }
        if let Some(value) = non_blank(overrides.catalog_url.as_deref()) {
            self.catalog_url = value;
        }
        if let Some(path) = non_empty_path(overrides.session_path.as_deref()) {
            self.session_path = resolve(cwd, path);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_url("backend_url", &self.backend_url)?;
        check_url("catalog_url", &self.catalog_url)
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn non_empty_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|path| !path.as_os_str().is_empty())
}

fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
