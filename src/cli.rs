use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    ConfigOverrides, BACKEND_URL_ENV_VAR, CATALOG_URL_ENV_VAR, CONFIG_PATH_ENV_VAR,
    SESSION_PATH_ENV_VAR,
};

/// Search the Open Library catalog and keep a personal library in sync.
#[derive(Debug, Parser)]
#[command(name = "bookfinder", version, about)]
pub struct Cli {
    /// JSON config file.
    #[arg(long = "config", value_name = "PATH", env = CONFIG_PATH_ENV_VAR)]
    pub config_path: Option<PathBuf>,

    /// Base URL of the library backend.
    #[arg(long, value_name = "URL", env = BACKEND_URL_ENV_VAR)]
    pub backend_url: Option<String>,

    /// Base URL of the public catalog.
    #[arg(long, value_name = "URL", env = CATALOG_URL_ENV_VAR)]
    pub catalog_url: Option<String>,

    /// Where the session token is persisted.
    #[arg(long, value_name = "PATH", env = SESSION_PATH_ENV_VAR)]
    pub session_path: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config_path.clone(),
            backend_url: self.backend_url.clone(),
            catalog_url: self.catalog_url.clone(),
            session_path: self.session_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    fn clear_env() -> [EnvGuard; 4] {
        [
            set_env_guard(CONFIG_PATH_ENV_VAR, None),
            set_env_guard(BACKEND_URL_ENV_VAR, None),
            set_env_guard(CATALOG_URL_ENV_VAR, None),
            set_env_guard(SESSION_PATH_ENV_VAR, None),
        ]
    }

    #[test]
    fn no_flags_or_env_means_no_overrides() {
        let _lock = env_lock();
        let _guards = clear_env();

        let cli = Cli::try_parse_from(["bookfinder"]).expect("parse");
        assert_eq!(cli.overrides(), ConfigOverrides::default());
    }

    #[test]
    fn env_supplies_values() {
        let _lock = env_lock();
        let _guards = clear_env();
        let _backend = set_env_guard(BACKEND_URL_ENV_VAR, Some("https://books.example.com"));
        let _session = set_env_guard(SESSION_PATH_ENV_VAR, Some("/tmp/bookfinder.json"));

        let overrides = Cli::try_parse_from(["bookfinder"])
            .expect("parse")
            .overrides();

        assert_eq!(
            overrides.backend_url.as_deref(),
            Some("https://books.example.com")
        );
        assert_eq!(
            overrides.session_path,
            Some(PathBuf::from("/tmp/bookfinder.json"))
        );
    }

    #[test]
    fn flags_win_over_env() {
        let _lock = env_lock();
        let _guards = clear_env();
        let _backend = set_env_guard(BACKEND_URL_ENV_VAR, Some("https://from-env.example.com"));

        let overrides = Cli::try_parse_from([
            "bookfinder",
            "--backend-url",
            "http://localhost:8080",
            "--config",
            "bookfinder.json",
        ])
        .expect("parse")
        .overrides();

        assert_eq!(overrides.backend_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(overrides.config_path, Some(PathBuf::from("bookfinder.json")));
    }
}
