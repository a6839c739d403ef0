//! Runtime configuration: where the API lives and where local state goes.
//!
//! Precedence is command-line flag, then environment variable, then default.

use std::path::PathBuf;

use crate::api::{normalize_api_url, DEFAULT_API_URL};

pub const ENV_API_URL: &str = "DINEDESK_API_URL";
pub const ENV_DATA_DIR: &str = "DINEDESK_DATA_DIR";

const APP_DIR_NAME: &str = "dinedesk";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn resolve(api_url: Option<String>, data_dir: Option<PathBuf>) -> Self {
        let api_url = api_url
            .or_else(|| env_non_empty(ENV_API_URL))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let data_dir = data_dir
            .or_else(|| env_non_empty(ENV_DATA_DIR).map(PathBuf::from))
            .unwrap_or_else(default_data_dir);
        Config {
            api_url: normalize_api_url(&api_url),
            data_dir,
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Per-user application data directory.
pub fn default_data_dir() -> PathBuf {
    let base = std::env::var("LOCALAPPDATA")
        .or_else(|_| std::env::var("XDG_DATA_HOME"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(target_os = "windows")]
            {
                PathBuf::from(std::env::var("USERPROFILE").unwrap_or_else(|_| ".".into()))
                    .join("AppData")
                    .join("Local")
            }
            #[cfg(not(target_os = "windows"))]
            {
                PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()))
                    .join(".local")
                    .join("share")
            }
        });
    base.join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var(ENV_API_URL);
        std::env::remove_var(ENV_DATA_DIR);
    }

    #[test]
    #[serial]
    fn defaults_apply_without_flags_or_env() {
        clear_env();
        let config = Config::resolve(None, None);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.data_dir.ends_with(APP_DIR_NAME));
        assert_eq!(config.log_dir(), config.data_dir.join("logs"));
    }

    #[test]
    #[serial]
    fn env_overrides_default() {
        clear_env();
        std::env::set_var(ENV_API_URL, "api.example.com/api/");
        std::env::set_var(ENV_DATA_DIR, "/tmp/dinedesk-test");
        let config = Config::resolve(None, None);
        assert_eq!(config.api_url, "https://api.example.com/api");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/dinedesk-test"));
        clear_env();
    }

    #[test]
    #[serial]
    fn flag_overrides_env() {
        clear_env();
        std::env::set_var(ENV_API_URL, "https://env.example/api");
        let config = Config::resolve(Some("localhost:8080/api".into()), None);
        assert_eq!(config.api_url, "http://localhost:8080/api");
        clear_env();
    }

    #[test]
    #[serial]
    fn blank_env_is_ignored() {
        clear_env();
        std::env::set_var(ENV_API_URL, "   ");
        let config = Config::resolve(None, None);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        clear_env();
    }
}
