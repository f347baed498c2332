//! Application configuration
//!
//! Sources, lowest precedence first: the TOML file in the user config
//! directory, environment variables (a `.env` file is loaded first), then
//! command-line flags applied by the caller.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::Credentials;
use crate::api::resilience::ResilienceConfig;

pub const ENV_BASE_URL: &str = "INTEGRATION_BASE_URL";
pub const ENV_USERNAME: &str = "INTEGRATION_USERNAME";
pub const ENV_PASSWORD: &str = "INTEGRATION_PASSWORD";
pub const ENV_DEBUG: &str = "INTEGRATION_DEBUG";
pub const ENV_CONCURRENCY: &str = "INTEGRATION_CONCURRENCY";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub debug: Option<bool>,
    pub concurrency: Option<usize>,
    pub request_timeout_secs: Option<u64>,
}

/// Effective configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Option<String>,
    pub credentials: Option<Credentials>,
    pub resilience: ResilienceConfig,
    pub debug: bool,
}

impl Config {
    /// `<config dir>/integration-cli/config.toml`
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("integration-cli").join("config.toml"))
    }

    /// Load from the config file and the process environment
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = match Self::config_path() {
            Some(path) if path.exists() => load_file(&path)?,
            _ => FileConfig::default(),
        };

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with environment lookups; the environment wins
    pub fn from_sources(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = env(ENV_BASE_URL).or(file.base_url);
        let username = env(ENV_USERNAME).or(file.username);
        let password = env(ENV_PASSWORD).or(file.password);

        let debug = match env(ENV_DEBUG) {
            Some(value) => parse_bool(&value)
                .with_context(|| format!("Invalid {}: {}", ENV_DEBUG, value))?,
            None => file.debug.unwrap_or(false),
        };

        let concurrency = match env(ENV_CONCURRENCY) {
            Some(value) => Some(
                value
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid {}: {}", ENV_CONCURRENCY, value))?,
            ),
            None => file.concurrency,
        };

        let mut resilience = ResilienceConfig::builder().diagnostics(debug);
        if let Some(concurrency) = concurrency {
            resilience = resilience.max_concurrent_requests(concurrency);
        }
        if let Some(secs) = file.request_timeout_secs {
            resilience = resilience.request_timeout(Duration::from_secs(secs));
        }

        let credentials = match (username, password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => None,
        };

        Ok(Self {
            base_url,
            credentials,
            resilience: resilience.build(),
            debug,
        })
    }

    pub fn require_base_url(&self) -> Result<&str> {
        self.base_url.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "No tenant URL configured. Set {} or base_url in the config file, or pass --base-url.",
                ENV_BASE_URL
            )
        })
    }
}

fn load_file(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_file() {
        let file: FileConfig = toml::from_str(
            r#"
            base_url = "https://tenant.example.com"
            username = "svc"
            password = "secret"
            concurrency = 4
            request_timeout_secs = 10
            "#,
        )
        .unwrap();

        let config = Config::from_sources(file, env_from(&[])).unwrap();
        assert_eq!(config.require_base_url().unwrap(), "https://tenant.example.com");
        assert_eq!(config.credentials.unwrap().username, "svc");
        assert_eq!(config.resilience.concurrency.max_concurrent_requests, 4);
        assert_eq!(config.resilience.request_timeout, Duration::from_secs(10));
        assert!(!config.debug);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = FileConfig {
            base_url: Some("https://file.example.com".into()),
            concurrency: Some(4),
            ..Default::default()
        };
        let env = env_from(&[
            (ENV_BASE_URL, "https://env.example.com"),
            (ENV_CONCURRENCY, "9"),
            (ENV_DEBUG, "true"),
        ]);

        let config = Config::from_sources(file, env).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://env.example.com"));
        assert_eq!(config.resilience.concurrency.max_concurrent_requests, 9);
        assert!(config.debug);
        assert!(config.resilience.monitoring.diagnostics);
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(FileConfig::default(), env_from(&[])).unwrap();
        assert!(config.base_url.is_none());
        assert!(config.credentials.is_none());
        assert_eq!(config.resilience.concurrency.max_concurrent_requests, 7);
        assert!(config.require_base_url().is_err());
    }

    #[test]
    fn test_invalid_env_values() {
        let bad_debug = env_from(&[(ENV_DEBUG, "maybe")]);
        assert!(Config::from_sources(FileConfig::default(), bad_debug).is_err());

        let bad_concurrency = env_from(&[(ENV_CONCURRENCY, "many")]);
        assert!(Config::from_sources(FileConfig::default(), bad_concurrency).is_err());
    }
}
