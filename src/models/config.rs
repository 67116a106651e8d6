//! Configuration model loaded from external sources.

use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, sanitize_limit};

/// Minimum length of the cookie signing key.
pub const MIN_SECRET_LEN: usize = 64;

/// Which backend host the console talks to.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    #[default]
    Local,
    Dev,
}

impl AppEnv {
    pub fn as_str(self) -> &'static str {
        match self {
            AppEnv::Local => "local",
            AppEnv::Dev => "dev",
        }
    }
}

impl FromStr for AppEnv {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "local" => Ok(AppEnv::Local),
            "dev" => Ok(AppEnv::Dev),
            other => Err(ConfigError::UnknownEnv(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown APP_ENV `{0}` (expected `local` or `dev`)")]
    UnknownEnv(String),

    #[error("secret must be at least {MIN_SECRET_LEN} bytes")]
    ShortSecret,

    #[error("backend base URL for `{0}` is empty")]
    MissingBackendUrl(&'static str),
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_items_per_page() -> u32 {
    DEFAULT_ITEMS_PER_PAGE
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub templates_dir: String,
    pub secret: String,
    #[serde(default)]
    pub app_env: AppEnv,
    #[serde(default)]
    pub backend_base_url_local: String,
    #[serde(default)]
    pub backend_base_url_dev: String,
    #[serde(default = "default_timeout_secs")]
    pub backend_timeout_secs: u64,
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,
}

impl ServerConfig {
    /// Backend host selected by [`AppEnv`], without a trailing slash.
    pub fn backend_base_url(&self) -> &str {
        let url = match self.app_env {
            AppEnv::Local => &self.backend_base_url_local,
            AppEnv::Dev => &self.backend_base_url_dev,
        };
        url.trim_end_matches('/')
    }

    /// `BACKEND_BASE_URL_LOCAL` / `BACKEND_BASE_URL_DEV` win over file values.
    pub fn with_backend_overrides(mut self, local: Option<String>, dev: Option<String>) -> Self {
        if let Some(url) = local.filter(|url| !url.trim().is_empty()) {
            self.backend_base_url_local = url;
        }
        if let Some(url) = dev.filter(|url| !url.trim().is_empty()) {
            self.backend_base_url_dev = url;
        }
        self
    }

    /// Checks values the server cannot start without and normalizes the rest.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::ShortSecret);
        }
        if self.backend_base_url().trim().is_empty() {
            return Err(ConfigError::MissingBackendUrl(self.app_env.as_str()));
        }
        self.items_per_page = sanitize_limit(Some(self.items_per_page));
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            domain: "localhost".into(),
            address: "127.0.0.1".into(),
            port: 8080,
            templates_dir: "templates/**/*".into(),
            secret: "x".repeat(64),
            app_env: AppEnv::Local,
            backend_base_url_local: "http://localhost:3000/".into(),
            backend_base_url_dev: "https://dev.example.com".into(),
            backend_timeout_secs: 30,
            items_per_page: 10,
        }
    }

    #[test]
    fn app_env_selects_backend_host() {
        let mut config = config();
        assert_eq!(config.backend_base_url(), "http://localhost:3000");
        config.app_env = AppEnv::Dev;
        assert_eq!(config.backend_base_url(), "https://dev.example.com");
        assert_eq!("DEV".parse::<AppEnv>(), Ok(AppEnv::Dev));
        assert!("prod".parse::<AppEnv>().is_err());
    }

    #[test]
    fn environment_overrides_win() {
        let config = config().with_backend_overrides(Some("http://10.0.0.2:3000".into()), None);
        assert_eq!(config.backend_base_url(), "http://10.0.0.2:3000");
        assert_eq!(config.backend_base_url_dev, "https://dev.example.com");
    }

    #[test]
    fn validation_rejects_short_secret_and_odd_page_size() {
        let mut short = config();
        short.secret = "short".into();
        assert_eq!(short.validated().unwrap_err(), ConfigError::ShortSecret);

        let mut odd = config();
        odd.items_per_page = 7;
        assert_eq!(odd.validated().unwrap().items_per_page, 10);
    }
}
