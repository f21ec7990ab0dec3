// Environment configuration.
//
// Every key has a default so a bare checkout starts against a local
// development backend. A `.env` file in the working directory is honoured.

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const API_URL_KEY: &str = "SUPPORT_CONSOLE_API_URL";
pub const PREFERENCES_KEY: &str = "SUPPORT_CONSOLE_PREFERENCES";
pub const BIND_KEY: &str = "SUPPORT_CONSOLE_BIND";
pub const ADMIN_EMAIL_KEY: &str = "SUPPORT_CONSOLE_ADMIN_EMAIL";
pub const ADMIN_PASSWORD_KEY: &str = "SUPPORT_CONSOLE_ADMIN_PASSWORD";

const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_PREFERENCES: &str = ".support_console/preferences.json";
const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_ADMIN_EMAIL: &str = "admin@isp.local";
const DEFAULT_ADMIN_PASSWORD: &str = "admin";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be an http(s) URL, got {value:?}")]
    InvalidUrl { key: &'static str, value: String },

    #[error("{key} must be a socket address, got {value:?}")]
    InvalidBind { key: &'static str, value: String },

    #[error("{key} must not be blank")]
    Blank { key: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL every REST path is appended to.
    pub api_url: String,
    pub preferences_path: PathBuf,
    /// Listen address of the development backend.
    pub bind: SocketAddr,
    pub admin_email: String,
    pub admin_password: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(error = %err, "no .env file loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &'static str, default: &str| -> Result<String, ConfigError> {
            match lookup(key) {
                None => Ok(default.to_string()),
                Some(raw) if raw.trim().is_empty() => Err(ConfigError::Blank { key }),
                Some(raw) => Ok(raw.trim().to_string()),
            }
        };

        let api_url = value(API_URL_KEY, DEFAULT_API_URL)?;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl {
                key: API_URL_KEY,
                value: api_url,
            });
        }

        let raw_bind = value(BIND_KEY, DEFAULT_BIND)?;
        let bind = raw_bind.parse().map_err(|_| ConfigError::InvalidBind {
            key: BIND_KEY,
            value: raw_bind.clone(),
        })?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            preferences_path: PathBuf::from(value(PREFERENCES_KEY, DEFAULT_PREFERENCES)?),
            bind,
            admin_email: value(ADMIN_EMAIL_KEY, DEFAULT_ADMIN_EMAIL)?,
            admin_password: value(ADMIN_PASSWORD_KEY, DEFAULT_ADMIN_PASSWORD)?,
        })
    }
}

#[cfg(test)]
mod app_config_tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[rstest]
    fn it_should_fall_back_to_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_url, "http://127.0.0.1:8080");
        assert_eq!(config.bind, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.admin_email, "admin@isp.local");
    }

    #[rstest]
    fn it_should_trim_a_trailing_slash_from_the_api_url() {
        let config = config_from(&[(API_URL_KEY, "https://crm.isp.test/api/")]).unwrap();
        assert_eq!(config.api_url, "https://crm.isp.test/api");
    }

    #[rstest]
    #[case(API_URL_KEY, "crm.isp.test", "must be an http(s) URL")]
    #[case(BIND_KEY, "localhost", "must be a socket address")]
    #[case(ADMIN_PASSWORD_KEY, "  ", "must not be blank")]
    fn it_should_reject_invalid_values(#[case] key: &str, #[case] value: &str, #[case] message: &str) {
        let err = config_from(&[(key, value)]).unwrap_err();
        assert!(err.to_string().contains(message), "{err}");
    }
}
