//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. Missing or placeholder credentials for the
//! hosted services do not stop the server; they are reported as configuration
//! issues and shown to users as a persistent banner.

use serde::Serialize;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// A credential that is absent or still holds a template value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationIssue {
    pub variable: String,
    pub message: String,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub chat_model: String,
    pub chat_timeout: Duration,
    pub app_url: String,
    pub debug: bool,
    pub log_level: Level,
    pub cookie_secure: bool,
}

const PLACEHOLDER_MARKERS: [&str; 8] = [
    "your-", "your_", "tu-", "tu_", "placeholder", "xxx", "changeme", "example",
];

/// True when a credential is empty or still looks like a template value.
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value.is_empty() || PLACEHOLDER_MARKERS.iter().any(|marker| value.contains(marker))
}

fn usable(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !is_placeholder(v))
}

fn parse_bool(name: &str, raw: Option<String>) -> Result<bool, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some("1") | Some("true") | Some("TRUE") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("FALSE") | Some("no") => Ok(false),
        Some(other) => Err(ConfigError::InvalidValue(
            name.to_string(),
            format!("'{}' is not a boolean", other),
        )),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let debug = parse_bool("DEBUG", lookup("DEBUG"))?;
        let default_level = if debug { "DEBUG" } else { "INFO" };
        let (level_var, log_level_str) = match (lookup("RUST_LOG"), lookup("LOG_LEVEL")) {
            (Some(level), _) => ("RUST_LOG", level),
            (None, Some(level)) => ("LOG_LEVEL", level),
            (None, None) => ("RUST_LOG", default_level.to_string()),
        };
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                level_var.to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let app_url = lookup("APP_URL").unwrap_or_else(|| "http://localhost:3000".to_string());
        let cookie_secure = parse_bool("COOKIE_SECURE", lookup("COOKIE_SECURE"))?;

        // --- Hosted Service Credentials (as optional) ---
        let supabase_url = lookup("SUPABASE_URL").map(|url| url.trim_end_matches('/').to_string());
        let supabase_anon_key = lookup("SUPABASE_ANON_KEY");
        let gemini_api_key = lookup("GEMINI_API_KEY");

        // --- Chat Settings ---
        let gemini_base_url =
            lookup("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());
        let chat_model = lookup("CHAT_MODEL").unwrap_or_else(|| "gemini-1.5-flash".to_string());
        let chat_timeout_secs = match lookup("CHAT_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "CHAT_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a number of seconds", raw),
                )
            })?,
            None => 15,
        };

        Ok(Self {
            bind_address,
            supabase_url,
            supabase_anon_key,
            gemini_api_key,
            gemini_base_url,
            chat_model,
            chat_timeout: Duration::from_secs(chat_timeout_secs),
            app_url,
            debug,
            log_level,
            cookie_secure,
        })
    }

    /// Credentials that are missing or still hold template values.
    pub fn configuration_issues(&self) -> Vec<ConfigurationIssue> {
        let checks = [
            ("SUPABASE_URL", &self.supabase_url),
            ("SUPABASE_ANON_KEY", &self.supabase_anon_key),
            ("GEMINI_API_KEY", &self.gemini_api_key),
        ];
        let mut issues: Vec<ConfigurationIssue> = checks
            .into_iter()
            .filter_map(|(variable, value)| {
                let message = match value {
                    None => "is not set",
                    Some(v) if is_placeholder(v) => "still holds a placeholder value",
                    Some(_) => return None,
                };
                Some(ConfigurationIssue {
                    variable: variable.to_string(),
                    message: format!("{variable} {message}"),
                })
            })
            .collect();

        if let Some(url) = usable(&self.supabase_url) {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                issues.push(ConfigurationIssue {
                    variable: "SUPABASE_URL".to_string(),
                    message: "SUPABASE_URL must be an http(s) URL".to_string(),
                });
            }
        }
        issues
    }

    /// The hosted backend URL and key, if both are real values.
    pub fn backend_credentials(&self) -> Option<(String, String)> {
        let url = usable(&self.supabase_url)?;
        let key = usable(&self.supabase_anon_key)?;
        url.starts_with("http").then(|| (url.to_string(), key.to_string()))
    }

    pub fn chat_api_key(&self) -> Option<String> {
        usable(&self.gemini_api_key).map(str::to_string)
    }
}
