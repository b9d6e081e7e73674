// ABOUTME: Environment-based configuration for the database, completion API and logging
// ABOUTME: Parses env vars with typed defaults and validates them before injection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::fmt;
use std::str::FromStr;

use honing_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Default `SQLite` database location
const DEFAULT_DATABASE_URL: &str = "sqlite:./data/honing_inn.db";

/// Default completion API endpoint
const DEFAULT_PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";

/// Default online model
const DEFAULT_PERPLEXITY_MODEL: &str = "llama-3.1-sonar-large-128k-online";

/// Default completion length
const DEFAULT_MAX_TOKENS: u32 = 512;

/// Default HTTP timeout applied by the completion client
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Deployed
    Production,
    /// Test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Settings for the chat-completions API
///
/// Resolved once at startup and handed to prompt construction and to the
/// completion client. The engine never consults the environment itself.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionSettings {
    /// Bearer token; `None` makes every invocation fail with a configuration error
    pub api_token: Option<String>,
    /// API base URL without the `/chat/completions` suffix
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Completion length cap
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling
    pub top_p: f32,
    /// Discourages repeating list items across a long reply
    pub frequency_penalty: f32,
    /// Whole-request timeout enforced by the HTTP client
    pub timeout_secs: u64,
}

impl fmt::Debug for CompletionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSettings")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("frequency_penalty", &self.frequency_penalty)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: DEFAULT_PERPLEXITY_BASE_URL.to_owned(),
            model: DEFAULT_PERPLEXITY_MODEL.to_owned(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.2,
            top_p: 0.9,
            frequency_penalty: 1.0,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CompletionSettings {
    /// Environment variable holding the API token
    pub const TOKEN_ENV_VAR: &'static str = "PERPLEXITY_API_TOKEN";

    /// Settings with an explicit token and defaults for everything else
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            api_token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Load settings from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            api_token: env::var(Self::TOKEN_ENV_VAR)
                .ok()
                .filter(|token| !token.trim().is_empty()),
            base_url: env_var_or("PERPLEXITY_BASE_URL", &defaults.base_url),
            model: env_var_or("PERPLEXITY_MODEL", &defaults.model),
            max_tokens: parse_env("PERPLEXITY_MAX_TOKENS", defaults.max_tokens)?,
            temperature: parse_env("PERPLEXITY_TEMPERATURE", defaults.temperature)?,
            top_p: defaults.top_p,
            frequency_penalty: defaults.frequency_penalty,
            timeout_secs: parse_env("PERPLEXITY_TIMEOUT_SECS", defaults.timeout_secs)?,
        })
    }
}

/// Process-wide configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// `SQLite` connection string
    pub database_url: String,
    /// Completion API settings
    pub completion: CompletionSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is present but malformed
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            database_url: env_var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            completion: CompletionSettings::from_env()?,
        };

        info!(
            environment = %config.environment,
            database_url = %config.database_url,
            model = %config.completion.model,
            token_present = config.completion.api_token.is_some(),
            "Configuration loaded"
        );

        Ok(config)
    }
}

/// Read an environment variable, falling back to a default
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an optional environment variable into a typed value
fn parse_env<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config_invalid(format!("Invalid {key} value: {raw}"))),
        Err(_) => Ok(default),
    }
}
