//! Configuration types for homework-bot
//!
//! The configuration is built once at startup, usually via [`Config::from_env`],
//! and passed by reference to the components that need it. Nothing reads the
//! environment after that.

use crate::error::{Error, Result};
use std::fmt;
use std::time::Duration;

/// Environment variable holding the homework API OAuth token
pub const ENV_PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
/// Environment variable holding the Telegram bot token
pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
/// Environment variable holding the target Telegram chat id
pub const ENV_TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
/// Optional override of the homework API endpoint
pub const ENV_HOMEWORK_ENDPOINT: &str = "HOMEWORK_ENDPOINT";
/// Optional override of the Telegram Bot API base URL
pub const ENV_TELEGRAM_API_BASE: &str = "TELEGRAM_API_BASE";
/// Optional override of the poll interval, in seconds
pub const ENV_RETRY_PERIOD_SECS: &str = "RETRY_PERIOD_SECS";
/// Optional override of the HTTP request timeout, in seconds
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";

/// Secrets needed to talk to the homework API and Telegram
///
/// All three are mandatory. `Debug` output redacts the tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth token for the homework API
    pub practicum_token: String,
    /// Telegram bot token
    pub telegram_token: String,
    /// Chat that receives the notifications
    pub telegram_chat_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

/// Homework API settings
#[derive(Clone, Debug, PartialEq)]
pub struct ApiConfig {
    /// `homework_statuses` endpoint (default: Practicum production URL)
    pub endpoint: String,

    /// Timeout applied to each request (default: 30 seconds)
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout: default_request_timeout(),
        }
    }
}

/// Telegram Bot API settings
#[derive(Clone, Debug, PartialEq)]
pub struct TelegramConfig {
    /// Bot API base URL, without the `/bot<token>` suffix (default: "https://api.telegram.org")
    pub api_base: String,

    /// Timeout applied to each `sendMessage` call (default: 30 seconds)
    pub timeout: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_telegram_api_base(),
            timeout: default_request_timeout(),
        }
    }
}

/// Poll loop settings
#[derive(Clone, Debug, PartialEq)]
pub struct PollConfig {
    /// Fixed pause between cycles, successful or not (default: 600 seconds)
    pub retry_period: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            retry_period: default_retry_period(),
        }
    }
}

/// Main configuration for the bot
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// API tokens and target chat
    pub credentials: Credentials,

    /// Homework API settings
    pub api: ApiConfig,

    /// Telegram settings
    pub telegram: TelegramConfig,

    /// Poll loop settings
    pub polling: PollConfig,
}

impl Config {
    /// Create a config with the given credentials and default settings
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            api: ApiConfig::default(),
            telegram: TelegramConfig::default(),
            polling: PollConfig::default(),
        }
    }

    /// Build the configuration from process environment variables
    ///
    /// # Errors
    ///
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    ///
    /// Empty values count as missing. Optional overrides fall back to their
    /// defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming every missing credential, or the first
    /// override that cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let required = [ENV_PRACTICUM_TOKEN, ENV_TELEGRAM_TOKEN, ENV_TELEGRAM_CHAT_ID];
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|&key| get(key).is_none())
            .collect();

        let (Some(practicum_token), Some(telegram_token), Some(telegram_chat_id)) = (
            get(ENV_PRACTICUM_TOKEN),
            get(ENV_TELEGRAM_TOKEN),
            get(ENV_TELEGRAM_CHAT_ID),
        ) else {
            return Err(Error::Config {
                message: format!(
                    "missing required environment variables: {}",
                    missing.join(", ")
                ),
                key: missing.first().map(|key| key.to_string()),
            });
        };

        let mut config = Config::new(Credentials {
            practicum_token,
            telegram_token,
            telegram_chat_id,
        });

        if let Some(endpoint) = get(ENV_HOMEWORK_ENDPOINT) {
            config.api.endpoint = parse_url(ENV_HOMEWORK_ENDPOINT, &endpoint)?;
        }
        if let Some(api_base) = get(ENV_TELEGRAM_API_BASE) {
            config.telegram.api_base = parse_url(ENV_TELEGRAM_API_BASE, &api_base)?
                .trim_end_matches('/')
                .to_string();
        }
        if let Some(secs) = get(ENV_RETRY_PERIOD_SECS) {
            config.polling.retry_period = parse_secs(ENV_RETRY_PERIOD_SECS, &secs)?;
        }
        if let Some(secs) = get(ENV_REQUEST_TIMEOUT_SECS) {
            let timeout = parse_secs(ENV_REQUEST_TIMEOUT_SECS, &secs)?;
            config.api.timeout = timeout;
            config.telegram.timeout = timeout;
        }

        Ok(config)
    }
}

fn parse_url(key: &str, value: &str) -> Result<String> {
    url::Url::parse(value)
        .map(|_| value.to_string())
        .map_err(|e| Error::config(key, format!("{key} is not a valid URL: {e}")))
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(Error::config(
            key,
            format!("{key} must be a positive number of seconds, got {value:?}"),
        )),
    }
}

fn default_endpoint() -> String {
    "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string()
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_retry_period() -> Duration {
    Duration::from_secs(600)
}
