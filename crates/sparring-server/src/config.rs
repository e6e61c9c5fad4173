//! Server runtime configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (`--port`, `--delay-ms`)
//! 2. Environment variables, after `.env` has been loaded
//! 3. Built-in defaults
//!
//! | Variable                | Default                                 | Accepted        |
//! |-------------------------|-----------------------------------------|-----------------|
//! | `PORT`                  | 3001                                    | 1..=65535       |
//! | `ANTHROPIC_API_KEY`     | unset (mock replies)                    | any non-blank   |
//! | `ANTHROPIC_API_URL`     | `https://api.anthropic.com/v1/messages` | any             |
//! | `ANTHROPIC_MODEL`       | `claude-3-5-haiku-20241022`             | any non-blank   |
//! | `MAX_TOKENS`            | 300                                     | >= 1            |
//! | `UPSTREAM_TIMEOUT_SECS` | 30                                      | >= 1            |
//! | `DEBATE_TURN_DELAY_MS`  | 1500                                    | any integer     |
//!
//! A value that fails to parse or falls outside its range is logged and
//! replaced by the default; configuration loading itself never fails.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use coordination::generator::anthropic::{
    DEFAULT_API_URL, DEFAULT_API_VERSION, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT,
};
use coordination::modes::API_KEY_ENV;
use coordination::{AnthropicConfig, DebateConfig};

pub const DEFAULT_PORT: u16 = 3001;

const ENV_PORT: &str = "PORT";
const ENV_API_URL: &str = "ANTHROPIC_API_URL";
const ENV_MODEL: &str = "ANTHROPIC_MODEL";
const ENV_MAX_TOKENS: &str = "MAX_TOKENS";
const ENV_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
const ENV_TURN_DELAY_MS: &str = "DEBATE_TURN_DELAY_MS";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub upstream_timeout: Duration,
    pub turn_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            upstream_timeout: DEFAULT_TIMEOUT,
            turn_delay: coordination::debate::orchestrator::DEFAULT_TURN_DELAY,
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load through `lookup`, which maps a variable name to its raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |name: &str, default: String| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        let api_key = lookup(API_KEY_ENV)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let config = Self {
            port: parse_or_default(&lookup, ENV_PORT, defaults.port, |p| *p >= 1),
            api_url: text(ENV_API_URL, defaults.api_url),
            model: text(ENV_MODEL, defaults.model),
            max_tokens: parse_or_default(&lookup, ENV_MAX_TOKENS, defaults.max_tokens, |t| *t >= 1),
            upstream_timeout: Duration::from_secs(parse_or_default(
                &lookup,
                ENV_TIMEOUT_SECS,
                defaults.upstream_timeout.as_secs(),
                |s| *s >= 1,
            )),
            turn_delay: Duration::from_millis(parse_or_default(
                &lookup,
                ENV_TURN_DELAY_MS,
                defaults.turn_delay.as_millis() as u64,
                |_| true,
            )),
            api_key,
        };

        if config.api_key.is_none() {
            tracing::warn!("{API_KEY_ENV} is not set - AI responses will be mocked");
        }
        tracing::info!(
            port = config.port,
            model = %config.model,
            max_tokens = config.max_tokens,
            has_api_key = config.has_api_key(),
            "server configuration loaded"
        );
        config
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Provider settings for the response generator.
    pub fn anthropic(&self) -> AnthropicConfig {
        AnthropicConfig {
            api_key: self.api_key.clone(),
            api_url: self.api_url.clone(),
            api_version: DEFAULT_API_VERSION.to_string(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            timeout: self.upstream_timeout,
        }
    }

    /// Debate loop settings; `max_turns` comes from the caller.
    pub fn debate(&self, max_turns: Option<u32>) -> DebateConfig {
        DebateConfig {
            turn_delay: self.turn_delay,
            max_turns,
        }
    }
}

/// Parse `name` as `T`, falling back to `default` (with an error log) when the
/// value is malformed or rejected by `valid`.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    let Some(raw) = lookup(name) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            tracing::error!(variable = name, value = %raw, %default, "invalid configuration, using default");
            default
        }
    }
}
