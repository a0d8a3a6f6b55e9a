use std::str::FromStr;
use std::time::Duration;

use crate::cache::DEFAULT_TTL_HOURS;
use crate::completion::DEFAULT_MODEL;
use crate::contact::DEFAULT_RECIPIENTS;
use crate::error::{AdvisorError, Result};
use crate::ranking::DEFAULT_TOP_N;
use crate::retry::RetryPolicy;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin1234";

/// Runtime settings read from the environment at startup
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub openrouter_api_key: Option<String>,
    pub model: String,
    pub database_url: Option<String>,
    pub port: u16,
    pub admin_password: String,
    pub contact_recipients: Vec<String>,
    pub retry: RetryPolicy,
    pub cache_ttl: chrono::Duration,
    pub market_top_n: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            openrouter_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            database_url: None,
            port: DEFAULT_PORT,
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            contact_recipients: DEFAULT_RECIPIENTS.iter().map(|s| s.to_string()).collect(),
            retry: RetryPolicy::default(),
            cache_ttl: chrono::Duration::hours(DEFAULT_TTL_HOURS),
            market_top_n: DEFAULT_TOP_N,
        }
    }
}

impl AdvisorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable lookup; unset or blank variables keep defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let retry = RetryPolicy::new(
            parse_or(&var, "RETRY_MAX", defaults.retry.max_retries)?,
            Duration::from_millis(parse_or(
                &var,
                "RETRY_INITIAL_BACKOFF_MS",
                defaults.retry.initial_backoff.as_millis() as u64,
            )?),
        );

        let contact_recipients = match var("CONTACT_RECIPIENTS") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.contact_recipients,
        };

        Ok(Self {
            openrouter_api_key: var("OPENROUTER_API_KEY"),
            model: var("ADVISOR_MODEL").unwrap_or(defaults.model),
            database_url: var("DATABASE_URL"),
            port: parse_or(&var, "PORT", defaults.port)?,
            admin_password: var("ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
            contact_recipients,
            retry,
            cache_ttl: chrono::Duration::hours(parse_or(&var, "CACHE_TTL_HOURS", DEFAULT_TTL_HOURS)?),
            market_top_n: parse_or(&var, "MARKET_TOP_N", defaults.market_top_n)?,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AdvisorError::ConfigError(format!("{key}={raw}: {e}"))),
    }
}
