use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;

/// Boot-time configuration, loaded once in `main` and handed down
/// explicitly (spec.md §9: no process-global singletons).
pub struct AppConfig {
    pub database_url: String,
    /// Direct (non-pooled) connection string, used by `bin/init_db` when set.
    pub direct_url: Option<String>,
    pub fic_url: String,
    pub port: u16,
    pub log_level: String,
    pub treasury_email: String,
    pub max_amount: Decimal,
    pub lock_timeout: Duration,
    pub idempotency_processing_ttl: Duration,
    pub idempotency_terminal_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: require_env("DATABASE_URL")?,
            direct_url: env::var("DIRECT_URL").ok(),
            fic_url: require_env("FIC_URL")?,
            port: parse_env("PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            treasury_email: env::var("TREASURY_EMAIL")
                .unwrap_or_else(|_| "treasury@wallet.internal".to_string()),
            max_amount: parse_env("MAX_AMOUNT", Decimal::from(1_000_000_000u64))?,
            lock_timeout: Duration::from_millis(parse_env("LOCK_TIMEOUT_MS", 5_000u64)?),
            idempotency_processing_ttl: Duration::from_secs(parse_env(
                "IDEMPOTENCY_PROCESSING_TTL_SECS",
                10u64,
            )?),
            idempotency_terminal_ttl: Duration::from_secs(parse_env(
                "IDEMPOTENCY_TERMINAL_TTL_SECS",
                24 * 3600u64,
            )?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}
