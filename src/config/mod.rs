use rust_decimal::Decimal;
use sqlx::postgres::PgConnectOptions;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::analytics::AlertPolicy;

const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
const DEFAULT_RPC_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the individual parts.
    pub url: Option<String>,
    pub user: String,
    pub host: String,
    pub name: String,
    pub password: String,
    pub port: u16,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return Ok(PgConnectOptions::from_str(url)?);
        }

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,

    // Telegram (optional — alerts are only logged without them)
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,

    // Solana
    pub solana_rpc_url: String,
    pub rpc_timeout: Duration,

    // Tracker
    pub poll_interval: Duration,
    pub alert_policy: AlertPolicy,

    pub metrics_addr: Option<SocketAddr>,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database = DatabaseConfig {
            url: var("DATABASE_URL"),
            user: var("DB_USER").unwrap_or_else(|| "postgres".into()),
            host: var("DB_HOST").unwrap_or_else(|| "localhost".into()),
            name: var("DB_NAME").unwrap_or_else(|| "postgres".into()),
            password: var("DB_PASSWORD").unwrap_or_default(),
            port: parse_or(var("DB_PORT"), "DB_PORT", DEFAULT_DB_PORT)?,
        };

        let defaults = AlertPolicy::default();
        let alert_policy = AlertPolicy {
            relative_threshold: parse_or(
                var("ALERT_RELATIVE_THRESHOLD"),
                "ALERT_RELATIVE_THRESHOLD",
                defaults.relative_threshold,
            )?,
            absolute_threshold: parse_or(
                var("ALERT_ABSOLUTE_THRESHOLD"),
                "ALERT_ABSOLUTE_THRESHOLD",
                defaults.absolute_threshold,
            )?,
        };
        if alert_policy.relative_threshold.is_sign_negative()
            || alert_policy.absolute_threshold.is_sign_negative()
        {
            anyhow::bail!("alert thresholds must not be negative");
        }

        let poll_interval_secs: u64 = parse_or(
            var("POLL_INTERVAL_SECS"),
            "POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL_SECS,
        )?;
        if poll_interval_secs == 0 {
            anyhow::bail!("POLL_INTERVAL_SECS must be greater than zero");
        }

        let metrics_addr = match var("METRICS_ADDR") {
            Some(raw) => Some(
                raw.parse()
                    .map_err(|e| anyhow::anyhow!("invalid METRICS_ADDR {raw:?}: {e}"))?,
            ),
            None => None,
        };

        let log_format = match var("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            database,
            telegram_bot_token: var("TG_API_KEY"),
            telegram_chat_id: var("TG_EMERGENCY_CHANNEL_ID"),
            solana_rpc_url: var("SOLANA_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.into()),
            rpc_timeout: Duration::from_secs(parse_or(
                var("RPC_TIMEOUT_SECS"),
                "RPC_TIMEOUT_SECS",
                DEFAULT_RPC_TIMEOUT_SECS,
            )?),
            poll_interval: Duration::from_secs(poll_interval_secs),
            alert_policy,
            metrics_addr,
            log_format,
        })
    }

    /// Returns true if both Telegram credentials are configured.
    pub fn has_telegram(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key} {raw:?}: {e}")),
        None => Ok(default),
    }
}
