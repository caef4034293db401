use std::str::FromStr;
use std::time::Duration;

use chatlink_bot::BotConfig;
use chatlink_core::identity::RelinkPolicy;
use chatlink_telegram::client::DEFAULT_API_BASE;

use crate::auth::jwt::JwtConfig;

/// Which storage implementation backs the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// In-process store. State is lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelegramMode {
    Live,
    /// Record outbound messages instead of calling the Bot API.
    DryRun,
}

impl FromStr for TelegramMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(TelegramMode::Live),
            "dry-run" | "dry_run" | "dryrun" => Ok(TelegramMode::DryRun),
            other => Err(format!("unknown telegram mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub mode: TelegramMode,
    /// Required in live mode.
    pub bot_token: Option<String>,
    pub bot_username: String,
    pub api_base: String,
    /// When set, webhook calls must carry it in
    /// `X-Telegram-Bot-Api-Secret-Token`.
    pub webhook_secret: Option<String>,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long the webhook waits on an update before acking (default: `8`).
    pub update_deadline_secs: u64,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub telegram: TelegramConfig,
    /// Base URL of the web app, target of deep links in chat.
    pub app_base_url: String,
    pub linking_code_ttl_secs: i64,
    pub relink_policy: RelinkPolicy,
    pub update_dedup_ttl_secs: i64,
    /// Local hour (0-23) at which EOD reminders go out.
    pub eod_reminder_hour: u32,
    pub notify_retry_delays_ms: Vec<u64>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `UPDATE_DEADLINE_SECS`    | `8`                        |
    /// | `STORE_BACKEND`           | `postgres`                 |
    /// | `DATABASE_URL`            | required for `postgres`    |
    /// | `JWT_SECRET`              | required                   |
    /// | `TELEGRAM_MODE`           | `live`                     |
    /// | `TELEGRAM_BOT_TOKEN`      | required for `live`        |
    /// | `TELEGRAM_BOT_USERNAME`   | `chatlink_bot`             |
    /// | `TELEGRAM_API_BASE`       | `https://api.telegram.org` |
    /// | `TELEGRAM_WEBHOOK_SECRET` | unset                      |
    /// | `APP_BASE_URL`            | `http://localhost:5173`    |
    /// | `LINKING_CODE_TTL_SECS`   | `300`                      |
    /// | `RELINK_POLICY`           | `overwrite`                |
    /// | `UPDATE_DEDUP_TTL_SECS`   | `600`                      |
    /// | `EOD_REMINDER_HOUR`       | `18`                       |
    /// | `NOTIFY_RETRY_DELAYS_MS`  | `500,1000,2000`            |
    ///
    /// # Panics
    ///
    /// Panics on malformed values and on missing required secrets, so
    /// misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");
        let port: u16 = parse_env("PORT", "3000");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", "30");
        let update_deadline_secs: u64 = parse_env("UPDATE_DEADLINE_SECS", "8");

        let store_backend: StoreBackend = parse_env("STORE_BACKEND", "postgres");
        let database_url = optional_env("DATABASE_URL");
        if store_backend == StoreBackend::Postgres {
            assert!(
                database_url.is_some(),
                "DATABASE_URL must be set when STORE_BACKEND=postgres"
            );
        }

        let mode: TelegramMode = parse_env("TELEGRAM_MODE", "live");
        let bot_token = optional_env("TELEGRAM_BOT_TOKEN");
        if mode == TelegramMode::Live {
            assert!(
                bot_token.is_some(),
                "TELEGRAM_BOT_TOKEN must be set unless TELEGRAM_MODE=dry-run"
            );
        }
        let telegram = TelegramConfig {
            mode,
            bot_token,
            bot_username: env_or("TELEGRAM_BOT_USERNAME", "chatlink_bot"),
            api_base: env_or("TELEGRAM_API_BASE", DEFAULT_API_BASE),
            webhook_secret: optional_env("TELEGRAM_WEBHOOK_SECRET"),
        };

        let eod_reminder_hour: u32 = parse_env("EOD_REMINDER_HOUR", "18");
        assert!(eod_reminder_hour < 24, "EOD_REMINDER_HOUR must be between 0 and 23");

        let notify_retry_delays_ms: Vec<u64> = env_or("NOTIFY_RETRY_DELAYS_MS", "500,1000,2000")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse()
                    .unwrap_or_else(|e| panic!("NOTIFY_RETRY_DELAYS_MS entry '{s}' is invalid: {e}"))
            })
            .collect();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            update_deadline_secs,
            store_backend,
            database_url,
            jwt: JwtConfig::from_env(),
            telegram,
            app_base_url: env_or("APP_BASE_URL", "http://localhost:5173"),
            linking_code_ttl_secs: parse_env("LINKING_CODE_TTL_SECS", "300"),
            relink_policy: parse_env("RELINK_POLICY", "overwrite"),
            update_dedup_ttl_secs: parse_env("UPDATE_DEDUP_TTL_SECS", "600"),
            eod_reminder_hour,
            notify_retry_delays_ms,
        }
    }

    /// The subset the bot services are built from.
    pub fn bot_config(&self) -> BotConfig {
        BotConfig {
            bot_username: self.telegram.bot_username.clone(),
            app_base_url: self.app_base_url.clone(),
            code_ttl: chrono::Duration::seconds(self.linking_code_ttl_secs),
            relink_policy: self.relink_policy,
            dedup_ttl: chrono::Duration::seconds(self.update_dedup_ttl_secs),
            retry_delays: self
                .notify_retry_delays_ms
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }

    pub fn update_deadline(&self) -> Duration {
        Duration::from_secs(self.update_deadline_secs)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: &str) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_or(key, default)
        .parse()
        .unwrap_or_else(|e| panic!("{key} is invalid: {e}"))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn store_backend_parses_case_insensitively() {
        assert_eq!("Postgres".parse::<StoreBackend>(), Ok(StoreBackend::Postgres));
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert_matches!("redis".parse::<StoreBackend>(), Err(msg) if msg.contains("redis"));
    }

    #[test]
    fn telegram_mode_accepts_dry_run_spellings() {
        for raw in ["dry-run", "dry_run", "DRYRUN"] {
            assert_eq!(raw.parse::<TelegramMode>(), Ok(TelegramMode::DryRun));
        }
        assert_eq!("live".parse::<TelegramMode>(), Ok(TelegramMode::Live));
    }
}
