use chrono::Duration;

use crate::domain::types::DEFAULT_CHALLENGE_TTL_SECS;

/// Longest accepted challenge lifetime (one day).
const MAX_TTL_SECS: i64 = 86_400;
/// Longest accepted purge retention (one year).
const MAX_PURGE_RETENTION_SECS: i64 = 365 * 86_400;

/// OTP service configuration loaded from environment variables.
#[derive(Debug)]
pub struct OtpConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Mail relay endpoint that receives `{destination, code, purpose}`. Env var: `NOTIFIER_URL`.
    pub notifier_url: String,
    /// Identity service gRPC URL (e.g. "http://identity:50051"). Env var: `IDENTITY_GRPC_URL`.
    pub identity_grpc_url: String,
    /// TCP port to listen on (default 3120). Env var: `OTP_PORT`.
    pub otp_port: u16,
    /// Challenge lifetime in seconds (default 300). Env var: `OTP_TTL_SECS`.
    pub ttl_secs: i64,
    /// Sweeper period in seconds; 0 disables it (default 0). Env var: `OTP_PURGE_INTERVAL_SECS`.
    pub purge_interval_secs: u64,
    /// How long terminal challenges are kept before the sweeper may delete them
    /// (default 86400). Env var: `OTP_PURGE_RETENTION_SECS`.
    pub purge_retention_secs: i64,
}

impl OtpConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            notifier_url: std::env::var("NOTIFIER_URL").expect("NOTIFIER_URL"),
            identity_grpc_url: std::env::var("IDENTITY_GRPC_URL").expect("IDENTITY_GRPC_URL"),
            otp_port: env_or("OTP_PORT", 3120),
            ttl_secs: env_or("OTP_TTL_SECS", DEFAULT_CHALLENGE_TTL_SECS),
            purge_interval_secs: env_or("OTP_PURGE_INTERVAL_SECS", 0),
            purge_retention_secs: env_or("OTP_PURGE_RETENTION_SECS", 86_400),
        }
    }

    /// Challenge lifetime, clamped to `1..=MAX_TTL_SECS`.
    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_secs.clamp(1, MAX_TTL_SECS))
    }

    /// Purge retention, clamped to `0..=MAX_PURGE_RETENTION_SECS`.
    pub fn purge_retention(&self) -> Duration {
        Duration::seconds(self.purge_retention_secs.clamp(0, MAX_PURGE_RETENTION_SECS))
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
