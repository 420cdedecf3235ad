//! Configuration Module
//!
//! Handles construction options for the map, including backend selection.

use std::env;
use std::time::Duration;

use crate::error::{Result, StoreError};

/// Default Redis port used when only a host is supplied.
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Default staleness threshold in seconds.
pub const DEFAULT_MAX_AGE_SECS: u64 = 300;

/// Construction options for an [`ExpiringMap`](crate::ExpiringMap).
///
/// The in-memory backend is used unless a Redis host or URL is supplied.
/// All values can also be loaded from environment variables.
///
/// # Example
///
/// ```rust,ignore
/// use expiremap::Config;
/// use std::time::Duration;
///
/// let config = Config::new(Duration::from_secs(60))
///     .with_redis_host("localhost")
///     .with_key_prefix("sessions:");
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum permitted entry age before reads treat it as absent
    pub max_age: Duration,
    /// Redis host; presence selects the remote backend
    pub redis_host: Option<String>,
    /// Redis port, used together with `redis_host`
    pub redis_port: u16,
    /// Redis connection URL; takes precedence over host and port
    pub redis_url: Option<String>,
    /// Key namespace for the remote backend; generated when absent
    pub key_prefix: Option<String>,
    /// Propagate remote transport failures on reads instead of
    /// treating them as missing keys
    pub strict_reads: bool,
}

impl Config {
    /// Creates a new Config with the given staleness threshold.
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            redis_host: None,
            redis_port: DEFAULT_REDIS_PORT,
            redis_url: None,
            key_prefix: None,
            strict_reads: false,
        }
    }

    /// Selects the remote backend at the given host.
    pub fn with_redis_host(mut self, host: impl Into<String>) -> Self {
        self.redis_host = Some(host.into());
        self
    }

    /// Overrides the Redis port.
    pub fn with_redis_port(mut self, port: u16) -> Self {
        self.redis_port = port;
        self
    }

    /// Selects the remote backend via a connection URL.
    pub fn with_redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = Some(url.into());
        self
    }

    /// Sets the key namespace shared by every entry of this map.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Makes reads report remote transport failures instead of
    /// folding them into the not-found condition.
    pub fn with_strict_reads(mut self, strict: bool) -> Self {
        self.strict_reads = strict;
        self
    }

    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `EXPIREMAP_MAX_AGE_SECS` - Staleness threshold in seconds (default: 300)
    /// - `EXPIREMAP_REDIS_HOST` - Redis host (default: unset, in-memory backend)
    /// - `EXPIREMAP_REDIS_PORT` - Redis port (default: 6379)
    /// - `EXPIREMAP_REDIS_URL` - Redis connection URL (default: unset)
    /// - `EXPIREMAP_KEY_PREFIX` - Key namespace (default: unset, generated)
    pub fn from_env() -> Self {
        Self {
            max_age: Duration::from_secs(
                env::var("EXPIREMAP_MAX_AGE_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_MAX_AGE_SECS),
            ),
            redis_host: env::var("EXPIREMAP_REDIS_HOST").ok(),
            redis_port: env::var("EXPIREMAP_REDIS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_REDIS_PORT),
            redis_url: env::var("EXPIREMAP_REDIS_URL").ok(),
            key_prefix: env::var("EXPIREMAP_KEY_PREFIX").ok(),
            strict_reads: false,
        }
    }

    /// Returns true when the options select the remote backend.
    pub fn uses_redis(&self) -> bool {
        self.redis_url.is_some() || self.redis_host.is_some()
    }

    /// Checks the options for contradictions before any backend is built.
    pub fn validate(&self) -> Result<()> {
        if self.max_age.is_zero() {
            return Err(StoreError::Configuration(
                "max_age must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_MAX_AGE_SECS))
    }
}
