//! Redis Backend
//!
//! Delegates expiry enforcement to the server's native per-key TTL. Every
//! logical key is stored under a per-map prefix so independent maps can
//! share one Redis database without colliding.

use std::marker::PhantomData;
use std::time::Duration;

use redis::Commands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::store::Backend;

// == Redis Store ==
/// Remote backend holding entries in a shared Redis server.
///
/// Values are serialized to JSON and written with `SET ... EX`, after which
/// staleness is entirely the server's responsibility; the client performs
/// no additional age check on reads.
///
/// Unless the caller supplies a prefix, a fresh UUID token is generated at
/// construction, so two maps built with empty configuration never observe
/// each other's keys.
pub struct RedisStore<V> {
    /// Server connection, owned or adopted from the caller
    conn: redis::Connection,
    /// Expiration attached to future writes
    max_age: Duration,
    /// Namespace prepended to every logical key
    key_prefix: String,
    /// Propagate transport failures on reads instead of folding them
    /// into the not-found condition
    strict_reads: bool,
    _value: PhantomData<V>,
}

impl<V> RedisStore<V> {
    // == Constructor ==
    /// Connects to the server selected by `config`.
    ///
    /// A malformed URL or missing host is reported as a configuration
    /// error here, never deferred to first use.
    pub fn connect(config: &Config) -> Result<Self> {
        let url = match (&config.redis_url, &config.redis_host) {
            (Some(url), _) => url.clone(),
            (None, Some(host)) => format!("redis://{}:{}/", host, config.redis_port),
            (None, None) => {
                return Err(StoreError::Configuration(
                    "a Redis host or URL is required for the remote backend".to_string(),
                ))
            }
        };
        let client = redis::Client::open(url.as_str())
            .map_err(|err| StoreError::Configuration(err.to_string()))?;
        let conn = client.get_connection()?;
        Ok(Self::with_connection(config, conn))
    }

    /// Wraps an existing connection instead of opening a new one.
    ///
    /// The connection is used as given; this store performs no teardown
    /// of its own beyond dropping the handle.
    pub fn with_connection(config: &Config, conn: redis::Connection) -> Self {
        let key_prefix = config
            .key_prefix
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());
        debug!("creating Redis store with prefix: {}", key_prefix);
        Self {
            conn,
            max_age: config.max_age,
            key_prefix,
            strict_reads: config.strict_reads,
            _value: PhantomData,
        }
    }

    /// Returns the namespace prepended to every logical key.
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    // == Key Namespacing ==
    fn real_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Expiration in whole seconds for `SET ... EX`.
    ///
    /// Redis expirations are second-granular; sub-second thresholds round
    /// up to one second.
    fn expire_secs(&self) -> u64 {
        self.max_age.as_secs().max(1)
    }
}

impl<V: Serialize + DeserializeOwned> Backend<V> for RedisStore<V> {
    // == Get ==
    /// Reads and decodes the namespaced key.
    ///
    /// A missing key, a key already expired server-side, and an
    /// undecodable payload all fail with the not-found condition. By
    /// default a transport failure does too; `strict_reads` makes it
    /// propagate instead.
    fn get(&mut self, key: &str) -> Result<V> {
        let real_key = self.real_key(key);
        debug!("getting Redis key: {}", real_key);

        let payload: Option<Vec<u8>> = match self.conn.get(&real_key) {
            Ok(payload) => payload,
            Err(err) if self.strict_reads => return Err(err.into()),
            Err(_) => None,
        };
        let payload = payload.ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        serde_json::from_slice(&payload).map_err(|_| StoreError::NotFound(key.to_string()))
    }

    // == Set ==
    /// Serializes the value and writes it with the server-side expiration
    /// armed to the current staleness threshold.
    fn set(&mut self, key: &str, value: V) -> Result<()> {
        let payload = serde_json::to_vec(&value)?;
        let real_key = self.real_key(key);
        let expire = self.expire_secs();
        debug!("setting Redis key: {}", real_key);

        self.conn.set_ex::<_, _, ()>(real_key, payload, expire)?;
        Ok(())
    }

    // == Delete ==
    /// Removes the namespaced key; removing an absent key is not an error.
    fn delete(&mut self, key: &str) -> Result<()> {
        let real_key = self.real_key(key);
        let _removed: usize = self.conn.del(real_key)?;
        Ok(())
    }

    // == Keys ==
    /// Asks the server for every key under this map's prefix and strips
    /// the prefix off.
    ///
    /// Redis `KEYS` takes glob patterns, so the prefix is glob-escaped and
    /// suffixed with `*`. The snapshot is only as consistent as the server
    /// makes it under concurrent writers.
    fn keys(&mut self) -> Result<Vec<String>> {
        let pattern = format!("{}*", escape_glob(&self.key_prefix));
        let namespaced: Vec<String> = self.conn.keys(pattern)?;
        Ok(namespaced
            .iter()
            .filter_map(|key| key.strip_prefix(&self.key_prefix))
            .map(str::to_string)
            .collect())
    }

    // == Length ==
    fn len(&mut self) -> Result<usize> {
        Ok(self.keys()?.len())
    }

    // == Max Age ==
    /// Applies to future writes only; expirations already attached to
    /// stored keys keep their original deadline.
    fn set_max_age(&mut self, max_age: Duration) {
        self.max_age = max_age;
    }

    // == Refresh ==
    /// Re-arms the server-side expiration by rewriting the current value.
    fn refresh(&mut self, key: &str) -> Result<()> {
        match self.get(key) {
            Ok(value) => self.set(key, value),
            Err(StoreError::NotFound(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

// == Glob Escaping ==
/// Escapes the characters Redis glob patterns treat specially, so a prefix
/// is always matched literally.
fn escape_glob(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_glob_passthrough() {
        assert_eq!(escape_glob("sessions:"), "sessions:");
        assert_eq!(escape_glob(""), "");
    }

    #[test]
    fn test_escape_glob_special_characters() {
        assert_eq!(escape_glob("a*b"), "a\\*b");
        assert_eq!(escape_glob("a?[b]"), "a\\?\\[b\\]");
        assert_eq!(escape_glob("a\\b"), "a\\\\b");
    }
}
