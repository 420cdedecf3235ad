//! Expiring Map Facade
//!
//! The user-facing container. Selects a storage backend at construction and
//! forwards every operation to it, adding the defaulted-read and pop
//! conveniences on top.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::store::{Backend, MemoryStore, RedisStore};

// == Expiring Map ==
/// A key-value map whose entries become unreadable once their age exceeds
/// the configured maximum.
///
/// Entries live either in process memory or in a shared Redis server,
/// decided once by the [`Config`] passed at construction; the two backends
/// behave identically through this type.
///
/// The map is not internally synchronized. Operations take `&mut self` and
/// run to completion on the calling thread; to share a map across threads,
/// wrap it in a `Mutex` or `RwLock`.
///
/// # Example
///
/// ```rust,ignore
/// use expiremap::{Config, ExpiringMap};
/// use std::time::Duration;
///
/// let mut sessions: ExpiringMap<String> =
///     ExpiringMap::new(Config::new(Duration::from_secs(60)))?;
/// sessions.set("token", "alice".to_string())?;
/// assert_eq!(sessions.get("token")?, "alice");
/// ```
pub struct ExpiringMap<V> {
    store: Box<dyn Backend<V> + Send>,
}

impl<V> ExpiringMap<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + 'static,
{
    // == Constructor ==
    /// Builds a map with the backend selected by `config`.
    ///
    /// A Redis host or URL in the options selects the remote backend;
    /// otherwise entries are held in process memory. Invalid options are
    /// reported here, never deferred to first use.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let store: Box<dyn Backend<V> + Send> = if config.uses_redis() {
            Box::new(RedisStore::connect(&config)?)
        } else {
            Box::new(MemoryStore::new(config.max_age))
        };
        Ok(Self { store })
    }

    /// Builds a map over the remote backend, reusing a connection the
    /// caller already established.
    pub fn with_connection(config: Config, conn: redis::Connection) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: Box::new(RedisStore::with_connection(&config, conn)),
        })
    }

    /// Builds an in-memory map with a caller-supplied randomness source
    /// for the sweep schedule. Any remote options in `config` are ignored.
    pub fn with_rng(
        config: Config,
        rng: impl rand::RngCore + Send + 'static,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: Box::new(MemoryStore::with_rng(config.max_age, rng)),
        })
    }

    // == Get ==
    /// Retrieves the value for `key`, failing with
    /// [`NotFound`](StoreError::NotFound) when the key is absent or its
    /// age has reached the threshold.
    pub fn get(&mut self, key: &str) -> Result<V> {
        self.store.get(key)
    }

    /// Retrieves the value for `key`, returning `default` when the key is
    /// absent or expired.
    pub fn get_or(&mut self, key: &str, default: V) -> Result<V> {
        match self.store.get(key) {
            Ok(value) => Ok(value),
            Err(StoreError::NotFound(_)) => Ok(default),
            Err(err) => Err(err),
        }
    }

    // == Set ==
    /// Creates or overwrites the entry for `key`, resetting its age to
    /// zero.
    pub fn set(&mut self, key: &str, value: V) -> Result<()> {
        self.store.set(key, value)
    }

    // == Delete ==
    /// Removes the entry for `key`. Removing an absent key is not an
    /// error.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        self.store.delete(key)
    }

    // == Pop ==
    /// Removes and returns the live value for `key`, or `None` without
    /// side effects when the key is absent or expired.
    pub fn pop(&mut self, key: &str) -> Result<Option<V>> {
        match self.store.get(key) {
            Ok(value) => {
                self.store.delete(key)?;
                Ok(Some(value))
            }
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    // == Keys ==
    /// Returns a snapshot of the currently-live keys, reclaiming expired
    /// in-memory entries first so none of them leak into the listing.
    pub fn keys(&mut self) -> Result<Vec<String>> {
        self.store.sweep(true)?;
        self.store.keys()
    }

    // == Length ==
    /// Returns the number of currently-live entries.
    pub fn len(&mut self) -> Result<usize> {
        self.store.sweep(true)?;
        self.store.len()
    }

    /// Returns true when the map holds no live entries.
    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    // == Refresh ==
    /// Resets the age of a live key to zero; a missing or expired key is
    /// a silent no-op.
    pub fn refresh(&mut self, key: &str) -> Result<()> {
        self.store.refresh(key)
    }

    // == Max Age ==
    /// Reconfigures the staleness threshold for subsequent checks.
    pub fn set_max_age(&mut self, max_age: Duration) {
        self.store.set_max_age(max_age)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn memory_map(max_age: Duration) -> ExpiringMap<String> {
        ExpiringMap::new(Config::new(max_age)).unwrap()
    }

    #[test]
    fn test_new_rejects_zero_max_age() {
        let result: Result<ExpiringMap<String>> = ExpiringMap::new(Config::new(Duration::ZERO));
        assert!(matches!(result, Err(StoreError::Configuration(_))));
    }

    #[test]
    fn test_new_rejects_malformed_url() {
        let config = Config::new(Duration::from_secs(60)).with_redis_url("not a url");
        let result: Result<ExpiringMap<String>> = ExpiringMap::new(config);
        assert!(matches!(result, Err(StoreError::Configuration(_))));
    }

    #[test]
    fn test_get_or_returns_default_when_missing() {
        let mut map = memory_map(Duration::from_secs(60));

        map.set("k1", "v1".to_string()).unwrap();
        assert_eq!(map.get_or("k1", "fallback".to_string()).unwrap(), "v1");
        assert_eq!(map.get_or("k3", "fallback".to_string()).unwrap(), "fallback");
    }

    #[test]
    fn test_get_or_returns_default_when_expired() {
        let mut map = memory_map(Duration::from_millis(50));

        map.set("k1", "v1".to_string()).unwrap();
        sleep(Duration::from_millis(80));
        assert_eq!(map.get_or("k1", "fallback".to_string()).unwrap(), "fallback");
    }

    #[test]
    fn test_pop_live_key_removes_it() {
        let mut map = memory_map(Duration::from_secs(60));

        map.set("k1", "v1".to_string()).unwrap();
        assert_eq!(map.pop("k1").unwrap(), Some("v1".to_string()));
        assert_eq!(map.pop("k1").unwrap(), None);
        assert!(map.get("k1").is_err());
    }

    #[test]
    fn test_pop_absent_key_has_no_side_effect() {
        let mut map = memory_map(Duration::from_secs(60));

        map.set("k1", "v1".to_string()).unwrap();
        assert_eq!(map.pop("other").unwrap(), None);
        assert_eq!(map.len().unwrap(), 1);
    }

    #[test]
    fn test_len_and_keys_exclude_expired() {
        let mut map = memory_map(Duration::from_millis(60));

        map.set("old", "v".to_string()).unwrap();
        sleep(Duration::from_millis(90));
        map.set("fresh", "v".to_string()).unwrap();

        assert_eq!(map.len().unwrap(), 1);
        assert_eq!(map.keys().unwrap(), vec!["fresh".to_string()]);
        assert!(!map.is_empty().unwrap());
    }

    #[test]
    fn test_refresh_delegates() {
        let mut map = memory_map(Duration::from_millis(120));

        map.set("k1", "v1".to_string()).unwrap();
        sleep(Duration::from_millis(80));
        map.refresh("k1").unwrap();
        sleep(Duration::from_millis(80));

        assert_eq!(map.get("k1").unwrap(), "v1");
    }

    #[test]
    fn test_set_max_age_delegates() {
        let mut map = memory_map(Duration::from_secs(300));

        map.set("k1", "v1".to_string()).unwrap();
        map.set_max_age(Duration::from_millis(40));
        sleep(Duration::from_millis(70));

        assert!(map.get("k1").is_err());
    }
}
