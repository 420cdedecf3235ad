//! In-Memory Backend
//!
//! Stores entries in a local HashMap and enforces the staleness threshold
//! itself: lazily on every read, and through randomized sweeps on writes.

use std::collections::HashMap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::{Backend, Entry, GC_DRAW_MAX, GC_SWEEP_THRESHOLD};

// == Memory Store ==
/// In-memory backend mapping keys to `(value, written_at)` pairs.
///
/// A read that finds a stale entry removes it on the spot, so `get` stays
/// correct without any background thread. Keys that are written once and
/// never read again are reclaimed by a sweep that runs on roughly half of
/// all writes: each `set` draws a uniform integer in `[0, 100]` and sweeps
/// when the draw is at most 50. The randomness source is injectable so the
/// schedule can be pinned down in tests.
pub struct MemoryStore<V> {
    /// Key-value storage
    entries: HashMap<String, Entry<V>>,
    /// Staleness threshold applied on every read and sweep
    max_age: Duration,
    /// Randomness source for sweep scheduling
    rng: Box<dyn RngCore + Send>,
}

impl<V> MemoryStore<V> {
    // == Constructor ==
    /// Creates a new MemoryStore with the given staleness threshold.
    pub fn new(max_age: Duration) -> Self {
        Self::with_rng(max_age, StdRng::from_entropy())
    }

    /// Creates a new MemoryStore with a caller-supplied randomness source.
    ///
    /// Seeding the source makes the sweep schedule deterministic.
    pub fn with_rng(max_age: Duration, rng: impl RngCore + Send + 'static) -> Self {
        debug!("creating in-memory store, max_age={:?}", max_age);
        Self {
            entries: HashMap::new(),
            max_age,
            rng: Box::new(rng),
        }
    }

    /// Returns the current staleness threshold.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }
}

impl<V: Clone> Backend<V> for MemoryStore<V> {
    // == Get ==
    /// Retrieves a value by key.
    ///
    /// A stale entry discovered here is deleted before the not-found
    /// condition is reported (lazy deletion).
    fn get(&mut self, key: &str) -> Result<V> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(self.max_age) => Ok(entry.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                Err(StoreError::NotFound(key.to_string()))
            }
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    // == Set ==
    /// Stores a key-value pair, resetting its age to zero.
    ///
    /// Runs the randomized sweep first so unread expired entries cannot
    /// accumulate without bound.
    fn set(&mut self, key: &str, value: V) -> Result<()> {
        self.sweep(false)?;
        self.entries.insert(key.to_string(), Entry::new(value));
        Ok(())
    }

    // == Delete ==
    /// Removes an entry by key; removing an absent key is not an error.
    fn delete(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    // == Keys ==
    /// Returns the currently-live keys, reclaiming expired entries first.
    fn keys(&mut self) -> Result<Vec<String>> {
        self.sweep(true)?;
        Ok(self.entries.keys().cloned().collect())
    }

    // == Length ==
    /// Returns the number of live entries, reclaiming expired ones first.
    fn len(&mut self) -> Result<usize> {
        self.sweep(true)?;
        Ok(self.entries.len())
    }

    // == Max Age ==
    /// Reconfigures the staleness threshold, effective immediately for
    /// subsequent reads and sweeps.
    fn set_max_age(&mut self, max_age: Duration) {
        self.max_age = max_age;
    }

    // == Refresh ==
    /// Rewrites a live key with its existing value so its age resets to
    /// zero. Absent or expired keys are left alone.
    fn refresh(&mut self, key: &str) -> Result<()> {
        match self.get(key) {
            Ok(value) => self.set(key, value),
            Err(StoreError::NotFound(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    // == Sweep ==
    /// Removes every entry whose age has reached the staleness threshold.
    ///
    /// Without `force`, the sweep only runs when the random draw lands at
    /// or below [`GC_SWEEP_THRESHOLD`]; `force` bypasses the draw.
    fn sweep(&mut self, force: bool) -> Result<usize> {
        if !force && self.rng.gen_range(0..=GC_DRAW_MAX) > GC_SWEEP_THRESHOLD {
            return Ok(0);
        }

        let max_age = self.max_age;
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(max_age));
        let removed = before - self.entries.len();

        if removed > 0 {
            debug!("sweep removed {} expired entries", removed);
        }
        Ok(removed)
    }
}
