//! Storage Backends
//!
//! Provides the backend contract shared by the in-memory and Redis stores.

mod entry;
mod memory;
mod redis;


// Re-export public types
pub use self::entry::Entry;
pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use std::time::Duration;

use crate::error::Result;

// == Sweep Constants ==
/// Upper bound (inclusive) of the random draw taken on every write
pub const GC_DRAW_MAX: u32 = 100;

/// A draw less than or equal to this value triggers a sweep
pub const GC_SWEEP_THRESHOLD: u32 = 50;

// == Backend Trait ==
/// Contract satisfied by both storage backends.
///
/// A backend is chosen once at construction and never switched. Every
/// operation is synchronous and runs on the caller's thread; callers that
/// share a backend across threads must add their own guard around it.
pub trait Backend<V> {
    /// Retrieves the value for `key`, failing with
    /// [`NotFound`](crate::StoreError::NotFound) when the key is absent
    /// or its age has reached the staleness threshold.
    fn get(&mut self, key: &str) -> Result<V>;

    /// Creates or overwrites the entry for `key`, resetting its age to zero.
    fn set(&mut self, key: &str, value: V) -> Result<()>;

    /// Removes the entry for `key`. Removing an absent key is not an error.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Returns a snapshot of the currently-live keys. Expired entries are
    /// never included, even when their storage has not been reclaimed yet.
    fn keys(&mut self) -> Result<Vec<String>>;

    /// Returns the number of currently-live entries, consistent with what
    /// [`keys`](Backend::keys) would yield at the same instant.
    fn len(&mut self) -> Result<usize>;

    /// Reconfigures the staleness threshold for subsequent checks. Remote
    /// expirations already attached to stored keys are left untouched.
    fn set_max_age(&mut self, max_age: Duration);

    /// Rewrites a live key with its existing value so its age resets to
    /// zero. A missing or expired key is a silent no-op.
    fn refresh(&mut self, key: &str) -> Result<()>;

    /// Reclaims expired entries. Backends that delegate expiry to their
    /// server have nothing to reclaim and report zero removals.
    fn sweep(&mut self, _force: bool) -> Result<usize> {
        Ok(0)
    }
}
