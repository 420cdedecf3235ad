//! Map Entry
//!
//! Defines the pair stored by the in-memory backend.

use std::time::{Duration, Instant};

// == Entry ==
/// A stored value together with the moment it was last written.
///
/// `written_at` always reflects the most recent write or refresh, never the
/// original creation time, so a refresh restarts the age clock.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    /// The stored value
    pub value: V,
    /// Timestamp of the most recent write or refresh
    pub written_at: Instant,
}

impl<V> Entry<V> {
    /// Creates an entry written now.
    pub fn new(value: V) -> Self {
        Self {
            value,
            written_at: Instant::now(),
        }
    }

    /// Time elapsed since the last write.
    pub fn age(&self) -> Duration {
        self.written_at.elapsed()
    }

    /// Checks the entry against a staleness threshold.
    ///
    /// An entry whose age has reached `max_age` is expired; the comparison
    /// is inclusive, so an entry is stale the instant its age equals the
    /// threshold.
    pub fn is_expired(&self, max_age: Duration) -> bool {
        self.age() >= max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_fresh() {
        let entry = Entry::new("payload".to_string());
        assert_eq!(entry.value, "payload");
        assert!(!entry.is_expired(Duration::from_secs(60)));
    }

    #[test]
    fn test_entry_expires() {
        let entry = Entry::new(7u32);
        assert!(!entry.is_expired(Duration::from_millis(50)));

        sleep(Duration::from_millis(80));

        assert!(entry.is_expired(Duration::from_millis(50)));
        assert!(entry.age() >= Duration::from_millis(50));
    }

    #[test]
    fn test_entry_zero_threshold_is_immediately_stale() {
        let entry = Entry::new(());
        assert!(entry.is_expired(Duration::ZERO));
    }
}
