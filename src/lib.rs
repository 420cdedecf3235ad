//! Expiremap - A TTL-expiring key-value map
//!
//! Every entry carries a time-to-live: once its age exceeds the configured
//! maximum, reads treat it as absent and cleanup eventually reclaims its
//! storage. Entries live either in process memory or in a shared Redis
//! server, selected by [`Config`] at construction.

pub mod config;
pub mod error;
pub mod map;
pub mod store;

pub use config::Config;
pub use error::{Result, StoreError};
pub use map::ExpiringMap;
