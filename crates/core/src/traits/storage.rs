//! Persistent storage contract
//!
//! The assistant keeps one JSON blob under one well-known key. Reads and
//! writes are synchronous read-modify-write on an in-memory value; callers
//! serialize them by call order.

use crate::Result;

/// Key-value JSON storage for the persistent memory blob
pub trait MemoryStore: Send + Sync {
    /// Read the value for `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Write the value for `key`, replacing any existing value.
    fn set(&self, key: &str, value: &serde_json::Value) -> Result<()>;
}
