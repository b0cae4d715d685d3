//! Process-wide registry of index clients, keyed by server address.
//!
//! Tables attached to the same address share one client.

use crate::transport::RemoteIndex;
use common::SymqlError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Address-keyed cache of shared values. A value is created at most once
/// per address, even under concurrent first use.
pub struct ChannelCache<T> {
    entries: Mutex<HashMap<String, Arc<T>>>,
}

impl<T> ChannelCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the value for `addr`, creating it with `create` on first use.
    ///
    /// # Arguments
    ///
    /// * `addr` - Cache key.
    /// * `create` - Constructor, called with the lock held. A failure leaves
    ///   the cache unchanged.
    pub fn get_or_create<F>(&self, addr: &str, create: F) -> Result<Arc<T>, SymqlError>
    where
        F: FnOnce(&str) -> Result<T, SymqlError>,
    {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SymqlError::ExecutionError(String::from("Channel cache poisoned")))?;
        if let Some(existing) = entries.get(addr) {
            return Ok(Arc::clone(existing));
        }
        let created = Arc::new(create(addr)?);
        debug!("Created channel for {}", addr);
        entries.insert(addr.to_string(), Arc::clone(&created));
        Ok(created)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ChannelCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    static ref CHANNELS: ChannelCache<RemoteIndex> = ChannelCache::new();
}

/// Shared client for the index at `addr`.
pub fn get_channel(addr: &str) -> Result<Arc<RemoteIndex>, SymqlError> {
    CHANNELS.get_or_create(addr, RemoteIndex::new)
}
