//! Concurrent hit/miss/client counters.
//!
//! Writers take the exclusive side of a `parking_lot::RwLock` for a single map
//! operation; `snapshot()` takes the shared side and copies everything out, so
//! readers never observe a half-applied increment and never hold a reference
//! into the live maps. Nothing here performs I/O while the lock is held.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use serde::Serialize;

/// Live counters for one server instance.
pub struct MetricsStore {
    inner: RwLock<Inner>,
}

struct Inner {
    hits: HashMap<String, u64>,
    misses: u64,
    // None => client attribution disabled
    clients: Option<HashMap<String, u64>>,
    max_path_len: usize,
}

/// Point-in-time copy of the counters, sorted by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub hits: BTreeMap<String, u64>,
    pub misses: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clients: Option<BTreeMap<String, u64>>,
    /// Longest path key seen so far, in characters.
    pub max_path_len: usize,
}

impl MetricsStore {
    pub fn new(track_clients: bool) -> Self {
        Self {
            inner: RwLock::new(Inner {
                hits: HashMap::new(),
                misses: 0,
                clients: track_clients.then(HashMap::new),
                max_path_len: 0,
            }),
        }
    }

    pub fn tracks_clients(&self) -> bool {
        self.inner.read().clients.is_some()
    }

    /// Count one successful lookup of `path`.
    pub fn record_hit(&self, path: &str) {
        let len = path.chars().count();
        let mut g = self.inner.write();
        let inner = &mut *g;
        match inner.hits.get_mut(path) {
            Some(n) => *n += 1,
            None => {
                inner.hits.insert(path.to_owned(), 1);
            }
        }
        if len > inner.max_path_len {
            inner.max_path_len = len;
        }
    }

    /// Count one lookup that found nothing.
    pub fn record_miss(&self) {
        self.inner.write().misses += 1;
    }

    /// Count one request from `client_id`. No-op when attribution is off.
    pub fn record_client(&self, client_id: &str) {
        let mut g = self.inner.write();
        let Some(clients) = g.clients.as_mut() else {
            return;
        };
        match clients.get_mut(client_id) {
            Some(n) => *n += 1,
            None => {
                clients.insert(client_id.to_owned(), 1);
            }
        }
    }

    pub fn hit_count(&self, path: &str) -> u64 {
        self.inner.read().hits.get(path).copied().unwrap_or(0)
    }

    pub fn misses(&self) -> u64 {
        self.inner.read().misses
    }

    pub fn client_count(&self, client_id: &str) -> u64 {
        self.inner
            .read()
            .clients
            .as_ref()
            .and_then(|c| c.get(client_id).copied())
            .unwrap_or(0)
    }

    /// Copy every counter out under one shared lock.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let g = self.inner.read();
        MetricsSnapshot {
            hits: g.hits.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            misses: g.misses,
            clients: g
                .clients
                .as_ref()
                .map(|c| c.iter().map(|(k, v)| (k.clone(), *v)).collect()),
            max_path_len: g.max_path_len,
        }
    }
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new(true)
    }
}
