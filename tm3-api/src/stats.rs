//! Call statistics.
//!
//! One atomic counter per logical operation family. A paginated call counts
//! once, not once per page.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub(crate) struct ApiStats {
    get: AtomicU64,
    put: AtomicU64,
    post: AtomicU64,
    delete: AtomicU64,
    query: AtomicU64,
    export: AtomicU64,
}

/// Point-in-time view of the call counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub get: u64,
    pub put: u64,
    pub post: u64,
    pub delete: u64,
    pub query: u64,
    pub export: u64,
}

impl ApiStats {
    pub fn record_get(&self) {
        self.get.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_put(&self) {
        self.put.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_post(&self) {
        self.post.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.delete.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_query(&self) {
        self.query.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_export(&self) {
        self.export.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            get: self.get.load(Ordering::Relaxed),
            put: self.put.load(Ordering::Relaxed),
            post: self.post.load(Ordering::Relaxed),
            delete: self.delete.load(Ordering::Relaxed),
            query: self.query.load(Ordering::Relaxed),
            export: self.export.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.get.store(0, Ordering::Relaxed);
        self.put.store(0, Ordering::Relaxed);
        self.post.store(0, Ordering::Relaxed);
        self.delete.store(0, Ordering::Relaxed);
        self.query.store(0, Ordering::Relaxed);
        self.export.store(0, Ordering::Relaxed);
    }
}
