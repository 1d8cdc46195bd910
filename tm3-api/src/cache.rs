//! Reference-data caching.
//!
//! A fixed set of lookup lists (address types, contact titles, payment
//! methods, ...) changes rarely enough to fetch once per process. Each
//! whitelisted type owns one cell created at construction, so the cache is
//! bounded by the whitelist. The cell serializes initialization: concurrent
//! callers share a single in-flight fetch, a failed fetch leaves the cell
//! empty for the next caller to retry, and a resolved list is kept for the
//! process lifetime. Types outside the whitelist bypass the cache entirely.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::OnceCell;

use crate::error::ApiError;

/// Lookup-list endpoints eligible for permanent in-process caching.
pub const LOOKUP_TYPES: &[&str] = &[
    "addresstypes",
    "contacttitles",
    "customfields",
    "deliveryscenarios",
    "ordermailtemplates",
    "paymentmethods",
    "phonenumbertypes",
    "relationtypes",
    "salechannels",
    "ticketlayouts",
];

#[derive(Debug)]
pub(crate) struct ReferenceCache {
    slots: HashMap<&'static str, OnceCell<Arc<Vec<Value>>>>,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self {
            slots: LOOKUP_TYPES
                .iter()
                .map(|lookup_type| (*lookup_type, OnceCell::new()))
                .collect(),
        }
    }

    pub fn is_cached_type(&self, endpoint: &str) -> bool {
        self.slots.contains_key(endpoint)
    }

    /// Resolve `endpoint` through its cache slot, fetching at most once.
    ///
    /// Callers racing on an unresolved slot await the same in-flight fetch;
    /// there is never more than one outstanding request per whitelisted
    /// type. Failures are not cached. A non-whitelisted endpoint fetches
    /// directly every time.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        endpoint: &str,
        fetch: F,
    ) -> Result<Arc<Vec<Value>>, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Value>, ApiError>>,
    {
        let Some(cell) = self.slots.get(endpoint) else {
            return Ok(Arc::new(fetch().await?));
        };

        cell.get_or_try_init(|| async { Ok(Arc::new(fetch().await?)) })
            .await
            .map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn lookup_value(label: &str) -> Vec<Value> {
        vec![json!({ "name": label })]
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let cache = ReferenceCache::new();
        let fetches = AtomicUsize::new(0);

        let fetch = || async {
            fetches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(lookup_value("Home"))
        };

        let (first, second) = tokio::join!(
            cache.get_or_fetch("addresstypes", fetch),
            cache.get_or_fetch("addresstypes", fetch),
        );

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[tokio::test]
    async fn resolved_slot_skips_the_network() {
        let cache = ReferenceCache::new();
        let fetches = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_fetch("contacttitles", || async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok(lookup_value("Dr."))
                })
                .await
                .unwrap();
            assert_eq!(value[0]["name"], "Dr.");
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = ReferenceCache::new();
        let fetches = AtomicUsize::new(0);

        let failed = cache
            .get_or_fetch("paymentmethods", || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Config("backend down".into()))
            })
            .await;
        assert!(failed.is_err());

        let recovered = cache
            .get_or_fetch("paymentmethods", || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(lookup_value("Cash"))
            })
            .await;
        assert!(recovered.is_ok());
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_whitelisted_types_always_fetch() {
        let cache = ReferenceCache::new();
        let fetches = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_fetch("orders", || async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok(lookup_value("order"))
                })
                .await
                .unwrap();
        }

        assert!(!cache.is_cached_type("orders"));
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }
}
