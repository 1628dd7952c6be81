// src/cache/store.rs

//! Query cache storage.
//!
//! Entries keep their last successful value through refetches and errors.
//! Each fetch gets a generation number; only the newest generation for a
//! key may write a result, so an older response can never overwrite a
//! newer one. An invalidation that lands while a fetch is in flight
//! outlives that fetch: its result is stored but stays stale.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cache::key::QueryKey;

/// Lifecycle of one cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub status: QueryStatus,
    /// Last successful value
    pub data: Option<Value>,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Marked stale by a mutation; the next read refetches
    pub invalidated: bool,
    generation: u64,
    /// Generation counter at the last invalidation
    invalidated_at: u64,
    /// When the last fetch settled, successfully or not
    settled_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn new() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            updated_at: None,
            invalidated: false,
            generation: 0,
            invalidated_at: 0,
            settled_at: None,
        }
    }

    /// Servable without a request.
    pub fn is_fresh(&self, stale_time: Duration, now: DateTime<Utc>) -> bool {
        if self.status != QueryStatus::Success || self.invalidated || self.data.is_none() {
            return false;
        }
        self.updated_at.is_some_and(|updated| {
            updated
                .checked_add_signed(stale_time)
                .is_none_or(|until| until > now)
        })
    }
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
    next_generation: u64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Decode the last successful value of `key`.
    pub fn data<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let value = self.entries.get(key)?.data.clone()?;
        match serde_json::from_value(value) {
            Ok(data) => Some(data),
            Err(e) => {
                log::warn!("Cached value for {} has unexpected shape: {}", key, e);
                None
            }
        }
    }

    pub fn status(&self, key: &QueryKey) -> QueryStatus {
        self.entries
            .get(key)
            .map_or(QueryStatus::Idle, |e| e.status)
    }

    pub fn is_fresh(&self, key: &QueryKey, stale_time: Duration, now: DateTime<Utc>) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| e.is_fresh(stale_time, now))
    }

    /// Enter `Loading`, keeping the previous value, and return the fetch generation.
    pub fn begin_fetch(&mut self, key: &QueryKey) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        let entry = self
            .entries
            .entry(key.clone())
            .or_insert_with(CacheEntry::new);
        entry.status = QueryStatus::Loading;
        entry.generation = generation;
        generation
    }

    /// Record a fetch outcome. Returns `false` when the fetch was superseded
    /// or its entry removed in the meantime.
    pub fn resolve(
        &mut self,
        key: &QueryKey,
        generation: u64,
        outcome: std::result::Result<Value, String>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            log::debug!("Dropping result for removed query {}", key);
            return false;
        };
        if entry.generation != generation {
            log::debug!(
                "Dropping superseded result for {} (generation {} < {})",
                key,
                generation,
                entry.generation
            );
            return false;
        }

        entry.settled_at = Some(now);
        match outcome {
            Ok(value) => {
                entry.status = QueryStatus::Success;
                entry.data = Some(value);
                entry.error = None;
                entry.updated_at = Some(now);
                // Fetches started before the last invalidation stay stale.
                entry.invalidated = entry.invalidated && generation <= entry.invalidated_at;
            }
            Err(message) => {
                entry.status = QueryStatus::Error;
                entry.error = Some(message);
            }
        }
        true
    }

    /// Store a value directly, as if fetched at `now`.
    pub fn set_data(&mut self, key: &QueryKey, value: Value, now: DateTime<Utc>) {
        let generation = self.begin_fetch(key);
        self.resolve(key, generation, Ok(value), now);
    }

    /// Mark every entry under `prefix` stale. Returns how many matched.
    pub fn invalidate(&mut self, prefix: &QueryKey) -> usize {
        let marker = self.next_generation;
        let mut count = 0;
        for (key, entry) in self.entries.iter_mut() {
            if key.matches(prefix) {
                entry.invalidated = true;
                entry.invalidated_at = marker;
                count += 1;
            }
        }
        count
    }

    /// Drop every entry under `prefix`. In-flight fetches for them are discarded.
    pub fn remove(&mut self, prefix: &QueryKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.matches(prefix));
        before - self.entries.len()
    }

    /// Drop settled entries that have not been refreshed within `cache_time`.
    ///
    /// Entries with a fetch in flight are kept. Returns how many were dropped.
    pub fn gc(&mut self, now: DateTime<Utc>, cache_time: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, entry| {
            let expired = entry.status != QueryStatus::Loading
                && entry.settled_at.is_none_or(|settled| {
                    settled
                        .checked_add_signed(cache_time)
                        .is_some_and(|until| until <= now)
                });
            if expired {
                log::debug!("Collecting unused query {}", key);
            }
            !expired
        });
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::QueryKind;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        "2026-05-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_loading_keeps_previous_value() {
        let mut cache = QueryCache::new();
        let key = QueryKey::story("1");
        cache.set_data(&key, json!({"v": 1}), now());

        cache.begin_fetch(&key);
        assert_eq!(cache.status(&key), QueryStatus::Loading);
        assert_eq!(cache.data::<Value>(&key), Some(json!({"v": 1})));
    }

    #[test]
    fn test_newer_generation_wins() {
        let mut cache = QueryCache::new();
        let key = QueryKey::story("1");

        let old = cache.begin_fetch(&key);
        let new = cache.begin_fetch(&key);

        assert!(cache.resolve(&key, new, Ok(json!("new")), now()));
        assert!(!cache.resolve(&key, old, Ok(json!("old")), now()));
        assert_eq!(cache.data::<String>(&key).as_deref(), Some("new"));
    }

    #[test]
    fn test_error_keeps_data() {
        let mut cache = QueryCache::new();
        let key = QueryKey::story("1");
        cache.set_data(&key, json!("kept"), now());

        let generation = cache.begin_fetch(&key);
        cache.resolve(&key, generation, Err("boom".to_string()), now());

        let entry = cache.get(&key).unwrap();
        assert_eq!(entry.status, QueryStatus::Error);
        assert_eq!(entry.error.as_deref(), Some("boom"));
        assert_eq!(cache.data::<String>(&key).as_deref(), Some("kept"));
    }

    #[test]
    fn test_freshness_window_and_invalidation() {
        let mut cache = QueryCache::new();
        let key = QueryKey::story("1");
        cache.set_data(&key, json!(1), now());

        assert!(cache.is_fresh(&key, Duration::seconds(30), now() + Duration::seconds(10)));
        assert!(!cache.is_fresh(&key, Duration::seconds(30), now() + Duration::seconds(31)));
        assert!(!cache.is_fresh(&key, Duration::zero(), now()));

        assert_eq!(cache.invalidate(&QueryKey::new(QueryKind::SingleStory)), 1);
        assert!(!cache.is_fresh(&key, Duration::seconds(30), now()));
    }

    #[test]
    fn test_remove_discards_in_flight_fetch() {
        let mut cache = QueryCache::new();
        let key = QueryKey::story("1");
        let generation = cache.begin_fetch(&key);

        assert_eq!(cache.remove(&QueryKey::new(QueryKind::SingleStory)), 1);
        assert!(!cache.resolve(&key, generation, Ok(json!(1)), now()));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_by_prefix_only_touches_matching_kind() {
        let mut cache = QueryCache::new();
        cache.set_data(&QueryKey::story("1"), json!(1), now());
        cache.set_data(&QueryKey::story("2"), json!(2), now());
        cache.set_data(&QueryKey::check_like("1"), json!(true), now());

        assert_eq!(cache.invalidate(&QueryKey::story("1")), 1);
        assert!(cache.get(&QueryKey::story("1")).unwrap().invalidated);
        assert!(!cache.get(&QueryKey::story("2")).unwrap().invalidated);
        assert!(!cache.get(&QueryKey::check_like("1")).unwrap().invalidated);
    }

    #[test]
    fn test_invalidation_during_fetch_outlives_old_response() {
        let mut cache = QueryCache::new();
        let key = QueryKey::story("1");
        cache.set_data(&key, json!({"likes": 0}), now());

        let in_flight = cache.begin_fetch(&key);
        cache.invalidate(&QueryKey::new(QueryKind::SingleStory));
        assert!(cache.resolve(&key, in_flight, Ok(json!({"likes": 0})), now()));

        assert!(cache.get(&key).unwrap().invalidated);
        assert!(!cache.is_fresh(&key, Duration::seconds(60), now()));
        assert_eq!(cache.data::<Value>(&key), Some(json!({"likes": 0})));

        let refetch = cache.begin_fetch(&key);
        cache.resolve(&key, refetch, Ok(json!({"likes": 1})), now());
        assert!(cache.is_fresh(&key, Duration::seconds(60), now()));
    }

    #[test]
    fn test_gc_drops_settled_entries_past_cache_time() {
        let mut cache = QueryCache::new();
        let old = QueryKey::story("1");
        let failed = QueryKey::story("2");
        let loading = QueryKey::story("3");
        cache.set_data(&old, json!(1), now());
        let generation = cache.begin_fetch(&failed);
        cache.resolve(&failed, generation, Err("boom".to_string()), now());
        cache.begin_fetch(&loading);

        let window = Duration::minutes(5);
        assert_eq!(cache.gc(now() + Duration::minutes(4), window), 0);
        assert_eq!(cache.len(), 3);

        assert_eq!(cache.gc(now() + Duration::minutes(5), window), 2);
        assert!(cache.get(&old).is_none());
        assert!(cache.get(&failed).is_none());
        assert_eq!(cache.status(&loading), QueryStatus::Loading);
    }
}
