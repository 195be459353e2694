use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Time-windowed dedup set keyed by first-seen timestamp.
///
/// Used for RSS seen-link and seen-title tracking, where the key space grows
/// without bound over a long-running process. Entries older than the retention
/// horizon are pruned; eviction is tied to real time, never to raw count, so a
/// burst of items cannot evict arbitrarily-recent keys.
#[derive(Debug)]
pub struct SeenCache {
    retention: Duration,
    entries: HashMap<String, DateTime<Utc>>,
}

impl SeenCache {
    pub fn new(retention_secs: i64) -> Self {
        Self {
            retention: Duration::seconds(retention_secs),
            entries: HashMap::new(),
        }
    }

    /// Records a key at its first sighting. Returns true if the key was new;
    /// a repeated insert keeps the original first-seen timestamp.
    pub fn insert(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.to_string(), now);
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Drops every entry first seen before the retention horizon.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let horizon = now - self.retention;
        self.entries.retain(|_, first_seen| *first_seen >= horizon);
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

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn insert_reports_first_sighting_only() {
        let mut cache = SeenCache::new(3600);
        assert!(cache.insert("a", at(0)));
        assert!(!cache.insert("a", at(10)));
        assert!(cache.contains("a"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn prune_drops_only_expired_entries() {
        let mut cache = SeenCache::new(3600);
        cache.insert("old", at(0));
        cache.insert("recent", at(3000));

        cache.prune(at(3700));
        assert!(!cache.contains("old"));
        assert!(cache.contains("recent"));
    }

    #[test]
    fn expired_key_can_be_seen_again() {
        let mut cache = SeenCache::new(60);
        cache.insert("k", at(0));
        cache.prune(at(120));
        assert!(cache.insert("k", at(120)));
    }

    #[test]
    fn repeat_insert_keeps_original_first_seen() {
        let mut cache = SeenCache::new(60);
        cache.insert("k", at(0));
        // Re-seeing the key halfway through its life must not extend it.
        cache.insert("k", at(50));
        cache.prune(at(70));
        assert!(!cache.contains("k"));
    }
}
