use std::collections::{HashMap, HashSet};

use crate::types::{FixtureId, FixtureStatus};

// ---------------------------------------------------------------------------
// TrackedFixture — last-observed state for one live fixture
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct TrackedFixture {
    pub last_status: FixtureStatus,
    pub last_score: Option<(u32, u32)>,
    /// Fingerprints of already-announced discrete events. Bounded by fixture
    /// lifetime — a finished fixture stops being polled.
    seen_event_keys: HashSet<String>,
}

impl TrackedFixture {
    fn new(status: FixtureStatus, score: Option<(u32, u32)>) -> Self {
        Self {
            last_status: status,
            last_score: score,
            seen_event_keys: HashSet::new(),
        }
    }

    /// Records an event fingerprint. Returns true on first sighting.
    pub fn note_event(&mut self, fingerprint: &str) -> bool {
        self.seen_event_keys.insert(fingerprint.to_string())
    }

    pub fn has_seen_event(&self, fingerprint: &str) -> bool {
        self.seen_event_keys.contains(fingerprint)
    }
}

// ---------------------------------------------------------------------------
// Pre-match alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreAlert {
    TenMin,
    FiveMin,
}

#[derive(Debug, Default, Clone, Copy)]
struct PreAlertRecord {
    ten_min: bool,
    five_min: bool,
}

// ---------------------------------------------------------------------------
// FixtureStore
// ---------------------------------------------------------------------------

/// In-memory mapping from fixture id to last-observed state. Single writer
/// (the poll task); plain maps, no locking. Process lifetime only — a restart
/// loses everything and re-announces kickoff for still-live fixtures, an
/// accepted and documented limitation.
///
/// Pre-alert flags live outside the tracked map: countdown alerts fire while
/// a fixture is still upcoming, before it is ever stored as live.
#[derive(Debug, Default)]
pub struct FixtureStore {
    tracked: HashMap<FixtureId, TrackedFixture>,
    pre_alerts: HashMap<FixtureId, PreAlertRecord>,
}

impl FixtureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracked(&self, id: FixtureId) -> bool {
        self.tracked.contains_key(&id)
    }

    pub fn insert_tracked(
        &mut self,
        id: FixtureId,
        status: FixtureStatus,
        score: Option<(u32, u32)>,
    ) {
        self.tracked.insert(id, TrackedFixture::new(status, score));
    }

    pub fn tracked_mut(&mut self, id: FixtureId) -> Option<&mut TrackedFixture> {
        self.tracked.get_mut(&id)
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    pub fn pre_alert_fired(&self, id: FixtureId, alert: PreAlert) -> bool {
        let Some(rec) = self.pre_alerts.get(&id) else {
            return false;
        };
        match alert {
            PreAlert::TenMin => rec.ten_min,
            PreAlert::FiveMin => rec.five_min,
        }
    }

    pub fn record_pre_alert(&mut self, id: FixtureId, alert: PreAlert) {
        let rec = self.pre_alerts.entry(id).or_default();
        match alert {
            PreAlert::TenMin => rec.ten_min = true,
            PreAlert::FiveMin => rec.five_min = true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_fingerprints_dedup() {
        let mut store = FixtureStore::new();
        store.insert_tracked(1, FixtureStatus::FirstHalf, Some((0, 0)));

        let tracked = store.tracked_mut(1).unwrap();
        assert!(tracked.note_event("1:10:Team:Player:goal:Normal Goal"));
        assert!(!tracked.note_event("1:10:Team:Player:goal:Normal Goal"));
        assert!(tracked.has_seen_event("1:10:Team:Player:goal:Normal Goal"));
    }

    #[test]
    fn pre_alerts_independent_per_window_and_fixture() {
        let mut store = FixtureStore::new();

        assert!(!store.pre_alert_fired(7, PreAlert::TenMin));
        store.record_pre_alert(7, PreAlert::TenMin);
        assert!(store.pre_alert_fired(7, PreAlert::TenMin));
        assert!(!store.pre_alert_fired(7, PreAlert::FiveMin));
        assert!(!store.pre_alert_fired(8, PreAlert::TenMin));

        store.record_pre_alert(7, PreAlert::FiveMin);
        assert!(store.pre_alert_fired(7, PreAlert::FiveMin));
    }

    #[test]
    fn pre_alerts_do_not_create_tracked_state() {
        let mut store = FixtureStore::new();
        store.record_pre_alert(7, PreAlert::TenMin);
        assert!(!store.is_tracked(7));
        assert_eq!(store.tracked_count(), 0);
    }
}
