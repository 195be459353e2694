use chrono::{DateTime, Utc};

use crate::config::prematch::{FIVE_MIN_WINDOW_SECS, TEN_MIN_WINDOW_SECS};
use crate::state::{FixtureStore, PreAlert};
use crate::types::{FixtureSnapshot, MatchEvent, Notification};

/// Diffs one fixture snapshot (plus this tick's discrete events) against the
/// stored previous state, returning the notifications to emit in order and
/// updating the store.
///
/// Emission order within a tick is fixed: pre-match alerts, kickoff, score
/// change, status change (with full-time as a second distinct notification),
/// then discrete events in gateway order. At most one notification per
/// category per transition is ever produced across the process lifetime, and
/// feeding the identical snapshot twice emits nothing on the second call.
pub fn diff(
    store: &mut FixtureStore,
    snapshot: &FixtureSnapshot,
    events: &[MatchEvent],
    now: DateTime<Utc>,
) -> Vec<Notification> {
    let mut out = Vec::new();

    // 1. Pre-match countdown. Both windows are independent and best-effort:
    // a poll cadence slower than the window can skip either alert, and there
    // is no retroactive catch-up.
    let secs_to_kickoff = (snapshot.kickoff_utc - now).num_seconds();
    if secs_to_kickoff > FIVE_MIN_WINDOW_SECS
        && secs_to_kickoff <= TEN_MIN_WINDOW_SECS
        && !store.pre_alert_fired(snapshot.id, PreAlert::TenMin)
    {
        store.record_pre_alert(snapshot.id, PreAlert::TenMin);
        out.push(Notification::PreMatchAlert {
            snapshot: snapshot.clone(),
            minutes_remaining: 10,
        });
    }
    if secs_to_kickoff > 0
        && secs_to_kickoff <= FIVE_MIN_WINDOW_SECS
        && !store.pre_alert_fired(snapshot.id, PreAlert::FiveMin)
    {
        store.record_pre_alert(snapshot.id, PreAlert::FiveMin);
        out.push(Notification::PreMatchAlert {
            snapshot: snapshot.clone(),
            minutes_remaining: 5,
        });
    }

    // 2. First observation. A fixture still upcoming is not stored — kickoff
    // fires on the first snapshot with a started status, even if the process
    // came up mid-match. No further diffing on the first sighting: there is
    // nothing to diff against.
    if !store.is_tracked(snapshot.id) {
        if !snapshot.status.is_upcoming() {
            out.push(Notification::Kickoff {
                snapshot: snapshot.clone(),
            });
            store.insert_tracked(snapshot.id, snapshot.status.clone(), snapshot.score);
        }
        return out;
    }
    let Some(tracked) = store.tracked_mut(snapshot.id) else {
        return out;
    };

    // 3. Score diff — reacts to inequality, not increase, so a provider
    // correcting a score downward still fires. A None → Some transition is
    // normalization, not a goal.
    if let (Some(prev), Some((home, away))) = (tracked.last_score, snapshot.score) {
        if prev != (home, away) {
            out.push(Notification::GoalScored {
                snapshot: snapshot.clone(),
                home_goals: home,
                away_goals: away,
            });
        }
    }
    tracked.last_score = snapshot.score;

    // 4. Status diff. Full-time additionally emits its own notification so
    // downstream summary collaborators get the final score directly.
    if snapshot.status != tracked.last_status {
        out.push(Notification::StatusChanged {
            snapshot: snapshot.clone(),
            to: snapshot.status.clone(),
        });
        if snapshot.status.is_full_time() {
            out.push(Notification::FullTimeReached {
                snapshot: snapshot.clone(),
            });
        }
    }
    tracked.last_status = snapshot.status.clone();

    // 5. Discrete events, deduplicated by fingerprint, gateway order preserved.
    for event in events {
        if tracked.note_event(&event.fingerprint()) {
            out.push(Notification::MatchEvent {
                snapshot: snapshot.clone(),
                event: event.clone(),
            });
        }
    }

    out
}
