//! Shared liveness state for the health endpoint.
//! Written by the poll loop, read by the HTTP server; never touches the
//! fixture store.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

#[derive(Default)]
pub struct HealthState {
    /// Unix seconds of the last completed poll tick (0 = none yet).
    last_tick_unix: AtomicI64,
    /// Fixtures currently held in the tracked store.
    tracked_fixtures: AtomicU64,
    /// Lifetime count of dispatched notifications.
    notifications_sent: AtomicU64,
    /// Lifetime count of posted news items.
    news_posted: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_last_tick_unix(&self, secs: i64) {
        self.last_tick_unix.store(secs, Ordering::Relaxed);
    }

    pub fn set_tracked_fixtures(&self, count: u64) {
        self.tracked_fixtures.store(count, Ordering::Relaxed);
    }

    pub fn inc_notifications_sent(&self) {
        self.notifications_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_news_posted(&self, count: u64) {
        self.news_posted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn last_tick_unix(&self) -> i64 {
        self.last_tick_unix.load(Ordering::Relaxed)
    }

    pub fn tracked_fixtures(&self) -> u64 {
        self.tracked_fixtures.load(Ordering::Relaxed)
    }

    pub fn notifications_sent(&self) -> u64 {
        self.notifications_sent.load(Ordering::Relaxed)
    }

    pub fn news_posted(&self) -> u64 {
        self.news_posted.load(Ordering::Relaxed)
    }
}
