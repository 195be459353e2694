use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::interval;
use tracing::{debug, info};

use crate::api::health::HealthState;
use crate::config::Config;
use crate::diff::diff;
use crate::dispatch::Dispatcher;
use crate::gateway::FootballGateway;
use crate::news::NewsTask;
use crate::state::FixtureStore;
use crate::types::FixtureSnapshot;

/// The single poll-loop worker. Owns all mutable core state (the fixture
/// store and the news dedup caches) and drives gateway → diff → dispatch on a
/// fixed interval. One fixture's bad data never blocks the rest of the tick,
/// and the loop itself never exits — re-polling is the retry mechanism for
/// every transient failure below it.
pub struct LivePoller {
    cfg: Config,
    gateway: Option<FootballGateway>,
    dispatcher: Arc<Dispatcher>,
    health: Arc<HealthState>,
    store: FixtureStore,
    news: NewsTask,
}

impl LivePoller {
    pub fn new(
        cfg: Config,
        gateway: Option<FootballGateway>,
        dispatcher: Arc<Dispatcher>,
        health: Arc<HealthState>,
    ) -> Self {
        let news = NewsTask::new(&cfg);
        Self {
            cfg,
            gateway,
            dispatcher,
            health,
            store: FixtureStore::new(),
            news,
        }
    }

    pub async fn run(mut self) {
        let mut ticker = interval(Duration::from_secs(self.cfg.poll_interval_secs));
        loop {
            ticker.tick().await;
            self.tick(Utc::now()).await;
        }
    }

    async fn tick(&mut self, now: DateTime<Utc>) {
        if let Some(gateway) = self.gateway.clone() {
            let snapshots = gateway.fetch_live_fixtures().await;
            debug!(live = snapshots.len(), "live fixtures this tick");

            for snapshot in &snapshots {
                self.process_fixture(&gateway, snapshot, now).await;
            }
        }

        let posted = self.news.poll(&self.dispatcher, now).await;
        if posted > 0 {
            self.health.add_news_posted(posted as u64);
        }

        self.health.set_last_tick_unix(now.timestamp());
        self.health.set_tracked_fixtures(self.store.tracked_count() as u64);
    }

    async fn process_fixture(
        &mut self,
        gateway: &FootballGateway,
        snapshot: &FixtureSnapshot,
        now: DateTime<Utc>,
    ) {
        // Event detail costs an extra API call per fixture per tick; spend it
        // only on fixtures the allow-lists care about (or all, when unset).
        let events = if !snapshot.status.is_upcoming() && self.events_wanted(snapshot) {
            gateway.fetch_fixture_events(snapshot.id).await
        } else {
            Vec::new()
        };

        let notifications = diff(&mut self.store, snapshot, &events, now);
        if !notifications.is_empty() {
            info!(
                fixture_id = snapshot.id,
                count = notifications.len(),
                "{} vs {}: {} notifications",
                snapshot.home_team,
                snapshot.away_team,
                notifications.len(),
            );
        }

        // Dispatch in produced order. Send failures are absorbed by the
        // dispatcher and never roll back store updates (at-most-once).
        for notification in &notifications {
            self.dispatcher.dispatch(notification).await;
            self.health.inc_notifications_sent();
        }
    }

    /// Empty allow-lists mean every fixture qualifies; otherwise the league
    /// or either team must match (case-insensitive).
    fn events_wanted(&self, snapshot: &FixtureSnapshot) -> bool {
        if self.cfg.important_leagues.is_empty() && self.cfg.favorite_teams.is_empty() {
            return true;
        }
        let league_match = self
            .cfg
            .important_leagues
            .iter()
            .any(|l| l.eq_ignore_ascii_case(&snapshot.league));
        let team_match = self.cfg.favorite_teams.iter().any(|t| {
            t.eq_ignore_ascii_case(&snapshot.home_team) || t.eq_ignore_ascii_case(&snapshot.away_team)
        });
        league_match || team_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FixtureStatus;
    use chrono::TimeZone;

    fn config_with_lists(leagues: &[&str], teams: &[&str]) -> Config {
        Config {
            bot_token: None,
            chat_id: None,
            api_football_key: None,
            poll_interval_secs: 60,
            important_leagues: leagues.iter().map(|s| s.to_string()).collect(),
            favorite_teams: teams.iter().map(|s| s.to_string()).collect(),
            rss_sources: Vec::new(),
            api_port: 8080,
            log_level: "info".to_string(),
        }
    }

    fn poller(cfg: Config) -> LivePoller {
        let dispatcher = Arc::new(Dispatcher::new(&cfg));
        LivePoller::new(cfg, None, dispatcher, Arc::new(HealthState::new()))
    }

    fn snapshot(league: &str, home: &str, away: &str) -> FixtureSnapshot {
        FixtureSnapshot {
            id: 1,
            status: FixtureStatus::FirstHalf,
            score: Some((0, 0)),
            kickoff_utc: Utc.with_ymd_and_hms(2026, 8, 29, 14, 0, 0).unwrap(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            league: league.to_string(),
            country: None,
        }
    }

    #[test]
    fn empty_allow_lists_cover_every_fixture() {
        let poller = poller(config_with_lists(&[], &[]));
        assert!(poller.events_wanted(&snapshot("Serie B", "Pisa", "Bari")));
    }

    #[test]
    fn league_allow_list_matches_case_insensitively() {
        let poller = poller(config_with_lists(&["premier league"], &[]));
        assert!(poller.events_wanted(&snapshot("Premier League", "Arsenal", "Chelsea")));
        assert!(!poller.events_wanted(&snapshot("Serie B", "Pisa", "Bari")));
    }

    #[test]
    fn favorite_team_matches_either_side() {
        let poller = poller(config_with_lists(&[], &["Arsenal"]));
        assert!(poller.events_wanted(&snapshot("FA Cup", "Wrexham", "Arsenal")));
        assert!(poller.events_wanted(&snapshot("FA Cup", "Arsenal", "Wrexham")));
        assert!(!poller.events_wanted(&snapshot("FA Cup", "Wrexham", "Chelsea")));
    }
}
