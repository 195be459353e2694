use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::time::interval;
use tracing::info;

use crate::config::SCHEDULE_INTERVAL_SECS;
use crate::dispatch::Dispatcher;
use crate::gateway::FootballGateway;
use crate::types::{FixtureId, FixtureSnapshot};

/// Lower-frequency side task: announces each of today's upcoming fixtures
/// once. The per-day dedup set resets on UTC day rollover, so tomorrow's card
/// gets announced fresh; live coverage of the same fixtures is the poll
/// loop's job, not this one's.
pub struct ScheduleDigest {
    gateway: FootballGateway,
    dispatcher: Arc<Dispatcher>,
    announced: HashSet<FixtureId>,
    current_day: NaiveDate,
}

impl ScheduleDigest {
    pub fn new(gateway: FootballGateway, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            gateway,
            dispatcher,
            announced: HashSet::new(),
            current_day: Utc::now().date_naive(),
        }
    }

    pub async fn run(mut self) {
        let mut ticker = interval(Duration::from_secs(SCHEDULE_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            self.tick(Utc::now()).await;
        }
    }

    async fn tick(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        if today != self.current_day {
            self.current_day = today;
            self.announced.clear();
            info!("new day, schedule digest state reset");
        }

        let fixtures = self.gateway.fetch_fixtures_by_date(today).await;
        let mut announced_now = 0;
        for fixture in &fixtures {
            if self.announce(fixture) {
                self.dispatch_announcement(fixture).await;
                announced_now += 1;
            }
        }

        if announced_now > 0 {
            info!(
                announced = announced_now,
                total_today = fixtures.len(),
                "schedule digest: announced {announced_now} upcoming fixtures",
            );
        }
    }

    /// Decides and records whether a fixture gets a schedule announcement.
    fn announce(&mut self, fixture: &FixtureSnapshot) -> bool {
        if !fixture.status.is_upcoming() || self.announced.contains(&fixture.id) {
            return false;
        }
        self.announced.insert(fixture.id);
        true
    }

    async fn dispatch_announcement(&self, fixture: &FixtureSnapshot) {
        let text = format!(
            "📅 <b>Today's match</b>\n\n{}",
            crate::dispatch::fixture_lines(fixture),
        );
        self.dispatcher.send_text(&text).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::FixtureStatus;
    use chrono::TimeZone;

    fn test_config() -> Config {
        Config {
            bot_token: None,
            chat_id: None,
            api_football_key: None,
            poll_interval_secs: 60,
            important_leagues: Vec::new(),
            favorite_teams: Vec::new(),
            rss_sources: Vec::new(),
            api_port: 8080,
            log_level: "info".to_string(),
        }
    }

    fn upcoming_fixture(id: FixtureId) -> FixtureSnapshot {
        FixtureSnapshot {
            id,
            status: FixtureStatus::NotStarted,
            score: None,
            kickoff_utc: Utc.with_ymd_and_hms(2026, 8, 29, 18, 0, 0).unwrap(),
            home_team: "Arsenal".to_string(),
            away_team: "Chelsea".to_string(),
            league: "Premier League".to_string(),
            country: Some("England".to_string()),
        }
    }

    fn digest() -> ScheduleDigest {
        let cfg = test_config();
        ScheduleDigest::new(
            FootballGateway::new("http://localhost:0", "test-key"),
            Arc::new(Dispatcher::new(&cfg)),
        )
    }

    #[test]
    fn fixture_announced_at_most_once() {
        let mut digest = digest();
        let fixture = upcoming_fixture(1);
        assert!(digest.announce(&fixture));
        assert!(!digest.announce(&fixture));
    }

    #[test]
    fn live_fixture_is_not_announced() {
        let mut digest = digest();
        let mut fixture = upcoming_fixture(2);
        fixture.status = FixtureStatus::FirstHalf;
        assert!(!digest.announce(&fixture));
    }

    #[test]
    fn day_rollover_resets_announced_set() {
        let mut digest = digest();
        let fixture = upcoming_fixture(3);
        assert!(digest.announce(&fixture));

        // Simulate what tick() does on rollover.
        digest.current_day = digest.current_day.succ_opt().unwrap();
        digest.announced.clear();
        assert!(digest.announce(&fixture));
    }
}
