use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;

use crate::config::GATEWAY_TIMEOUT_SECS;
use crate::types::{EventKind, FixtureId, FixtureSnapshot, FixtureStatus, MatchEvent};

/// Read-only client for the API-Football v3 REST API.
///
/// Every fetch is a single round trip with a bounded timeout. Transport
/// failure, non-200 status, or a malformed payload all degrade to an empty
/// result plus a warn log — nothing propagates past this boundary, and the
/// poll loop's fixed-interval re-poll is the only retry mechanism.
#[derive(Debug, Clone)]
pub struct FootballGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FootballGateway {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(GATEWAY_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Snapshot of every fixture currently reported as in progress.
    pub async fn fetch_live_fixtures(&self) -> Vec<FixtureSnapshot> {
        self.response_items("/fixtures?live=all")
            .await
            .iter()
            .filter_map(parse_fixture)
            .collect()
    }

    /// All fixtures scheduled for a calendar day (UTC). Used by the schedule digest.
    pub async fn fetch_fixtures_by_date(&self, date: NaiveDate) -> Vec<FixtureSnapshot> {
        let path = format!("/fixtures?date={}", date.format("%Y-%m-%d"));
        self.response_items(&path)
            .await
            .iter()
            .filter_map(parse_fixture)
            .collect()
    }

    /// Discrete events (goals, cards, substitutions) for one fixture, in the
    /// order the provider returns them — chronological by minute in practice,
    /// not re-sorted here.
    pub async fn fetch_fixture_events(&self, id: FixtureId) -> Vec<MatchEvent> {
        let path = format!("/fixtures/events?fixture={id}");
        self.response_items(&path)
            .await
            .iter()
            .filter_map(|v| parse_event(id, v))
            .collect()
    }

    /// GET a path and return the `response` array, or empty on any failure.
    async fn response_items(&self, path_and_query: &str) -> Vec<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path_and_query);

        let resp = match self
            .client
            .get(&url)
            .header("x-apisports-key", &self.api_key)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("API-Football request failed for {path_and_query}: {e}");
                return Vec::new();
            }
        };

        if !resp.status().is_success() {
            warn!(
                status = resp.status().as_u16(),
                "API-Football returned non-200 for {path_and_query}"
            );
            return Vec::new();
        }

        let body: serde_json::Value = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!("API-Football payload parse failed for {path_and_query}: {e}");
                return Vec::new();
            }
        };

        match body.get("response").and_then(|r| r.as_array()) {
            Some(items) => items.clone(),
            None => {
                warn!("API-Football payload missing `response` array for {path_and_query}");
                Vec::new()
            }
        }
    }
}

/// Parse one item of a `/fixtures` response. Returns None when the item lacks
/// the fields needed to identify the fixture — one malformed entry must not
/// block the rest of the tick.
pub fn parse_fixture(v: &serde_json::Value) -> Option<FixtureSnapshot> {
    let fixture = v.get("fixture")?;
    let id = fixture.get("id")?.as_i64()?;

    let status = fixture
        .get("status")
        .and_then(|s| s.get("short"))
        .and_then(|s| s.as_str())
        .map(FixtureStatus::from_short)
        .unwrap_or(FixtureStatus::Other(String::new()));

    let kickoff_utc = fixture
        .get("date")
        .and_then(|d| d.as_str())
        .and_then(parse_rfc3339_utc)?;

    let teams = v.get("teams")?;
    let home_team = teams.get("home")?.get("name")?.as_str()?.to_string();
    let away_team = teams.get("away")?.get("name")?.as_str()?.to_string();

    let league = v
        .get("league")
        .and_then(|l| l.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("")
        .to_string();
    let country = v
        .get("league")
        .and_then(|l| l.get("country"))
        .and_then(|c| c.as_str())
        .map(|c| c.to_string());

    // Both goal fields must be numeric for a score to exist; before kickoff
    // the provider sends nulls.
    let score = match (
        v.get("goals").and_then(|g| g.get("home")).and_then(|h| h.as_u64()),
        v.get("goals").and_then(|g| g.get("away")).and_then(|a| a.as_u64()),
    ) {
        (Some(h), Some(a)) => Some((h as u32, a as u32)),
        _ => None,
    };

    Some(FixtureSnapshot {
        id,
        status,
        score,
        kickoff_utc,
        home_team,
        away_team,
        league,
        country,
    })
}

/// Parse one item of a `/fixtures/events` response. Unrecognized event types
/// (VAR reviews, missed penalties filed under other labels) are skipped.
pub fn parse_event(fixture_id: FixtureId, v: &serde_json::Value) -> Option<MatchEvent> {
    let kind_str = v.get("type")?.as_str()?;
    let detail = v
        .get("detail")
        .and_then(|d| d.as_str())
        .unwrap_or("")
        .to_string();

    let kind = match kind_str.to_ascii_lowercase().as_str() {
        "goal" => EventKind::Goal,
        "card" if detail.contains("Yellow") => EventKind::YellowCard,
        "card" if detail.contains("Red") => EventKind::RedCard,
        "subst" => EventKind::Substitution,
        _ => return None,
    };

    let team = v.get("team")?.get("name")?.as_str()?.to_string();
    let player = v
        .get("player")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("")
        .to_string();
    let assist = v
        .get("assist")
        .and_then(|a| a.get("name"))
        .and_then(|n| n.as_str())
        .map(|n| n.to_string());
    let minute = v
        .get("time")
        .and_then(|t| t.get("elapsed"))
        .and_then(|e| e.as_i64())
        .unwrap_or(0);

    Some(MatchEvent {
        fixture_id,
        minute,
        team,
        player,
        kind,
        detail,
        assist,
    })
}

fn parse_rfc3339_utc(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_json(status: &str, home_goals: Option<u32>, away_goals: Option<u32>) -> serde_json::Value {
        serde_json::json!({
            "fixture": {
                "id": 867001,
                "date": "2026-08-29T14:00:00+00:00",
                "status": { "short": status, "elapsed": 20 }
            },
            "league": { "name": "Premier League", "country": "England" },
            "teams": {
                "home": { "name": "Arsenal" },
                "away": { "name": "Chelsea" }
            },
            "goals": { "home": home_goals, "away": away_goals }
        })
    }

    #[test]
    fn parses_live_fixture() {
        let snap = parse_fixture(&fixture_json("1H", Some(1), Some(0))).unwrap();
        assert_eq!(snap.id, 867001);
        assert_eq!(snap.status, FixtureStatus::FirstHalf);
        assert_eq!(snap.score, Some((1, 0)));
        assert_eq!(snap.home_team, "Arsenal");
        assert_eq!(snap.away_team, "Chelsea");
        assert_eq!(snap.league, "Premier League");
        assert_eq!(snap.country.as_deref(), Some("England"));
        assert_eq!(snap.kickoff_utc.to_rfc3339(), "2026-08-29T14:00:00+00:00");
    }

    #[test]
    fn null_goals_normalize_to_no_score() {
        let snap = parse_fixture(&fixture_json("NS", None, None)).unwrap();
        assert_eq!(snap.status, FixtureStatus::NotStarted);
        assert_eq!(snap.score, None);

        // One-sided nulls also count as no score yet.
        let snap = parse_fixture(&fixture_json("NS", Some(0), None)).unwrap();
        assert_eq!(snap.score, None);
    }

    #[test]
    fn missing_team_name_rejects_the_item_only() {
        let mut v = fixture_json("1H", Some(0), Some(0));
        v["teams"]["home"] = serde_json::json!({});
        assert!(parse_fixture(&v).is_none());
    }

    #[test]
    fn parses_goal_and_card_events() {
        let goal = serde_json::json!({
            "time": { "elapsed": 23 },
            "team": { "name": "Arsenal" },
            "player": { "name": "Saka" },
            "assist": { "name": "Odegaard" },
            "type": "Goal",
            "detail": "Normal Goal"
        });
        let ev = parse_event(867001, &goal).unwrap();
        assert_eq!(ev.kind, EventKind::Goal);
        assert_eq!(ev.minute, 23);
        assert_eq!(ev.assist.as_deref(), Some("Odegaard"));

        let card = serde_json::json!({
            "time": { "elapsed": 55 },
            "team": { "name": "Chelsea" },
            "player": { "name": "James" },
            "assist": { "name": null },
            "type": "Card",
            "detail": "Yellow Card"
        });
        let ev = parse_event(867001, &card).unwrap();
        assert_eq!(ev.kind, EventKind::YellowCard);
        assert_eq!(ev.assist, None);
    }

    #[test]
    fn unknown_event_type_is_skipped() {
        let var = serde_json::json!({
            "time": { "elapsed": 70 },
            "team": { "name": "Arsenal" },
            "player": { "name": null },
            "type": "Var",
            "detail": "Goal cancelled"
        });
        assert!(parse_event(867001, &var).is_none());
    }
}
