use std::time::Duration;

use tracing::{info, warn};

use crate::config::{Config, SEND_TIMEOUT_SECS, TELEGRAM_API_URL};
use crate::error::{AppError, Result};
use crate::types::{EventKind, FixtureSnapshot, Notification};

/// Maps notifications to rendered messages and sends them to the Telegram
/// channel. Never mutates tracked state: a send failure is logged and the
/// notification is lost, but the transition stays marked as seen — deliberate
/// at-most-once delivery.
///
/// With no bot token or chat id configured the dispatcher degrades to
/// logging-only instead of crashing.
pub struct Dispatcher {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
    chat_id: Option<String>,
}

impl Dispatcher {
    pub fn new(cfg: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            api_url: TELEGRAM_API_URL.to_string(),
            token: cfg.bot_token.clone(),
            chat_id: cfg.chat_id.clone(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.token.is_some() && self.chat_id.is_some()
    }

    /// Renders and sends one notification. Errors stop here.
    pub async fn dispatch(&self, notification: &Notification) {
        let text = render(notification);
        info!(
            kind = notification.kind(),
            fixture_id = notification.fixture_id(),
            "dispatching {} notification",
            notification.kind(),
        );
        self.send_text(&text).await;
    }

    /// Sends an HTML-formatted text message; logs on failure.
    pub async fn send_text(&self, text: &str) {
        let Some((token, chat_id)) = self.credentials() else {
            info!("send disabled (no credentials), message:\n{text}");
            return;
        };
        if let Err(e) = self.post_send_message(&token, &chat_id, text).await {
            warn!("Telegram sendMessage failed: {e}");
        }
    }

    /// Sends a photo (by URL) with an HTML caption, falling back to a plain
    /// text message when the photo send fails.
    pub async fn send_photo(&self, caption: &str, photo_url: &str) {
        let Some((token, chat_id)) = self.credentials() else {
            info!("send disabled (no credentials), caption:\n{caption}");
            return;
        };
        if let Err(e) = self.post_send_photo(&token, &chat_id, caption, photo_url).await {
            warn!("Telegram sendPhoto failed, retrying as text: {e}");
            if let Err(e) = self.post_send_message(&token, &chat_id, caption).await {
                warn!("Telegram sendMessage fallback failed: {e}");
            }
        }
    }

    fn credentials(&self) -> Option<(String, String)> {
        Some((self.token.clone()?, self.chat_id.clone()?))
    }

    async fn post_send_message(&self, token: &str, chat_id: &str, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, token);
        let resp = self
            .client
            .post(&url)
            .form(&[("chat_id", chat_id), ("text", text), ("parse_mode", "HTML")])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::Telegram(resp.status().as_u16()));
        }
        Ok(())
    }

    async fn post_send_photo(
        &self,
        token: &str,
        chat_id: &str,
        caption: &str,
        photo_url: &str,
    ) -> Result<()> {
        let url = format!("{}/bot{}/sendPhoto", self.api_url, token);
        let resp = self
            .client
            .post(&url)
            .form(&[
                ("chat_id", chat_id),
                ("photo", photo_url),
                ("caption", caption),
                ("parse_mode", "HTML"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::Telegram(resp.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render(notification: &Notification) -> String {
    match notification {
        Notification::Kickoff { snapshot } => {
            format!("🔴 <b>Kickoff</b>\n\n{}", fixture_lines(snapshot))
        }
        Notification::GoalScored { snapshot, home_goals, away_goals } => {
            format!(
                "⚽ <b>Goal!</b> {} {home_goals} - {away_goals} {}\n\n{}",
                escape_html(&snapshot.home_team),
                escape_html(&snapshot.away_team),
                fixture_lines(snapshot),
            )
        }
        Notification::StatusChanged { snapshot, to } => {
            format!("⌛ <b>Status: {}</b>\n\n{}", escape_html(to.label()), fixture_lines(snapshot))
        }
        Notification::PreMatchAlert { snapshot, minutes_remaining } => {
            format!(
                "⏰ <b>Kickoff in {minutes_remaining} minutes</b>\n\n{}",
                fixture_lines(snapshot),
            )
        }
        Notification::MatchEvent { snapshot, event } => {
            let headline = match event.kind {
                EventKind::Goal => "⚽ Goal",
                EventKind::YellowCard => "🟨 Yellow card",
                EventKind::RedCard => "🟥 Red card",
                EventKind::Substitution => "🔁 Substitution",
            };
            let mut text = format!(
                "{headline} — <b>{}</b> ({}′, {})",
                escape_html(&event.player),
                event.minute,
                escape_html(&event.team),
            );
            if let Some(assist) = &event.assist {
                text.push_str(&format!("\n🅰️ Assist: {}", escape_html(assist)));
            }
            format!("{text}\n\n{}", fixture_lines(snapshot))
        }
        Notification::FullTimeReached { snapshot } => {
            format!("🏁 <b>Full-time</b>\n\n{}", fixture_lines(snapshot))
        }
    }
}

pub(crate) fn fixture_lines(snapshot: &FixtureSnapshot) -> String {
    let mut lines = Vec::new();
    lines.push(format!("🏆 <b>{}</b>", escape_html(&snapshot.league)));
    lines.push(format!(
        "⚽ <b>{}</b> × <b>{}</b>",
        escape_html(&snapshot.home_team),
        escape_html(&snapshot.away_team),
    ));
    if let Some((home, away)) = snapshot.score {
        lines.push(format!("🔢 <b>Score:</b> {home} - {away}"));
    }
    lines.push(format!(
        "⏳ <b>Kickoff:</b> {}",
        snapshot.kickoff_utc.format("%Y-%m-%d %H:%M UTC"),
    ));
    lines.push(format!("⌛ <b>Status:</b> {}", escape_html(snapshot.status.label())));
    if let Some(country) = &snapshot.country {
        lines.push(format!("🌍 <b>Country:</b> {}", escape_html(country)));
    }
    lines.join("\n")
}

/// Minimal escaping for Telegram HTML parse mode.
pub fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FixtureStatus, MatchEvent};
    use chrono::{TimeZone, Utc};

    fn snapshot() -> FixtureSnapshot {
        FixtureSnapshot {
            id: 100,
            status: FixtureStatus::FirstHalf,
            score: Some((1, 0)),
            kickoff_utc: Utc.with_ymd_and_hms(2026, 8, 29, 14, 0, 0).unwrap(),
            home_team: "Brighton & Hove".to_string(),
            away_team: "Chelsea".to_string(),
            league: "Premier League".to_string(),
            country: Some("England".to_string()),
        }
    }

    #[test]
    fn goal_message_carries_score_and_teams() {
        let text = render(&Notification::GoalScored {
            snapshot: snapshot(),
            home_goals: 1,
            away_goals: 0,
        });
        assert!(text.contains("1 - 0"));
        assert!(text.contains("Chelsea"));
        assert!(text.contains("Premier League"));
    }

    #[test]
    fn team_names_are_html_escaped() {
        let text = render(&Notification::Kickoff { snapshot: snapshot() });
        assert!(text.contains("Brighton &amp; Hove"));
        assert!(!text.contains("Brighton & Hove"));
    }

    #[test]
    fn match_event_includes_minute_and_assist() {
        let text = render(&Notification::MatchEvent {
            snapshot: snapshot(),
            event: MatchEvent {
                fixture_id: 100,
                minute: 23,
                team: "Brighton & Hove".to_string(),
                player: "Welbeck".to_string(),
                kind: EventKind::Goal,
                detail: "Normal Goal".to_string(),
                assist: Some("Gross".to_string()),
            },
        });
        assert!(text.contains("Welbeck"));
        assert!(text.contains("23′"));
        assert!(text.contains("Assist: Gross"));
    }

    #[test]
    fn pre_match_alert_names_the_window() {
        let text = render(&Notification::PreMatchAlert {
            snapshot: snapshot(),
            minutes_remaining: 10,
        });
        assert!(text.contains("10 minutes"));
    }
}
