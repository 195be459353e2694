use crate::error::{AppError, Result};

pub const API_FOOTBALL_URL: &str = "https://v3.football.api-sports.io";
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Single-round-trip budget for API-Football calls (seconds).
pub const GATEWAY_TIMEOUT_SECS: u64 = 20;

/// Telegram send timeout (seconds).
pub const SEND_TIMEOUT_SECS: u64 = 10;

/// Live poll cadence when POLL_INTERVAL_SECS is unset (seconds).
pub const POLL_INTERVAL_SECS: u64 = 60;

/// Schedule digest cadence (seconds).
pub const SCHEDULE_INTERVAL_SECS: u64 = 3600;

/// Retention horizon for RSS seen-link/seen-title keys (seconds; 7 days).
/// Keys older than this are pruned — dedup is time-windowed, not size-capped.
pub const SEEN_RETENTION_SECS: i64 = 7 * 24 * 3600;

/// Minimum cleaned body length for an RSS item to be worth posting.
pub const MIN_NEWS_BODY_CHARS: usize = 40;

/// Pre-match alert windows, in seconds to kickoff.
/// Ten-minute alert fires in (300, 600], five-minute alert in (0, 300].
/// Both are best-effort: a slow poll cadence can skip either window entirely.
pub mod prematch {
    pub const TEN_MIN_WINDOW_SECS: i64 = 600;
    pub const FIVE_MIN_WINDOW_SECS: i64 = 300;
}

/// Feeds used when RSS_SOURCES is unset.
pub const DEFAULT_RSS_SOURCES: &[&str] = &[
    "https://www.skysports.com/rss/12040",
    "https://www.espn.com/espn/rss/soccer/news",
    "https://www.goal.com/feeds/en/news",
];

#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token (BOT_TOKEN). Absent → sends are logged, not delivered.
    pub bot_token: Option<String>,
    /// Channel identifier (CHAT_ID), e.g. "@somechannel".
    pub chat_id: Option<String>,
    /// API-Football key (API_FOOTBALL_KEY). Absent → fixture polling disabled.
    pub api_football_key: Option<String>,
    pub poll_interval_secs: u64,
    /// League names that always get per-fixture event detail (IMPORTANT_LEAGUES, comma-separated).
    pub important_leagues: Vec<String>,
    /// Team names that always get per-fixture event detail (FAVORITE_TEAMS, comma-separated).
    pub favorite_teams: Vec<String>,
    pub rss_sources: Vec<String>,
    pub api_port: u16,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bot_token: env_nonempty("BOT_TOKEN"),
            chat_id: env_nonempty("CHAT_ID"),
            api_football_key: env_nonempty("API_FOOTBALL_KEY"),
            poll_interval_secs: std::env::var("POLL_INTERVAL_SECS")
                .unwrap_or_default()
                .parse::<u64>()
                .unwrap_or(POLL_INTERVAL_SECS),
            important_leagues: env_list("IMPORTANT_LEAGUES"),
            favorite_teams: env_list("FAVORITE_TEAMS"),
            rss_sources: {
                let sources = env_list("RSS_SOURCES");
                if sources.is_empty() {
                    DEFAULT_RSS_SOURCES.iter().map(|s| s.to_string()).collect()
                } else {
                    sources
                }
            },
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
