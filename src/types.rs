use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque, stable identifier assigned by the data provider. Covers the whole
/// fixture lifecycle (scheduled → live → finished); never generated locally.
pub type FixtureId = i64;

// ---------------------------------------------------------------------------
// Fixture status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureStatus {
    NotStarted,
    FirstHalf,
    HalfTime,
    SecondHalf,
    ExtraTime,
    Penalties,
    FullTime,
    Suspended,
    Postponed,
    Cancelled,
    /// Unrecognized short code, kept raw so transitions still diff correctly.
    Other(String),
}

impl FixtureStatus {
    /// Map an API-Football short status code. `FT`/`AET`/`PEN` all collapse to
    /// FullTime — they are the same terminal transition for notification purposes.
    pub fn from_short(short: &str) -> Self {
        match short {
            "NS" | "TBD" => FixtureStatus::NotStarted,
            "1H" | "LIVE" => FixtureStatus::FirstHalf,
            "HT" => FixtureStatus::HalfTime,
            "2H" => FixtureStatus::SecondHalf,
            "ET" | "BT" => FixtureStatus::ExtraTime,
            "P" => FixtureStatus::Penalties,
            "FT" | "AET" | "PEN" => FixtureStatus::FullTime,
            "SUSP" | "INT" => FixtureStatus::Suspended,
            "PST" => FixtureStatus::Postponed,
            "CANC" | "ABD" | "AWD" | "WO" => FixtureStatus::Cancelled,
            other => FixtureStatus::Other(other.to_string()),
        }
    }

    /// Statuses that have not yet (and may never) reach kickoff. A fixture
    /// first observed in one of these is not entered into the tracked store.
    pub fn is_upcoming(&self) -> bool {
        matches!(
            self,
            FixtureStatus::NotStarted | FixtureStatus::Postponed | FixtureStatus::Cancelled
        )
    }

    pub fn is_full_time(&self) -> bool {
        matches!(self, FixtureStatus::FullTime)
    }

    pub fn label(&self) -> &str {
        match self {
            FixtureStatus::NotStarted => "not started",
            FixtureStatus::FirstHalf => "first half",
            FixtureStatus::HalfTime => "half-time",
            FixtureStatus::SecondHalf => "second half",
            FixtureStatus::ExtraTime => "extra time",
            FixtureStatus::Penalties => "penalty shootout",
            FixtureStatus::FullTime => "full-time",
            FixtureStatus::Suspended => "suspended",
            FixtureStatus::Postponed => "postponed",
            FixtureStatus::Cancelled => "cancelled",
            FixtureStatus::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for FixtureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Snapshot — read-only value observed at one poll tick
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FixtureSnapshot {
    pub id: FixtureId,
    pub status: FixtureStatus,
    /// (home, away). None before kickoff — a None → Some(0, 0) transition is
    /// score normalization, not a goal.
    pub score: Option<(u32, u32)>,
    pub kickoff_utc: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    pub country: Option<String>,
}

// ---------------------------------------------------------------------------
// Discrete in-match events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Goal,
    YellowCard,
    RedCard,
    Substitution,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventKind::Goal => "goal",
            EventKind::YellowCard => "yellow_card",
            EventKind::RedCard => "red_card",
            EventKind::Substitution => "substitution",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone)]
pub struct MatchEvent {
    pub fixture_id: FixtureId,
    pub minute: i64,
    pub team: String,
    pub player: String,
    pub kind: EventKind,
    pub detail: String,
    pub assist: Option<String>,
}

impl MatchEvent {
    /// Dedup key. Two poll ticks returning the same provider event must
    /// produce byte-identical fingerprints.
    pub fn fingerprint(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}:{}",
            self.fixture_id, self.minute, self.team, self.player, self.kind, self.detail
        )
    }
}

// ---------------------------------------------------------------------------
// Notifications — output of the diff engine, input to the dispatcher
// ---------------------------------------------------------------------------

/// Each variant carries enough of the snapshot to render a message without
/// re-querying the provider.
#[derive(Debug, Clone)]
pub enum Notification {
    Kickoff {
        snapshot: FixtureSnapshot,
    },
    GoalScored {
        snapshot: FixtureSnapshot,
        home_goals: u32,
        away_goals: u32,
    },
    StatusChanged {
        snapshot: FixtureSnapshot,
        to: FixtureStatus,
    },
    PreMatchAlert {
        snapshot: FixtureSnapshot,
        minutes_remaining: u32,
    },
    MatchEvent {
        snapshot: FixtureSnapshot,
        event: MatchEvent,
    },
    FullTimeReached {
        snapshot: FixtureSnapshot,
    },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Kickoff { .. } => "kickoff",
            Notification::GoalScored { .. } => "goal",
            Notification::StatusChanged { .. } => "status_changed",
            Notification::PreMatchAlert { .. } => "pre_match_alert",
            Notification::MatchEvent { .. } => "match_event",
            Notification::FullTimeReached { .. } => "full_time",
        }
    }

    pub fn fixture_id(&self) -> FixtureId {
        match self {
            Notification::Kickoff { snapshot }
            | Notification::GoalScored { snapshot, .. }
            | Notification::StatusChanged { snapshot, .. }
            | Notification::PreMatchAlert { snapshot, .. }
            | Notification::MatchEvent { snapshot, .. }
            | Notification::FullTimeReached { snapshot } => snapshot.id,
        }
    }
}
