//! SessionConfig, play statistics, and SessionState.

use crate::models::game::{GameMatch, Lineup, MatchId, Round};
use crate::models::player::{PairKey, PlayerName};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Fixed length of one round in minutes.
pub const ROUND_MINUTES: u32 = 15;

/// Longest session accepted (one day).
pub const MAX_DURATION_MINUTES: f64 = 24.0 * 60.0;

/// Errors that can occur during session operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionError {
    /// A roster entry was blank after trimming.
    EmptyPlayerName,
    /// A player with this name already exists (names are case-sensitive).
    DuplicatePlayerName(PlayerName),
    /// Roster smaller than 4 players per court.
    NotEnoughPlayers { required: usize, available: usize },
    /// Court count must be at least 1.
    InvalidCourtCount,
    /// Duration must be a positive number of minutes, at most one day.
    InvalidDuration,
    /// Every round the duration allows has already been drawn.
    AllRoundsDrawn,
    /// No match with this id in the session.
    MatchNotFound(MatchId),
    /// A manual lineup must name exactly 4 players.
    WrongLineupSize(usize),
    /// A manual lineup names someone outside the roster.
    UnknownPlayer(PlayerName),
    /// A manual lineup names the same player twice.
    PlayerRepeated(PlayerName),
    /// A manual lineup names a player already on another court this round.
    PlayerAlreadyOnCourt(PlayerName),
    /// Finalize was requested but no match has both scores entered.
    NoResults,
    /// Standings could not be written out.
    Export(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::EmptyPlayerName => write!(f, "Player names cannot be empty"),
            SessionError::DuplicatePlayerName(name) => {
                write!(f, "Player \"{}\" is listed more than once", name)
            }
            SessionError::NotEnoughPlayers { required, available } => write!(
                f,
                "Need at least {} players for the selected courts (have {})",
                required, available
            ),
            SessionError::InvalidCourtCount => write!(f, "Court count must be at least 1"),
            SessionError::InvalidDuration => write!(
                f,
                "Duration must be a positive number of minutes, at most {}",
                MAX_DURATION_MINUTES
            ),
            SessionError::AllRoundsDrawn => write!(f, "All rounds for this session have been drawn"),
            SessionError::MatchNotFound(_) => write!(f, "Match not found"),
            SessionError::WrongLineupSize(n) => {
                write!(f, "A match needs exactly 4 players (got {})", n)
            }
            SessionError::UnknownPlayer(name) => write!(f, "\"{}\" is not on the roster", name),
            SessionError::PlayerRepeated(name) => {
                write!(f, "\"{}\" appears more than once in the match", name)
            }
            SessionError::PlayerAlreadyOnCourt(name) => {
                write!(f, "\"{}\" is already playing on another court this round", name)
            }
            SessionError::NoResults => write!(f, "Please enter at least one set of scores"),
            SessionError::Export(msg) => write!(f, "Could not export standings: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

/// Unique identifier for a session.
pub type SessionId = Uuid;

fn default_court_count() -> usize {
    1
}

fn default_duration_minutes() -> f64 {
    120.0
}

/// Settings chosen before the session starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_court_count")]
    pub court_count: usize,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: f64,
    /// Sit out players who played the previous round, when the roster allows it.
    #[serde(default)]
    pub avoid_back_to_back: bool,
    /// Try not to reuse a team pairing from earlier in the session.
    #[serde(default)]
    pub avoid_repeat_partners: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            court_count: default_court_count(),
            duration_minutes: default_duration_minutes(),
            avoid_back_to_back: false,
            avoid_repeat_partners: false,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.court_count == 0 {
            return Err(SessionError::InvalidCourtCount);
        }
        if !self.duration_minutes.is_finite()
            || self.duration_minutes <= 0.0
            || self.duration_minutes > MAX_DURATION_MINUTES
        {
            return Err(SessionError::InvalidDuration);
        }
        Ok(())
    }

    /// floor(duration / round length), with the duration capped at one day.
    pub fn total_rounds(&self) -> usize {
        if !self.duration_minutes.is_finite() || self.duration_minutes <= 0.0 {
            return 0;
        }
        let minutes = self.duration_minutes.min(MAX_DURATION_MINUTES);
        (minutes / f64::from(ROUND_MINUTES)).floor() as usize
    }

    pub fn players_per_round(&self) -> usize {
        self.court_count * 4
    }

    /// Roster size needed before back-to-back avoidance can be honored.
    pub fn back_to_back_threshold(&self) -> usize {
        self.court_count * 8
    }
}

/// Running load statistics over every drawn match.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayStats {
    pub games_played: HashMap<PlayerName, u32>,
    #[serde(with = "partnership_list")]
    pub partnership_counts: HashMap<PairKey, u32>,
    /// Players from the most recent round only.
    pub last_round_participants: HashSet<PlayerName>,
}

impl PlayStats {
    /// Zero counts for everyone on the roster.
    pub fn new(roster: &[PlayerName]) -> Self {
        Self {
            games_played: roster.iter().map(|p| (p.clone(), 0)).collect(),
            ..Self::default()
        }
    }

    /// Replay every match from scratch.
    pub fn from_rounds(roster: &[PlayerName], rounds: &[Round]) -> Self {
        let mut stats = Self::new(roster);
        for m in rounds.iter().flat_map(|r| r.matches.iter()) {
            stats.apply(&m.lineup);
        }
        if let Some(last) = rounds.last() {
            stats.last_round_participants = last.participants().cloned().collect();
        }
        stats
    }

    pub fn games_played(&self, player: &str) -> u32 {
        self.games_played.get(player).copied().unwrap_or(0)
    }

    pub fn partnership_count(&self, key: &PairKey) -> u32 {
        self.partnership_counts.get(key).copied().unwrap_or(0)
    }

    /// Add one match's contribution.
    pub fn apply(&mut self, lineup: &Lineup) {
        for p in lineup.players() {
            *self.games_played.entry(p.clone()).or_insert(0) += 1;
        }
        for key in lineup.pair_keys() {
            *self.partnership_counts.entry(key).or_insert(0) += 1;
        }
    }

    /// Take back one match's contribution. Pairs that drop to zero are forgotten.
    pub fn remove(&mut self, lineup: &Lineup) {
        for p in lineup.players() {
            if let Some(count) = self.games_played.get_mut(p) {
                *count = count.saturating_sub(1);
            }
        }
        for key in lineup.pair_keys() {
            if let Some(count) = self.partnership_counts.get_mut(&key) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.partnership_counts.remove(&key);
                }
            }
        }
    }

    pub fn total_games_played(&self) -> u32 {
        self.games_played.values().sum()
    }
}

/// Partnership counts go over the wire as a list since JSON keys must be strings.
mod partnership_list {
    use super::*;
    use serde::{Deserializer, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Entry {
        players: (PlayerName, PlayerName),
        count: u32,
    }

    pub fn serialize<S: Serializer>(
        counts: &HashMap<PairKey, u32>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<Entry> = counts
            .iter()
            .map(|(key, &count)| {
                let (a, b) = key.players();
                Entry {
                    players: (a.to_string(), b.to_string()),
                    count,
                }
            })
            .collect();
        entries.sort_by(|x, y| x.players.cmp(&y.players));
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<PairKey, u32>, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| (PairKey::new(&e.players.0, &e.players.1), e.count))
            .collect())
    }
}

/// Full session state: roster, settings, load statistics, and drawn rounds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionState {
    pub id: SessionId,
    /// Ordered as entered; also the tie order for standings.
    pub roster: Vec<PlayerName>,
    pub config: SessionConfig,
    pub started_at: DateTime<Utc>,
    pub stats: PlayStats,
    pub rounds: Vec<Round>,
}

impl SessionState {
    /// Fresh state with no rounds. Callers validate first (see `init_session`).
    pub(crate) fn new(roster: Vec<PlayerName>, config: SessionConfig) -> Self {
        let stats = PlayStats::new(&roster);
        Self {
            id: Uuid::new_v4(),
            roster,
            config,
            started_at: Utc::now(),
            stats,
            rounds: Vec::new(),
        }
    }

    pub fn total_rounds(&self) -> usize {
        self.config.total_rounds()
    }

    /// True once every round the duration allows has been drawn.
    pub fn is_fully_drawn(&self) -> bool {
        self.rounds.len() >= self.total_rounds()
    }

    pub fn in_roster(&self, player: &str) -> bool {
        self.roster.iter().any(|p| p == player)
    }

    /// Scheduled start of round `index`.
    pub fn round_start(&self, index: usize) -> DateTime<Utc> {
        self.started_at + Duration::minutes(i64::from(ROUND_MINUTES) * index as i64)
    }

    pub fn matches(&self) -> impl Iterator<Item = &GameMatch> {
        self.rounds.iter().flat_map(|r| r.matches.iter())
    }

    pub fn find_match(&self, match_id: MatchId) -> Option<&GameMatch> {
        self.matches().find(|m| m.id == match_id)
    }

    /// (round position, match position) of a match.
    pub fn locate_match(&self, match_id: MatchId) -> Result<(usize, usize), SessionError> {
        self.rounds
            .iter()
            .enumerate()
            .find_map(|(ri, r)| {
                r.matches
                    .iter()
                    .position(|m| m.id == match_id)
                    .map(|mi| (ri, mi))
            })
            .ok_or(SessionError::MatchNotFound(match_id))
    }

    /// Restart: drop every round and count, keep roster and settings.
    pub fn restart(&mut self) {
        self.stats = PlayStats::new(&self.roster);
        self.rounds.clear();
        self.started_at = Utc::now();
    }
}
