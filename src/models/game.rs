//! Match (game), Team, Score, and Round for doubles play.

use crate::models::player::{PairKey, PlayerName};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::{Builder, Uuid};

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which side of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    #[default]
    One,
    Two,
}

/// Final points for both teams. Entered together or not at all.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub team_1: u32,
    pub team_2: u32,
}

impl Score {
    pub fn new(team_1: u32, team_2: u32) -> Self {
        Self { team_1, team_2 }
    }

    /// None on a tie.
    pub fn winner(&self) -> Option<Team> {
        match self.team_1.cmp(&self.team_2) {
            std::cmp::Ordering::Greater => Some(Team::One),
            std::cmp::Ordering::Less => Some(Team::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Four players split into two teams of two.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    pub team_1: [PlayerName; 2],
    pub team_2: [PlayerName; 2],
}

impl Lineup {
    /// Positions 0,1 form team 1; positions 2,3 form team 2.
    pub fn from_four([a, b, c, d]: [PlayerName; 4]) -> Self {
        Self {
            team_1: [a, b],
            team_2: [c, d],
        }
    }

    /// All four players, team 1 first.
    pub fn players(&self) -> impl Iterator<Item = &PlayerName> {
        self.team_1.iter().chain(self.team_2.iter())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.players().any(|p| p == name)
    }

    /// The partnership key of each team.
    pub fn pair_keys(&self) -> [PairKey; 2] {
        [
            PairKey::new(&self.team_1[0], &self.team_1[1]),
            PairKey::new(&self.team_2[0], &self.team_2[1]),
        ]
    }

    pub fn team(&self, team: Team) -> &[PlayerName; 2] {
        match team {
            Team::One => &self.team_1,
            Team::Two => &self.team_2,
        }
    }
}

/// A single drawn match on one court of one round.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    /// 0-based round index.
    pub round: usize,
    /// 0-based court index within the round.
    pub court: usize,
    pub lineup: Lineup,
    /// None if not yet played.
    pub score: Option<Score>,
}

impl GameMatch {
    pub fn new(round: usize, court: usize, lineup: Lineup) -> Self {
        Self::with_id(Uuid::new_v4(), round, court, lineup)
    }

    /// A match whose v4 id comes from `rng`, so a seeded session repeats its ids.
    pub fn drawn<R: Rng>(round: usize, court: usize, lineup: Lineup, rng: &mut R) -> Self {
        let id = Builder::from_random_bytes(rng.gen()).into_uuid();
        Self::with_id(id, round, court, lineup)
    }

    fn with_id(id: MatchId, round: usize, court: usize, lineup: Lineup) -> Self {
        Self {
            id,
            round,
            court,
            lineup,
            score: None,
        }
    }
}

/// One set of simultaneous matches, one per court.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub index: usize,
    /// Scheduled start (session start + index * round length).
    pub starts_at: DateTime<Utc>,
    pub matches: Vec<GameMatch>,
}

impl Round {
    /// Every player on any court this round.
    pub fn participants(&self) -> impl Iterator<Item = &PlayerName> {
        self.matches.iter().flat_map(|m| m.lineup.players())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lineup() -> Lineup {
        Lineup::from_four(["A", "B", "C", "D"].map(String::from))
    }

    #[test]
    fn from_four_splits_positions_into_teams() {
        let l = lineup();
        assert_eq!(l.team(Team::One), &["A".to_string(), "B".to_string()]);
        assert_eq!(l.team(Team::Two), &["C".to_string(), "D".to_string()]);
        assert!(l.contains("D"));
        assert!(!l.contains("E"));
    }

    #[test]
    fn score_winner() {
        assert_eq!(Score::new(21, 15).winner(), Some(Team::One));
        assert_eq!(Score::new(9, 11).winner(), Some(Team::Two));
        assert_eq!(Score::new(15, 15).winner(), None);
    }
}
