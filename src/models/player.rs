//! Player names, partnership keys, and the leaderboard row.

use serde::{Deserialize, Serialize};

/// Players are identified by their trimmed display name (case-sensitive, unique per session).
pub type PlayerName = String;

/// Unordered pair of players who formed a team. `first <= second` always holds.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct PairKey {
    first: PlayerName,
    second: PlayerName,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    pub fn players(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }
}

/// One leaderboard row.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based position in the sorted standings.
    pub rank: usize,
    pub player: PlayerName,
    pub wins: u32,
    pub losses: u32,
    /// Sum over scored matches of (own team score - opposing team score).
    pub point_diff: i64,
    /// Scored matches only; unscored draws do not count here.
    pub games_played: u32,
}

impl Standing {
    pub fn new(player: impl Into<PlayerName>) -> Self {
        Self {
            player: player.into(),
            ..Self::default()
        }
    }

    pub fn add_win(&mut self) {
        self.wins += 1;
    }

    pub fn add_loss(&mut self) {
        self.losses += 1;
    }

    /// Record one scored match from this player's side.
    pub fn record_game(&mut self, own: u32, opposing: u32) {
        self.games_played += 1;
        self.point_diff += i64::from(own) - i64::from(opposing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_is_unordered() {
        assert_eq!(PairKey::new("Ann", "Bob"), PairKey::new("Bob", "Ann"));
        assert_eq!(PairKey::new("Bob", "Ann").players(), ("Ann", "Bob"));
    }

    #[test]
    fn pair_key_is_case_sensitive() {
        assert_ne!(PairKey::new("ann", "Bob"), PairKey::new("Ann", "Bob"));
    }
}
