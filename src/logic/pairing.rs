//! Pairing engine: draws one round of court assignments from the current load.
//!
//! 1. Sort the roster by games played (ascending); ties get fresh random keys each call.
//! 2. If back-to-back avoidance is on and the roster holds at least 8 per court,
//!    drop last round's players, unless that leaves too few to fill the courts.
//! 3. Take 4 per court in pool order; positions 0,1 vs 2,3.
//! 4. If repeat-partner avoidance is on, reshuffle each group of 4 up to
//!    [`PARTNER_SEARCH_ATTEMPTS`] times looking for two fresh pairs; keep the
//!    original grouping if none turns up.
//!
//! Nothing here mutates session state; the scheduler applies the result.

use crate::models::{Lineup, PlayStats, PlayerName, SessionConfig, SessionError};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Bound on random team splits tried per court before giving up on fresh partners.
pub const PARTNER_SEARCH_ATTEMPTS: usize = 15;

/// Soft constraints for a draw.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PairingOptions {
    pub avoid_back_to_back: bool,
    pub avoid_repeat_partners: bool,
}

impl From<&SessionConfig> for PairingOptions {
    fn from(config: &SessionConfig) -> Self {
        Self {
            avoid_back_to_back: config.avoid_back_to_back,
            avoid_repeat_partners: config.avoid_repeat_partners,
        }
    }
}

/// Draw one lineup per court. Court `i` gets the `i`-th lineup.
///
/// Fails only when the roster cannot fill the courts; soft constraints never fail a draw.
pub fn draw_round<R: Rng>(
    roster: &[PlayerName],
    court_count: usize,
    stats: &PlayStats,
    options: PairingOptions,
    rng: &mut R,
) -> Result<Vec<Lineup>, SessionError> {
    if court_count == 0 {
        return Err(SessionError::InvalidCourtCount);
    }
    let needed = court_count * 4;
    if roster.len() < needed {
        return Err(SessionError::NotEnoughPlayers {
            required: needed,
            available: roster.len(),
        });
    }

    let mut pool = sort_by_load(roster, stats, rng);
    if options.avoid_back_to_back && roster.len() >= court_count * 8 {
        pool = skip_last_round(pool, &stats.last_round_participants, needed);
    }
    pool.truncate(needed);

    let mut lineups = Vec::with_capacity(court_count);
    for group in pool.chunks_exact(4) {
        let group = [
            group[0].clone(),
            group[1].clone(),
            group[2].clone(),
            group[3].clone(),
        ];
        let lineup = if options.avoid_repeat_partners {
            split_with_fresh_partners(group, stats, rng)
        } else {
            Lineup::from_four(group)
        };
        lineups.push(lineup);
    }
    Ok(lineups)
}

/// Least-played first. Equal counts are ordered by a random key drawn per call.
fn sort_by_load<R: Rng>(roster: &[PlayerName], stats: &PlayStats, rng: &mut R) -> Vec<PlayerName> {
    let mut with_tiebreak: Vec<(&PlayerName, u32, u64)> = roster
        .iter()
        .map(|p| (p, stats.games_played(p), rng.gen::<u64>()))
        .collect();
    with_tiebreak.sort_by_key(|&(_, played, t)| (played, t));
    with_tiebreak.into_iter().map(|(p, _, _)| p.clone()).collect()
}

/// Keep only players who sat out last round, if that still fills every court.
fn skip_last_round(
    pool: Vec<PlayerName>,
    last_round: &HashSet<PlayerName>,
    needed: usize,
) -> Vec<PlayerName> {
    let rested: Vec<PlayerName> = pool
        .iter()
        .filter(|p| !last_round.contains(*p))
        .cloned()
        .collect();
    if rested.len() >= needed {
        rested
    } else {
        log::debug!(
            "back-to-back filter left {} of {} needed players; drawing from full pool",
            rested.len(),
            needed
        );
        pool
    }
}

/// Try random splits of the group until neither team has partnered before.
fn split_with_fresh_partners<R: Rng>(
    group: [PlayerName; 4],
    stats: &PlayStats,
    rng: &mut R,
) -> Lineup {
    for _ in 0..PARTNER_SEARCH_ATTEMPTS {
        let mut candidate = group.clone();
        candidate.shuffle(rng);
        let lineup = Lineup::from_four(candidate);
        if lineup
            .pair_keys()
            .iter()
            .all(|key| stats.partnership_count(key) == 0)
        {
            return lineup;
        }
    }
    log::debug!(
        "no fresh partnership split for {:?} after {} attempts",
        group,
        PARTNER_SEARCH_ATTEMPTS
    );
    Lineup::from_four(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn names(list: &[&str]) -> Vec<PlayerName> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sort_by_load_puts_least_played_first() {
        let roster = names(&["A", "B", "C", "D", "E"]);
        let mut stats = PlayStats::new(&roster);
        stats.games_played.insert("A".into(), 3);
        stats.games_played.insert("B".into(), 1);
        stats.games_played.insert("D".into(), 2);
        let mut rng = StdRng::seed_from_u64(1);
        let sorted = sort_by_load(&roster, &stats, &mut rng);
        assert_eq!(&sorted[2..], &names(&["B", "D", "A"])[..]);
        let mut first_two = sorted[..2].to_vec();
        first_two.sort();
        assert_eq!(first_two, names(&["C", "E"]));
    }

    #[test]
    fn skip_last_round_falls_back_when_too_few_rested() {
        let pool = names(&["A", "B", "C", "D", "E", "F"]);
        let last: HashSet<PlayerName> = names(&["A", "B", "C"]).into_iter().collect();
        assert_eq!(skip_last_round(pool.clone(), &last, 4), pool);
        assert_eq!(skip_last_round(pool, &last, 3), names(&["D", "E", "F"]));
    }

    #[test]
    fn fresh_partner_split_keeps_original_when_every_pair_is_used() {
        let group = names(&["A", "B", "C", "D"]);
        let mut stats = PlayStats::new(&group);
        for (a, b) in [("A", "B"), ("C", "D"), ("A", "C"), ("B", "D"), ("A", "D"), ("B", "C")] {
            stats
                .partnership_counts
                .insert(crate::models::PairKey::new(a, b), 1);
        }
        let mut rng = StdRng::seed_from_u64(7);
        let group: [PlayerName; 4] = ["A", "B", "C", "D"].map(String::from);
        let lineup = split_with_fresh_partners(group.clone(), &stats, &mut rng);
        assert_eq!(lineup, Lineup::from_four(group));
    }
}
