//! Round scheduling: drawing rounds, recalibrating or editing one match, and score entry.
//!
//! Every operation validates and draws before touching the session, so a failure leaves
//! matches and statistics exactly as they were.

use crate::logic::pairing::{draw_round, PairingOptions};
use crate::models::{
    GameMatch, Lineup, MatchId, PlayerName, Round, Score, SessionError, SessionState,
};
use rand::Rng;
use std::collections::HashSet;

/// Draw the next round across all courts and record it.
pub fn draw_next_round<'a, R: Rng>(
    state: &'a mut SessionState,
    rng: &mut R,
) -> Result<&'a Round, SessionError> {
    if state.is_fully_drawn() {
        return Err(SessionError::AllRoundsDrawn);
    }
    let lineups = draw_round(
        &state.roster,
        state.config.court_count,
        &state.stats,
        PairingOptions::from(&state.config),
        rng,
    )?;

    let index = state.rounds.len();
    let matches: Vec<GameMatch> = lineups
        .into_iter()
        .enumerate()
        .map(|(court, lineup)| GameMatch::drawn(index, court, lineup, &mut *rng))
        .collect();
    for m in &matches {
        state.stats.apply(&m.lineup);
    }
    let round = Round {
        index,
        starts_at: state.round_start(index),
        matches,
    };
    state.stats.last_round_participants = round.participants().cloned().collect();
    log::info!("session {}: drew round {}", state.id, index + 1);
    state.rounds.push(round);
    Ok(&state.rounds[index])
}

/// Draw rounds until the session duration is filled. Returns how many were drawn.
pub fn draw_all_rounds<R: Rng>(state: &mut SessionState, rng: &mut R) -> Result<usize, SessionError> {
    let mut drawn = 0;
    while !state.is_fully_drawn() {
        draw_next_round(state, rng)?;
        drawn += 1;
    }
    Ok(drawn)
}

/// Replace one match with a fresh single-court draw against current load.
///
/// The old lineup's counts are taken back before drawing. Players on other courts of the
/// same round are not eligible, and back-to-back avoidance looks at the round before this
/// one. Any score on the old match is cleared.
pub fn recalibrate_match<'a, R: Rng>(
    state: &'a mut SessionState,
    match_id: MatchId,
    rng: &mut R,
) -> Result<&'a GameMatch, SessionError> {
    let (ri, mi) = state.locate_match(match_id)?;
    let round = &state.rounds[ri];
    let busy = players_on_other_courts(round, mi);
    let available: Vec<PlayerName> = state
        .roster
        .iter()
        .filter(|p| !busy.contains(p.as_str()))
        .cloned()
        .collect();

    let mut stats = state.stats.clone();
    stats.remove(&round.matches[mi].lineup);
    stats.last_round_participants = match ri.checked_sub(1) {
        Some(prev) => state.rounds[prev].participants().cloned().collect(),
        None => HashSet::new(),
    };
    let options = PairingOptions::from(&state.config);
    // One court in, exactly one lineup out.
    if let Some(lineup) = draw_round(&available, 1, &stats, options, rng)?
        .into_iter()
        .next()
    {
        log::info!(
            "session {}: recalibrated round {} court {}",
            state.id,
            ri + 1,
            mi + 1
        );
        replace_lineup(state, ri, mi, lineup, false);
    }
    Ok(&state.rounds[ri].matches[mi])
}

/// Overwrite one match with a caller-chosen lineup: positions 0,1 vs 2,3.
///
/// Rejected without any change unless the four names are distinct roster players who are
/// not already on another court this round. An entered score is kept.
pub fn edit_match(
    state: &mut SessionState,
    match_id: MatchId,
    players: Vec<PlayerName>,
) -> Result<&GameMatch, SessionError> {
    let (ri, mi) = state.locate_match(match_id)?;
    if players.len() != 4 {
        return Err(SessionError::WrongLineupSize(players.len()));
    }
    let busy = players_on_other_courts(&state.rounds[ri], mi);
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(4);
    for name in &players {
        let name = name.trim();
        if !state.in_roster(name) {
            return Err(SessionError::UnknownPlayer(name.to_string()));
        }
        if !seen.insert(name) {
            return Err(SessionError::PlayerRepeated(name.to_string()));
        }
        if busy.contains(name) {
            return Err(SessionError::PlayerAlreadyOnCourt(name.to_string()));
        }
        cleaned.push(name.to_string());
    }
    let four: [PlayerName; 4] = cleaned
        .try_into()
        .map_err(|v: Vec<PlayerName>| SessionError::WrongLineupSize(v.len()))?;

    log::info!(
        "session {}: edited round {} court {}",
        state.id,
        ri + 1,
        mi + 1
    );
    replace_lineup(state, ri, mi, Lineup::from_four(four), true);
    Ok(&state.rounds[ri].matches[mi])
}

/// Enter or clear (None) the final score of a match.
pub fn set_match_score(
    state: &mut SessionState,
    match_id: MatchId,
    score: Option<Score>,
) -> Result<(), SessionError> {
    let (ri, mi) = state.locate_match(match_id)?;
    state.rounds[ri].matches[mi].score = score;
    Ok(())
}

/// Mark a match as not yet played.
pub fn clear_match_score(state: &mut SessionState, match_id: MatchId) -> Result<(), SessionError> {
    set_match_score(state, match_id, None)
}

fn players_on_other_courts(round: &Round, match_index: usize) -> HashSet<&str> {
    round
        .matches
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != match_index)
        .flat_map(|(_, m)| m.lineup.players())
        .map(String::as_str)
        .collect()
}

/// Swap a lineup in, moving its counts with it.
fn replace_lineup(
    state: &mut SessionState,
    round_index: usize,
    match_index: usize,
    lineup: Lineup,
    keep_score: bool,
) {
    let m = &mut state.rounds[round_index].matches[match_index];
    state.stats.remove(&m.lineup);
    state.stats.apply(&lineup);
    m.lineup = lineup;
    if !keep_score {
        m.score = None;
    }
    if round_index + 1 == state.rounds.len() {
        state.stats.last_round_participants = state.rounds[round_index]
            .participants()
            .cloned()
            .collect();
    }
}
