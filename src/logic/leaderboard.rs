//! Leaderboard: standings from scored matches, plus CSV export.

use crate::models::{PlayerName, Round, SessionError, SessionState, Standing, Team};
use std::collections::HashMap;

/// Rank every player who appears in at least one scored match.
///
/// Matches without a score are ignored. Ties on wins go to the better point
/// differential; remaining ties keep roster order (players missing from `roster`
/// follow in order of first appearance). Fails with `NoResults` when nothing is scored.
pub fn compute_standings(
    roster: &[PlayerName],
    rounds: &[Round],
) -> Result<Vec<Standing>, SessionError> {
    let mut table: Vec<Standing> = roster.iter().map(|p| Standing::new(p.clone())).collect();
    let mut index: HashMap<PlayerName, usize> = roster
        .iter()
        .enumerate()
        .map(|(i, p)| (p.clone(), i))
        .collect();

    let mut scored = 0;
    for m in rounds.iter().flat_map(|r| r.matches.iter()) {
        let Some(score) = m.score else {
            continue;
        };
        scored += 1;
        let winner = score.winner();
        for (team, own, opposing) in [
            (Team::One, score.team_1, score.team_2),
            (Team::Two, score.team_2, score.team_1),
        ] {
            for player in m.lineup.team(team) {
                let i = *index.entry(player.clone()).or_insert_with(|| {
                    table.push(Standing::new(player.clone()));
                    table.len() - 1
                });
                let row = &mut table[i];
                row.record_game(own, opposing);
                match winner {
                    Some(w) if w == team => row.add_win(),
                    Some(_) => row.add_loss(),
                    None => {}
                }
            }
        }
    }

    if scored == 0 {
        return Err(SessionError::NoResults);
    }

    table.retain(|s| s.games_played > 0);
    table.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| b.point_diff.cmp(&a.point_diff))
    });
    for (i, s) in table.iter_mut().enumerate() {
        s.rank = i + 1;
    }
    Ok(table)
}

/// Final standings for a session.
pub fn finalize_session(state: &SessionState) -> Result<Vec<Standing>, SessionError> {
    let standings = compute_standings(&state.roster, &state.rounds)?;
    log::info!(
        "session {}: finalized standings for {} player(s)",
        state.id,
        standings.len()
    );
    Ok(standings)
}

/// Standings as CSV with a header row.
pub fn standings_to_csv(standings: &[Standing]) -> Result<String, SessionError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for s in standings {
        writer
            .serialize(s)
            .map_err(|e| SessionError::Export(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| SessionError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SessionError::Export(e.to_string()))
}
