//! Integration tests for the leaderboard: aggregation, ordering, and export.

use chrono::Utc;
use doubles_round_robin::{
    compute_standings, finalize_session, set_match_score, standings_to_csv, start_session,
    GameMatch, Lineup, PlayerName, Round, Score, SessionConfig, SessionError, Standing,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn names(list: &[&str]) -> Vec<PlayerName> {
    list.iter().map(|s| s.to_string()).collect()
}

fn scored(index: usize, players: [&str; 4], score: Option<(u32, u32)>) -> Round {
    let mut m = GameMatch::new(index, 0, Lineup::from_four(players.map(String::from)));
    m.score = score.map(|(a, b)| Score::new(a, b));
    Round {
        index,
        starts_at: Utc::now(),
        matches: vec![m],
    }
}

fn row(rank: usize, player: &str, wins: u32, losses: u32, point_diff: i64, gp: u32) -> Standing {
    Standing {
        rank,
        player: player.to_string(),
        wins,
        losses,
        point_diff,
        games_played: gp,
    }
}

#[test]
fn single_match_standings() {
    let roster = names(&["A", "B", "C", "D"]);
    let rounds = vec![scored(0, ["A", "B", "C", "D"], Some((21, 15)))];
    let standings = compute_standings(&roster, &rounds).unwrap();
    assert_eq!(
        standings,
        vec![
            row(1, "A", 1, 0, 6, 1),
            row(2, "B", 1, 0, 6, 1),
            row(3, "C", 0, 1, -6, 1),
            row(4, "D", 0, 1, -6, 1),
        ]
    );
}

#[test]
fn team_two_win_is_credited_to_team_two() {
    let roster = names(&["A", "B", "C", "D"]);
    let rounds = vec![scored(0, ["A", "B", "C", "D"], Some((8, 11)))];
    let standings = compute_standings(&roster, &rounds).unwrap();
    assert_eq!(standings[0], row(1, "C", 1, 0, 3, 1));
    assert_eq!(standings[3], row(4, "B", 0, 1, -3, 1));
}

#[test]
fn tie_counts_games_but_no_result() {
    let roster = names(&["A", "B", "C", "D"]);
    let rounds = vec![scored(0, ["A", "B", "C", "D"], Some((15, 15)))];
    let standings = compute_standings(&roster, &rounds).unwrap();
    assert_eq!(standings.len(), 4);
    for s in &standings {
        assert_eq!((s.wins, s.losses, s.point_diff, s.games_played), (0, 0, 0, 1));
    }
}

#[test]
fn no_scores_is_an_error_not_an_empty_table() {
    let roster = names(&["A", "B", "C", "D", "E"]);
    let rounds = vec![
        scored(0, ["A", "B", "C", "D"], None),
        scored(1, ["E", "A", "B", "C"], None),
    ];
    assert_eq!(
        compute_standings(&roster, &rounds),
        Err(SessionError::NoResults)
    );
    assert_eq!(compute_standings(&roster, &[]), Err(SessionError::NoResults));
}

#[test]
fn unscored_matches_and_idle_players_are_left_out() {
    let roster = names(&["A", "B", "C", "D", "E", "F"]);
    let rounds = vec![
        scored(0, ["A", "B", "C", "D"], Some((11, 4))),
        scored(1, ["E", "F", "A", "B"], None),
    ];
    let standings = compute_standings(&roster, &rounds).unwrap();
    let players: Vec<&str> = standings.iter().map(|s| s.player.as_str()).collect();
    assert_eq!(players, vec!["A", "B", "C", "D"]);
    assert!(standings.iter().all(|s| s.games_played == 1));
}

#[test]
fn wins_then_point_diff_then_roster_order() {
    let roster = names(&["A", "B", "C", "D", "E"]);
    let rounds = vec![
        scored(0, ["A", "B", "C", "D"], Some((21, 19))),
        scored(1, ["E", "C", "A", "D"], Some((21, 10))),
        scored(2, ["B", "D", "E", "C"], Some((5, 21))),
    ];
    // A: W(+2) L(-11)        -> 1-1, -9
    // B: W(+2) L(-16)        -> 1-1, -14
    // C: L(-2) W(+11) W(+16) -> 2-1, +25
    // D: L(-2) L(-11) L(-16) -> 0-3, -29
    // E: W(+11) W(+16)       -> 2-0, +27
    let standings = compute_standings(&roster, &rounds).unwrap();
    assert_eq!(
        standings,
        vec![
            row(1, "E", 2, 0, 27, 2),
            row(2, "C", 2, 1, 25, 3),
            row(3, "A", 1, 1, -9, 2),
            row(4, "B", 1, 1, -14, 2),
            row(5, "D", 0, 3, -29, 3),
        ]
    );
}

#[test]
fn finalize_session_uses_entered_scores() {
    let mut rng = StdRng::seed_from_u64(21);
    let roster = names(&["A", "B", "C", "D", "E", "F", "G", "H"]);
    let mut state = start_session(roster, SessionConfig::default(), &mut rng).unwrap();
    assert_eq!(finalize_session(&state), Err(SessionError::NoResults));

    let m = state.rounds[0].matches[0].clone();
    set_match_score(&mut state, m.id, Some(Score::new(11, 9))).unwrap();
    let standings = finalize_session(&state).unwrap();
    assert_eq!(standings.len(), 4);
    let winners: Vec<&str> = standings[..2].iter().map(|s| s.player.as_str()).collect();
    for p in &m.lineup.team_1 {
        assert!(winners.contains(&p.as_str()));
    }
}

#[test]
fn standings_export_as_csv() {
    let roster = names(&["A", "B", "C", "D"]);
    let rounds = vec![scored(0, ["A", "B", "C", "D"], Some((21, 15)))];
    let standings = compute_standings(&roster, &rounds).unwrap();
    let csv = standings_to_csv(&standings).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "rank,player,wins,losses,point_diff,games_played");
    assert_eq!(lines[1], "1,A,1,0,6,1");
    assert_eq!(lines[4], "4,D,0,1,-6,1");
}
