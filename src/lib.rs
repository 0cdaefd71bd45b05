//! Doubles round-robin scheduler: library with models and session logic.

pub mod logic;
pub mod models;

pub use logic::{
    clear_match_score, compute_standings, draw_all_rounds, draw_next_round, draw_round,
    edit_match, finalize_session, init_session, parse_roster, recalibrate_match,
    restart_session, set_match_score, standings_to_csv, start_session, validate_roster,
    PairingOptions, PARTNER_SEARCH_ATTEMPTS,
};
pub use models::{
    GameMatch, Lineup, MatchId, PairKey, PlayStats, PlayerName, Round, Score, SessionConfig,
    SessionError, SessionId, SessionState, Standing, Team, MAX_DURATION_MINUTES, ROUND_MINUTES,
};
