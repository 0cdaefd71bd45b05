//! Session business logic: setup, pairing, round scheduling, leaderboard.

mod leaderboard;
mod pairing;
mod schedule;
mod setup;

pub use leaderboard::{compute_standings, finalize_session, standings_to_csv};
pub use pairing::{draw_round, PairingOptions, PARTNER_SEARCH_ATTEMPTS};
pub use schedule::{
    clear_match_score, draw_all_rounds, draw_next_round, edit_match, recalibrate_match,
    set_match_score,
};
pub use setup::{init_session, parse_roster, restart_session, start_session, validate_roster};
