//! Data structures for a doubles session: players, matches, rounds, session state.

mod game;
mod player;
mod session;

pub use game::{GameMatch, Lineup, MatchId, Round, Score, Team};
pub use player::{PairKey, PlayerName, Standing};
pub use session::{
    PlayStats, SessionConfig, SessionError, SessionId, SessionState, MAX_DURATION_MINUTES,
    ROUND_MINUTES,
};
