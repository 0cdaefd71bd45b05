//! Setup: roster parsing and validation, session start and restart.

use crate::logic::schedule::draw_all_rounds;
use crate::models::{PlayerName, SessionConfig, SessionError, SessionState};
use rand::Rng;
use std::collections::HashSet;

/// Read a roster with one player per line. Each line is trimmed and blank lines are
/// skipped; the rest of the line is the name as written (commas and quotes included).
pub fn parse_roster(text: &str) -> Result<Vec<PlayerName>, SessionError> {
    let names = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    validate_roster(names)
}

/// Trim every name and reject blanks and duplicates (case-sensitive). Order is kept.
pub fn validate_roster(roster: Vec<PlayerName>) -> Result<Vec<PlayerName>, SessionError> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(roster.len());
    for name in roster {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyPlayerName);
        }
        if !seen.insert(name.to_string()) {
            return Err(SessionError::DuplicatePlayerName(name.to_string()));
        }
        cleaned.push(name.to_string());
    }
    Ok(cleaned)
}

/// Validate roster and settings and create a session with no rounds drawn.
///
/// Back-to-back avoidance is switched off when the roster has fewer than 8 players per court.
pub fn init_session(
    roster: Vec<PlayerName>,
    mut config: SessionConfig,
) -> Result<SessionState, SessionError> {
    config.validate()?;
    let roster = validate_roster(roster)?;
    let required = config.players_per_round();
    if roster.len() < required {
        return Err(SessionError::NotEnoughPlayers {
            required,
            available: roster.len(),
        });
    }
    if config.avoid_back_to_back && roster.len() < config.back_to_back_threshold() {
        log::info!(
            "back-to-back avoidance disabled: {} players, need {} for {} court(s)",
            roster.len(),
            config.back_to_back_threshold(),
            config.court_count
        );
        config.avoid_back_to_back = false;
    }
    let state = SessionState::new(roster, config);
    log::info!(
        "session {} started: {} players, {} court(s), {} round(s)",
        state.id,
        state.roster.len(),
        state.config.court_count,
        state.total_rounds()
    );
    Ok(state)
}

/// `init_session` followed by drawing every round the duration allows.
pub fn start_session<R: Rng>(
    roster: Vec<PlayerName>,
    config: SessionConfig,
    rng: &mut R,
) -> Result<SessionState, SessionError> {
    let mut state = init_session(roster, config)?;
    draw_all_rounds(&mut state, rng)?;
    Ok(state)
}

/// Restart: back to no rounds with the same roster and settings.
pub fn restart_session(state: &mut SessionState) {
    state.restart();
    log::info!("session {} restarted", state.id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roster_reads_one_name_per_line() {
        let roster = parse_roster("  Ann \r\n\nBob\n   \nCat\n").unwrap();
        assert_eq!(roster, vec!["Ann", "Bob", "Cat"]);
    }

    #[test]
    fn parse_roster_keeps_commas_in_names() {
        let roster = parse_roster("Lee, Ann\nLee, Bob\nSmith, John\nKim\n").unwrap();
        assert_eq!(roster, vec!["Lee, Ann", "Lee, Bob", "Smith, John", "Kim"]);
    }

    #[test]
    fn parse_roster_keeps_quotes_in_names() {
        let roster = parse_roster("\"Rocky\" Balboa\nO'Neil\n\"Lee, Jr\"\n").unwrap();
        assert_eq!(roster, vec!["\"Rocky\" Balboa", "O'Neil", "\"Lee, Jr\""]);
    }

    #[test]
    fn parse_roster_rejects_duplicates() {
        assert_eq!(
            parse_roster("Ann\nBob\nAnn\n"),
            Err(SessionError::DuplicatePlayerName("Ann".into()))
        );
    }

    #[test]
    fn validate_roster_is_case_sensitive() {
        let roster = validate_roster(vec!["ann".into(), "Ann".into()]).unwrap();
        assert_eq!(roster, vec!["ann", "Ann"]);
    }
}
