//! Test fixtures and helpers.
//!
//! Pre-built sessions and players for consistent testing. Fixtures panic on
//! bad input; they are only for test setup.

use netline_core::character::{by_id, Character};
use netline_core::grid::Coord;
use netline_core::scenario::ScenarioTemplate;
use netline_core::session::{Player, PlayerId, Session};
use netline_core::team::TeamColor;

/// Session id used by every fixture.
pub const FIXTURE_SESSION_ID: &str = "fixture";

/// Human player on Amber.
#[must_use]
pub fn amber(id: &str) -> Player {
    Player::new(id, id, TeamColor::Amber)
}

/// Human player on Teal.
#[must_use]
pub fn teal(id: &str) -> Player {
    Player::new(id, id, TeamColor::Teal)
}

/// Start a single-player session on an ASCII map.
///
/// # Panics
///
/// Panics if the map or the player list is invalid.
#[must_use]
pub fn ascii_session(rows: &[&str], players: Vec<Player>) -> Session {
    ScenarioTemplate::from_ascii("fixture", rows)
        .and_then(|t| t.start_match(FIXTURE_SESSION_ID, players, true))
        .unwrap_or_else(|e| panic!("bad fixture map: {e}"))
}

/// The proving ground with a human on Amber against a bot on Teal.
///
/// # Panics
///
/// Panics if the built-in scenario fails to start.
#[must_use]
pub fn human_vs_bot() -> Session {
    ScenarioTemplate::test_ground()
        .start_match(
            FIXTURE_SESSION_ID,
            vec![amber("human"), Player::bot("bot", TeamColor::Teal)],
            true,
        )
        .unwrap_or_else(|e| panic!("test ground failed to start: {e}"))
}

/// The proving ground with bots on both sides.
///
/// # Panics
///
/// Panics if the built-in scenario fails to start.
#[must_use]
pub fn bot_vs_bot() -> Session {
    ScenarioTemplate::test_ground()
        .start_match(
            FIXTURE_SESSION_ID,
            vec![
                Player::bot("amber-bot", TeamColor::Amber),
                Player::bot("teal-bot", TeamColor::Teal),
            ],
            false,
        )
        .unwrap_or_else(|e| panic!("test ground failed to start: {e}"))
}

/// Roster character by id.
///
/// # Panics
///
/// Panics for an unknown id.
#[must_use]
pub fn character(id: &str) -> Character {
    by_id(id).unwrap_or_else(|| panic!("no character '{id}' in roster"))
}

/// Give `player` a roster character and put it at `at`.
///
/// # Panics
///
/// Panics if the player or character does not exist.
pub fn spawn_at(session: &mut Session, player: &str, character_id: &str, at: Coord) {
    let id = PlayerId::from(player);
    let p = session
        .player_mut(&id)
        .unwrap_or_else(|| panic!("no player '{player}' in fixture"));
    p.character = Some(character(character_id));
    session.relocate(&id, Some(at));
}

/// Number of tiles each player id occupies.
#[must_use]
pub fn occupancy(session: &Session, player: &PlayerId) -> usize {
    session
        .grid
        .tiles()
        .filter(|t| t.occupant.as_ref() == Some(player))
        .count()
}
