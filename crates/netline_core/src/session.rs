//! Session, player and path model.
//!
//! The [`Session`] is the sole unit of mutation and broadcast. It owns the
//! tile arena, the paths (as coordinate lists into that arena) and the
//! players.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::character::{Character, DEFAULT_BOT_CHARACTER};
use crate::error::{GameError, Result};
use crate::grid::{Coord, Grid};
use crate::team::TeamColor;

/// Ticks in a turn unless the scenario says otherwise.
pub const DEFAULT_TURN_TICK_LIMIT: u32 = 5;

/// Hub damage a team can absorb; the match ends once it is exceeded.
pub const HUB_DAMAGE_LIMIT: u32 = 10;

/// Turns a defeated player waits before picking a character again.
pub const MAX_RESPAWN_TURNS: u32 = 3;

/// Capture threshold for ordinary firewalls.
pub const FIREWALL_CAPTURE_TICKS: u32 = 2;

/// Capture threshold for hub tiles.
pub const HUB_CAPTURE_TICKS: u32 = 10;

/// Colour copies a path may make along its interior in one turn.
pub const COLOR_ADVANCE_PER_TURN: u32 = 3;

/// Sight radius left after a blind.
pub const BLIND_SIGHT: u32 = 2;

// ============================================================================
// Identifiers and configuration
// ============================================================================

/// Unique identifier for players.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tunable match constants.
///
/// Defaults match the standard ruleset; scenarios may override any field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    /// Ticks per turn.
    pub turn_tick_limit: u32,
    /// Hub damage beyond which the match ends.
    pub hub_damage_limit: u32,
    /// Respawn wait after a defeat.
    pub max_respawn_turns: u32,
    /// Firewall capture threshold.
    pub firewall_capture_ticks: u32,
    /// Hub capture threshold.
    pub hub_capture_ticks: u32,
    /// Interior colour copies per path per turn.
    pub color_advance_per_turn: u32,
    /// Sight left after a blind.
    pub blind_sight: u32,
    /// Roster id the bot spawns with.
    pub bot_character: String,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            turn_tick_limit: DEFAULT_TURN_TICK_LIMIT,
            hub_damage_limit: HUB_DAMAGE_LIMIT,
            max_respawn_turns: MAX_RESPAWN_TURNS,
            firewall_capture_ticks: FIREWALL_CAPTURE_TICKS,
            hub_capture_ticks: HUB_CAPTURE_TICKS,
            color_advance_per_turn: COLOR_ADVANCE_PER_TURN,
            blind_sight: BLIND_SIGHT,
            bot_character: DEFAULT_BOT_CHARACTER.to_owned(),
        }
    }
}

// ============================================================================
// Players and paths
// ============================================================================

/// Who drives a player's turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Controller {
    /// Intents arrive from a person.
    #[default]
    Human,
    /// The engine plays the turn itself.
    Bot,
}

/// A match participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Team.
    pub team: TeamColor,
    /// Who plays this seat.
    pub controller: Controller,
    /// Grid position; `None` until spawned.
    pub position: Option<Coord>,
    /// Planned cells still to walk, front first.
    pub route: Option<Vec<Coord>>,
    /// Turns until a character may be picked again.
    pub respawn_turns: u32,
    /// Active character; `None` while unspawned.
    pub character: Option<Character>,
}

impl Player {
    /// Create an unspawned human player.
    #[must_use]
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, team: TeamColor) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            team,
            controller: Controller::Human,
            position: None,
            route: None,
            respawn_turns: 0,
            character: None,
        }
    }

    /// Create an unspawned bot player.
    #[must_use]
    pub fn bot(id: impl Into<PlayerId>, team: TeamColor) -> Self {
        Self {
            controller: Controller::Bot,
            ..Self::new(id, "Bot", team)
        }
    }

    /// Returns true if the player has a character on the map.
    #[must_use]
    pub fn is_spawned(&self) -> bool {
        self.character.is_some() && self.position.is_some()
    }

    /// Returns true if the engine plays this seat.
    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.controller == Controller::Bot
    }
}

/// One network line, spawner first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Path {
    /// Coordinates of the tiles on the line.
    pub nodes: Vec<Coord>,
}

impl Path {
    /// Start a new line at a spawner.
    #[must_use]
    pub fn from_spawner(spawner: Coord) -> Self {
        Self {
            nodes: vec![spawner],
        }
    }

    /// The frontier node.
    #[must_use]
    pub fn end(&self) -> Option<Coord> {
        self.nodes.last().copied()
    }

    /// Returns true if the line runs through `coord`.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        self.nodes.contains(&coord)
    }
}

// ============================================================================
// Session
// ============================================================================

/// Lifecycle state of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Lobby; not yet started.
    #[default]
    Setup,
    /// In progress.
    Active,
    /// The active player's side won.
    Win,
    /// The active player's side lost.
    Lose,
}

impl MatchStatus {
    /// Returns true once the match has a result.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Win | Self::Lose)
    }
}

/// The authoritative state of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session id.
    pub session_id: String,
    /// Player who created the match.
    pub host_player_id: PlayerId,
    /// Player whose turn it is.
    pub active_player_id: PlayerId,
    /// Lifecycle state.
    pub status: MatchStatus,
    /// Players in turn order.
    pub players: Vec<Player>,
    /// Tile arena.
    pub grid: Grid,
    /// Network lines, in resolution order.
    pub paths: Vec<Path>,
    /// Ticks elapsed in the current turn.
    pub ticks: u32,
    /// Ticks per turn.
    pub turn_tick_limit: u32,
    /// Completed turns.
    pub turn: u32,
    /// Hub damage taken per team.
    pub hub_damage: BTreeMap<TeamColor, u32>,
    /// Route outbound state through the local channel only.
    pub is_single_player: bool,
    /// Tunable constants.
    pub rules: MatchRules,
}

impl Session {
    /// Get a player by id.
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Get a player by id mutably.
    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.id == id)
    }

    /// Get a player by id, failing if absent.
    ///
    /// # Errors
    ///
    /// Returns `GameError::PlayerNotFound`.
    pub fn require_player(&self, id: &PlayerId) -> Result<&Player> {
        self.player(id)
            .ok_or_else(|| GameError::PlayerNotFound(id.to_string()))
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn active_player(&self) -> Option<&Player> {
        self.player(&self.active_player_id)
    }

    /// Index of the path that runs through `coord`.
    #[must_use]
    pub fn path_containing(&self, coord: Coord) -> Option<usize> {
        self.paths.iter().position(|p| p.contains(coord))
    }

    /// Movement predicate shared by bots and the pathfinder: the tile exists,
    /// is walkable, and is empty or already held by `player`.
    #[must_use]
    pub fn is_passable_for(&self, player: &PlayerId, coord: Coord) -> bool {
        self.grid.get(coord).is_some_and(|t| {
            t.kind.is_walkable() && t.occupant.as_ref().map_or(true, |o| o == player)
        })
    }

    /// Move `player` to `to` (or off the map with `None`), keeping the
    /// player's position and tile occupancy in step.
    pub fn relocate(&mut self, player: &PlayerId, to: Option<Coord>) {
        self.grid.place_occupant(player, to);
        if let Some(p) = self.player_mut(player) {
            p.position = to;
        }
    }

    /// Hash the full session state for determinism checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be serialized.
    pub fn state_hash(&self) -> Result<u64> {
        let bytes = self.serialize()?;
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        Ok(hasher.finish())
    }

    /// Serialize session state to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::Serialization(format!("Failed to serialize session: {e}")))
    }

    /// Deserialize session state from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::Serialization(format!("Failed to deserialize session: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioTemplate;

    fn session() -> Session {
        let template = ScenarioTemplate::from_ascii("test", &["H--S", "..#s", "---h"]).unwrap();
        template
            .start_match(
                "s1",
                vec![
                    Player::new("alice", "Alice", TeamColor::Amber),
                    Player::bot("bot", TeamColor::Teal),
                ],
                true,
            )
            .unwrap()
    }

    #[test]
    fn test_player_lookup() {
        let s = session();
        assert_eq!(s.player(&"alice".into()).map(|p| p.team), Some(TeamColor::Amber));
        assert!(s.player(&"nobody".into()).is_none());
        assert!(matches!(
            s.require_player(&"nobody".into()),
            Err(GameError::PlayerNotFound(_))
        ));
        assert_eq!(s.active_player().map(|p| p.id.clone()), Some("alice".into()));
    }

    #[test]
    fn test_relocate_keeps_position_and_occupancy_in_step() {
        let mut s = session();
        let id = PlayerId::from("alice");
        s.relocate(&id, Some(Coord::new(1, 0)));
        assert_eq!(s.player(&id).unwrap().position, Some(Coord::new(1, 0)));
        assert_eq!(
            s.grid.tile(Coord::new(1, 0)).unwrap().occupant.as_ref(),
            Some(&id)
        );

        s.relocate(&id, None);
        assert_eq!(s.player(&id).unwrap().position, None);
        assert!(s.grid.tiles().all(|t| t.occupant.is_none()));
    }

    #[test]
    fn test_passable_for_self_but_not_others() {
        let mut s = session();
        let alice = PlayerId::from("alice");
        s.relocate(&alice, Some(Coord::new(1, 0)));
        assert!(s.is_passable_for(&alice, Coord::new(1, 0)));
        assert!(!s.is_passable_for(&"bot".into(), Coord::new(1, 0)));
        assert!(!s.is_passable_for(&alice, Coord::new(0, 1)));
    }

    #[test]
    fn test_serialize_roundtrip_and_hash() {
        let s = session();
        let bytes = s.serialize().unwrap();
        let restored = Session::deserialize(&bytes).unwrap();
        assert_eq!(restored, s);
        assert_eq!(restored.state_hash().unwrap(), s.state_hash().unwrap());
    }

    #[test]
    fn test_status_finished() {
        assert!(!MatchStatus::Active.is_finished());
        assert!(MatchStatus::Win.is_finished());
        assert!(MatchStatus::Lose.is_finished());
    }
}
