//! Player intents that are not turn resolution.
//!
//! Each intent mutates the session in place and returns the notifications
//! to route. Abilities go through [`crate::combat::use_ability`] and
//! firewall capture through [`crate::capture::apply_capture`].

use crate::bot::spawn_pad;
use crate::channel::{LocalPatch, NetMessage, Notification, Outbound};
use crate::character::by_id;
use crate::error::{GameError, Result};
use crate::grid::Coord;
use crate::session::{MatchStatus, Player, PlayerId, Session};
use crate::team::VirusColor;

/// Announce a user. Joining a session goes out on the broadcast channel;
/// without a session id the user starts a single-player lobby.
#[must_use]
pub fn login(current_user: Player, session_id: Option<&str>) -> Vec<Outbound> {
    match session_id {
        Some(session_id) => vec![
            Outbound::Local(LocalPatch::SetUser {
                current_user: current_user.clone(),
            }),
            Outbound::Broadcast(NetMessage::PlayerAvailable {
                session_id: session_id.to_owned(),
                current_user,
            }),
        ],
        None => vec![Outbound::Local(LocalPatch::StartSinglePlayer { current_user })],
    }
}

/// Give `player` a fresh copy of roster character `character_id`.
///
/// An unspawned player is placed on their team's open spawn pad nearest the
/// team hub. Ignored while the player's respawn countdown is running.
///
/// # Errors
///
/// Returns `GameError::PlayerNotFound` for an unknown player,
/// `GameError::InvalidState` for an unknown character and
/// `GameError::InvariantViolation` when no spawn pad is free.
pub fn choose_character(
    session: &mut Session,
    player: &PlayerId,
    character_id: &str,
) -> Result<Vec<Notification>> {
    let current = session.require_player(player)?;
    if current.respawn_turns > 0 {
        tracing::debug!(player = %player, respawn_turns = current.respawn_turns, "Character choice blocked");
        return Ok(Vec::new());
    }
    let (team, position) = (current.team, current.position);
    let character = by_id(character_id)
        .ok_or_else(|| GameError::InvalidState(format!("unknown character '{character_id}'")))?;

    let spawn = match position {
        Some(_) => None,
        None => Some(spawn_pad(session, team).ok_or_else(|| {
            GameError::InvariantViolation(format!(
                "no open spawn pad for team {}",
                team.display_name()
            ))
        })?),
    };

    if let Some(p) = session.player_mut(player) {
        p.character = Some(character);
    }
    if let Some(pad) = spawn {
        session.relocate(player, Some(pad));
    }
    tracing::info!(player = %player, character = character_id, "Character chosen");
    Ok(vec![Notification::SessionUpdated])
}

/// Step `player` onto the adjacent cell `to`, spending one move.
///
/// Ignored unless the player is spawned, has a move left, and `to` is an
/// unobstructed neighbour.
pub fn move_player(session: &mut Session, player: &PlayerId, to: Coord) -> Vec<Notification> {
    let Some(current) = session.player(player) else {
        return Vec::new();
    };
    let can_move = current.is_spawned()
        && current.position.is_some_and(|from| from.is_adjacent(to))
        && current.character.as_ref().is_some_and(|c| c.move_points > 0);
    if !can_move || session.grid.is_obstructed(to) {
        return Vec::new();
    }

    session.relocate(player, Some(to));
    if let Some(character) = session.player_mut(player).and_then(|p| p.character.as_mut()) {
        character.move_points -= 1;
    }
    vec![Notification::PlayerReplaced(player.clone())]
}

/// Recolour the line under `player`. Ignored for unspawned players.
pub fn choose_virus(session: &mut Session, player: &PlayerId, color: VirusColor) -> Vec<Notification> {
    let Some(position) = session
        .player(player)
        .filter(|p| p.is_spawned())
        .and_then(|p| p.position)
    else {
        return Vec::new();
    };
    let Some(tile) = session.grid.get_mut(position) else {
        return Vec::new();
    };
    tile.virus = color;
    tracing::debug!(player = %player, x = position.x, y = position.y, color = ?color, "Virus chosen");
    vec![Notification::SessionUpdated]
}

/// Force the match to a win.
pub fn match_won(session: &mut Session) -> Vec<Notification> {
    session.status = MatchStatus::Win;
    tracing::info!(session = %session.session_id, "Match won");
    vec![Notification::SessionUpdated]
}

/// Tear down the local match state.
#[must_use]
pub fn cleanup() -> Outbound {
    Outbound::Local(LocalPatch::MatchCleanup)
}
