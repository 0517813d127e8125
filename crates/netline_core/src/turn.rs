//! Turn controller.
//!
//! Ticks accumulate within a turn. When the counter reaches the turn's tick
//! limit the turn ends: the bot acts (if it is the bot's turn), every
//! network line advances, per-turn counters refresh, and play passes to the
//! next player.

use crate::bot::run_bot_turn;
use crate::channel::Notification;
use crate::error::{GameError, Result};
use crate::network::propagate;
use crate::pathfinding::Pathfinder;
use crate::session::Session;

/// Count one tick, ending the turn once the limit is reached.
///
/// Emits a lightweight [`Notification::Tick`] mid-turn and a full update
/// when the turn ends. A finished match ignores ticks.
///
/// # Errors
///
/// Propagates any error from [`end_turn`]; the session is left untouched in
/// that case.
pub fn advance_tick(session: &mut Session, pathfinder: &dyn Pathfinder) -> Result<Vec<Notification>> {
    if session.status.is_finished() {
        return Ok(Vec::new());
    }
    if session.ticks + 1 >= session.turn_tick_limit {
        return end_turn(session, pathfinder);
    }
    session.ticks += 1;
    Ok(vec![Notification::Tick])
}

/// Resolve the end of the current turn.
///
/// Runs on a working copy that replaces `session` only once every step has
/// succeeded.
///
/// # Errors
///
/// Returns `GameError::PlayerNotFound` if the active player is not in the
/// session, or whatever the bot controller fails with.
pub fn end_turn(session: &mut Session, pathfinder: &dyn Pathfinder) -> Result<Vec<Notification>> {
    if session.status.is_finished() {
        return Ok(Vec::new());
    }

    let mut next = session.clone();
    let active = next.active_player_id.clone();

    if next.require_player(&active)?.is_bot() {
        let (action, _) = run_bot_turn(&mut next, &active, pathfinder)?;
        tracing::debug!(bot = %active, action = ?action, "Bot turn resolved");
    }

    propagate(&mut next);

    for player in &mut next.players {
        match player.character.as_mut() {
            Some(character) => {
                if player.id == active {
                    character.restore_moves();
                }
                character.tick_cooldowns();
            }
            None => player.respawn_turns = player.respawn_turns.saturating_sub(1),
        }
    }

    let index = next
        .players
        .iter()
        .position(|p| p.id == active)
        .ok_or_else(|| GameError::PlayerNotFound(active.to_string()))?;
    next.active_player_id = next.players[(index + 1) % next.players.len()].id.clone();
    next.ticks = 0;
    next.turn += 1;

    tracing::info!(
        session = %next.session_id,
        turn = next.turn,
        active = %next.active_player_id,
        status = ?next.status,
        "Turn ended"
    );

    *session = next;
    Ok(vec![Notification::SessionUpdated])
}
