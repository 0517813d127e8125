//! Ability resolution: damage, armor, status effects and defeat.
//!
//! Damage is flat: `ability.damage - target.armor`, floored at zero, with
//! armor skipped entirely for [`StatusEffect::Pierce`]. A surviving target
//! receives exactly one status effect; a defeated target loses its
//! character and starts the respawn countdown instead.

use crate::capture::{apply_capture, capture_target};
use crate::channel::Notification;
use crate::character::{Ability, StatusEffect};
use crate::grid::Coord;
use crate::session::{PlayerId, Session};

/// Damage an ability deals through `armor`.
#[must_use]
pub fn calculate_damage(ability: &Ability, armor: i32) -> i32 {
    let raw = if ability.effect == StatusEffect::Pierce {
        ability.damage
    } else {
        ability.damage - armor
    };
    raw.max(0)
}

/// Cell a pull (`toward = true`) or push moves `target` to.
///
/// Targets sharing the attacker's row move along `x`; everyone else moves
/// along `y`.
#[must_use]
pub fn displacement(attacker: Coord, target: Coord, toward: bool) -> Coord {
    let step = |target_is_greater: bool| -> i32 {
        match (target_is_greater, toward) {
            (true, true) | (false, false) => -1,
            (true, false) | (false, true) => 1,
        }
    };
    if target.y == attacker.y {
        Coord::new(target.x + step(target.x > attacker.x), target.y)
    } else {
        Coord::new(target.x, target.y + step(target.y > attacker.y))
    }
}

/// Apply one use of `ability` by `attacker` on the tile at `target`.
///
/// An empty target tile (or an unspawned occupant) takes no damage, but the
/// attacker's state is still re-published.
pub fn apply_ability(
    session: &mut Session,
    attacker: &PlayerId,
    ability: &Ability,
    target: Coord,
) -> Vec<Notification> {
    let mut notifications = Vec::new();

    let target_id = session
        .grid
        .get(target)
        .and_then(|t| t.occupant.clone())
        .filter(|id| session.player(id).is_some_and(|p| p.character.is_some()));

    if let Some(target_id) = target_id {
        resolve_hit(session, attacker, ability, &target_id);
        notifications.push(Notification::PlayerReplaced(target_id));
    }

    notifications.push(Notification::PlayerReplaced(attacker.clone()));
    notifications
}

fn resolve_hit(session: &mut Session, attacker: &PlayerId, ability: &Ability, target_id: &PlayerId) {
    let max_respawn = session.rules.max_respawn_turns;
    let Some(target) = session.player_mut(target_id) else {
        return;
    };
    let Some(character) = target.character.as_mut() else {
        return;
    };

    let damage = calculate_damage(ability, character.armor);
    character.hp -= damage;
    tracing::debug!(
        attacker = %attacker,
        target = %target_id,
        ability = %ability.name,
        damage,
        hp = character.hp,
        "Ability hit"
    );

    if character.hp <= 0 {
        target.character = None;
        target.respawn_turns = max_respawn;
        target.route = None;
        session.relocate(target_id, None);
        tracing::info!(target = %target_id, respawn_turns = max_respawn, "Player defeated");
        return;
    }

    apply_status(session, attacker, ability.effect, target_id);
}

fn apply_status(
    session: &mut Session,
    attacker: &PlayerId,
    effect: StatusEffect,
    target_id: &PlayerId,
) {
    let blind_sight = session.rules.blind_sight;
    let attacker_pos = session.player(attacker).and_then(|p| p.position);
    let Some(target) = session.player_mut(target_id) else {
        return;
    };
    let target_pos = target.position;
    let Some(character) = target.character.as_mut() else {
        return;
    };

    let toward = match effect {
        StatusEffect::AbilityLock => {
            for ability in &mut character.abilities {
                ability.cdr = ability.max_cdr;
            }
            return;
        }
        StatusEffect::AbilityUnlock => {
            for ability in &mut character.abilities {
                ability.cdr = 0;
            }
            return;
        }
        StatusEffect::MovesMinusOne => {
            character.move_points = character.move_points.saturating_sub(1);
            return;
        }
        StatusEffect::Blind => {
            character.sight = character.sight.min(blind_sight);
            return;
        }
        StatusEffect::Pull => true,
        StatusEffect::Push => false,
        StatusEffect::Hp
        | StatusEffect::Hp5
        | StatusEffect::Cdr
        | StatusEffect::Cdr5
        | StatusEffect::None
        | StatusEffect::Pierce
        | StatusEffect::Capture
        | StatusEffect::EditStream => return,
    };

    let (Some(from), Some(to)) = (attacker_pos, target_pos) else {
        return;
    };
    let destination = displacement(from, to, toward);
    if session.grid.is_obstructed(destination) {
        tracing::debug!(target = %target_id, x = destination.x, y = destination.y, "Displacement blocked");
        return;
    }

    session.relocate(target_id, Some(destination));
    if let Some(target) = session.player_mut(target_id) {
        target.route = None;
    }
}

/// Validated ability intent.
///
/// A no-op unless the attacker is spawned, `ability_index` names one of
/// their abilities, that ability is off cooldown, and `target` lies within
/// its range. A capture ability also needs a firewall the attacker can
/// capture underfoot. On success the ability goes on cooldown and resolves:
/// capture abilities through the capture resolver, everything else through
/// [`apply_ability`].
pub fn use_ability(
    session: &mut Session,
    attacker: &PlayerId,
    ability_index: usize,
    target: Coord,
) -> Vec<Notification> {
    let Some(player) = session.player(attacker) else {
        return Vec::new();
    };
    let Some(position) = player.position else {
        return Vec::new();
    };
    let Some(ability) = player
        .character
        .as_ref()
        .and_then(|c| c.abilities.get(ability_index))
        .cloned()
    else {
        return Vec::new();
    };
    if !ability.is_ready() || position.manhattan(target) > ability.range {
        tracing::debug!(attacker = %attacker, ability = %ability.name, "Ability not usable");
        return Vec::new();
    }

    let is_capture = ability.effect == StatusEffect::Capture;
    if is_capture && capture_target(session, attacker).is_none() {
        tracing::debug!(attacker = %attacker, ability = %ability.name, "Nothing to capture here");
        return Vec::new();
    }

    if let Some(slot) = session
        .player_mut(attacker)
        .and_then(|p| p.character.as_mut())
        .and_then(|c| c.abilities.get_mut(ability_index))
    {
        slot.cdr = slot.max_cdr;
    }

    if is_capture {
        return apply_capture(session, attacker);
    }
    apply_ability(session, attacker, &ability, target)
}
