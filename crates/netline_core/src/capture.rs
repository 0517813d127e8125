//! Firewall capture by occupation.

use crate::channel::Notification;
use crate::character::StatusEffect;
use crate::grid::Coord;
use crate::network::release_from;
use crate::session::{PlayerId, Session};
use crate::team::{TeamColor, VirusColor};

/// Firewall `player` could capture from where they stand, if any.
///
/// Requires a spawned player on a firewall that is not a spawner, is not
/// owned by the player's team, and has not been locked against it.
#[must_use]
pub fn capture_target(session: &Session, player: &PlayerId) -> Option<Coord> {
    let current = session.player(player).filter(|p| p.is_spawned())?;
    let position = current.position?;
    let tile = session.grid.get(position)?;
    let open = tile.is_firewall
        && !tile.is_spawner
        && tile.team != current.team
        && tile.is_capturable_by(current.team);
    open.then_some(position)
}

/// Advance capture progress on the firewall `player` stands on.
///
/// Anything other than a [`capture_target`] is a silent no-op.
///
/// Progress flips ownership once it reaches the tile's threshold and then
/// resets to zero: an enemy firewall goes neutral, a neutral one goes to the
/// player's team. A flipped firewall leaves whatever line ran through it,
/// and that line is cut there. Every capture ability the player has goes
/// back on full cooldown.
pub fn apply_capture(session: &mut Session, player: &PlayerId) -> Vec<Notification> {
    let Some(position) = capture_target(session, player) else {
        return Vec::new();
    };
    let Some(team) = session.player(player).map(|p| p.team) else {
        return Vec::new();
    };
    let Some(tile) = session.grid.get_mut(position) else {
        return Vec::new();
    };

    tile.capture_ticks += 1;
    let flipped = tile.capture_ticks >= tile.max_capture_ticks;
    if flipped {
        let previous = tile.team;
        tile.team = if previous.is_neutral() {
            team
        } else {
            TeamColor::Neutral
        };
        tile.capture_ticks = 0;
        tracing::info!(
            player = %player,
            x = position.x,
            y = position.y,
            from = previous.display_name(),
            to = tile.team.display_name(),
            "Firewall flipped"
        );
    } else {
        tracing::debug!(
            player = %player,
            x = position.x,
            y = position.y,
            progress = tile.capture_ticks,
            threshold = tile.max_capture_ticks,
            "Capture progress"
        );
    }

    if flipped {
        if let Some(index) = session.path_containing(position) {
            release_from(session, index, position);
            if let Some(tile) = session.grid.get_mut(position) {
                tile.virus = VirusColor::None;
            }
        }
    }

    if let Some(character) = session.player_mut(player).and_then(|p| p.character.as_mut()) {
        for ability in &mut character.abilities {
            if ability.effect == StatusEffect::Capture {
                ability.cdr = ability.max_cdr;
            }
        }
    }

    vec![Notification::SessionUpdated]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::technician;
    use crate::network::{extend_frontier, FrontierOutcome};
    use crate::scenario::ScenarioTemplate;
    use crate::session::Player;

    fn session(rows: &[&str]) -> Session {
        let mut s = ScenarioTemplate::from_ascii("capture", rows)
            .unwrap()
            .start_match(
                "s",
                vec![
                    Player::new("alice", "Alice", TeamColor::Amber),
                    Player::new("bob", "Bob", TeamColor::Teal),
                ],
                true,
            )
            .unwrap();
        for p in &mut s.players {
            p.character = Some(technician());
        }
        s
    }

    fn stand(s: &mut Session, id: &str, x: i32) {
        s.relocate(&id.into(), Some(Coord::new(x, 0)));
    }

    #[test]
    fn test_two_calls_claim_neutral_firewall() {
        let mut s = session(&["H-F-h"]);
        stand(&mut s, "alice", 2);

        apply_capture(&mut s, &"alice".into());
        let tile = s.grid.tile(Coord::new(2, 0)).unwrap();
        assert_eq!(tile.capture_ticks, 1);
        assert_eq!(tile.team, TeamColor::Neutral);

        apply_capture(&mut s, &"alice".into());
        let tile = s.grid.tile(Coord::new(2, 0)).unwrap();
        assert_eq!(tile.capture_ticks, 0);
        assert_eq!(tile.team, TeamColor::Amber);
    }

    #[test]
    fn test_enemy_firewall_two_calls_turn_neutral() {
        let mut s = session(&["H-x-h"]);
        stand(&mut s, "alice", 2);
        assert_eq!(s.grid.tile(Coord::new(2, 0)).unwrap().max_capture_ticks, 2);

        apply_capture(&mut s, &"alice".into());
        apply_capture(&mut s, &"alice".into());

        let tile = s.grid.tile(Coord::new(2, 0)).unwrap();
        assert_eq!(tile.team, TeamColor::Neutral);
        assert_eq!(tile.capture_ticks, 0);
    }

    #[test]
    fn test_captured_firewall_leaves_enemy_line() {
        let mut s = session(&["HXh"]);
        assert_eq!(extend_frontier(&mut s, 0), FrontierOutcome::LinkedFirewall(Coord::new(1, 0)));
        stand(&mut s, "bob", 1);

        // Out of Amber's line as soon as Amber loses it
        apply_capture(&mut s, &"bob".into());
        apply_capture(&mut s, &"bob".into());
        assert_eq!(s.paths[0].nodes, vec![Coord::new(0, 0)]);
        let wall = s.grid.tile(Coord::new(1, 0)).unwrap();
        assert_eq!(wall.team, TeamColor::Neutral);
        assert_eq!(wall.virus, VirusColor::None);

        apply_capture(&mut s, &"bob".into());
        apply_capture(&mut s, &"bob".into());
        assert_eq!(s.grid.tile(Coord::new(1, 0)).unwrap().team, TeamColor::Teal);

        // Teal's line can now take its own firewall; Amber's hub is untouched
        assert_eq!(extend_frontier(&mut s, 1), FrontierOutcome::LinkedFirewall(Coord::new(1, 0)));
        assert_eq!(
            extend_frontier(&mut s, 0),
            FrontierOutcome::FlaggedFirewall(Coord::new(1, 0))
        );
        assert!(s.hub_damage.is_empty());
    }

    #[test]
    fn test_capture_target() {
        let mut s = session(&["H-F-h"]);
        stand(&mut s, "alice", 1);
        assert_eq!(capture_target(&s, &"alice".into()), None);
        stand(&mut s, "alice", 2);
        assert_eq!(capture_target(&s, &"alice".into()), Some(Coord::new(2, 0)));
    }

    #[test]
    fn test_enemy_firewall_goes_neutral_first() {
        let mut s = session(&["H-x-h"]);
        stand(&mut s, "alice", 2);

        apply_capture(&mut s, &"alice".into());
        let notes = apply_capture(&mut s, &"alice".into());
        assert_eq!(notes, vec![Notification::SessionUpdated]);
        assert_eq!(s.grid.tile(Coord::new(2, 0)).unwrap().team, TeamColor::Neutral);

        apply_capture(&mut s, &"alice".into());
        apply_capture(&mut s, &"alice".into());
        assert_eq!(s.grid.tile(Coord::new(2, 0)).unwrap().team, TeamColor::Amber);
    }

    #[test]
    fn test_progress_never_exceeds_threshold() {
        let mut s = session(&["H-F-h"]);
        stand(&mut s, "alice", 2);
        for _ in 0..7 {
            apply_capture(&mut s, &"alice".into());
            let tile = s.grid.tile(Coord::new(2, 0)).unwrap();
            assert!(tile.capture_ticks <= tile.max_capture_ticks);
        }
    }

    #[test]
    fn test_preconditions_are_silent_noops() {
        // Not a firewall
        let mut s = session(&["H-F-h"]);
        stand(&mut s, "alice", 1);
        let before = s.clone();
        assert!(apply_capture(&mut s, &"alice".into()).is_empty());
        assert_eq!(s, before);

        // Own firewall
        let mut s = session(&["H-X-h"]);
        stand(&mut s, "alice", 2);
        assert!(apply_capture(&mut s, &"alice".into()).is_empty());

        // Unspawned
        let mut s = session(&["H-F-h"]);
        stand(&mut s, "alice", 2);
        s.player_mut(&"alice".into()).unwrap().character = None;
        assert!(apply_capture(&mut s, &"alice".into()).is_empty());

        // Unknown player
        assert!(apply_capture(&mut s, &"ghost".into()).is_empty());
    }

    #[test]
    fn test_locked_firewall_cannot_be_captured() {
        let mut s = session(&["H-x-h"]);
        stand(&mut s, "alice", 2);
        s.grid
            .tile_mut(Coord::new(2, 0))
            .unwrap()
            .capturable_by
            .insert(TeamColor::Amber, false);

        assert!(apply_capture(&mut s, &"alice".into()).is_empty());
        assert_eq!(s.grid.tile(Coord::new(2, 0)).unwrap().capture_ticks, 0);
    }

    #[test]
    fn test_capture_resets_capture_cooldowns_only() {
        let mut s = session(&["H-F-h"]);
        stand(&mut s, "alice", 2);
        apply_capture(&mut s, &"alice".into());

        let c = s.player(&"alice".into()).unwrap().character.as_ref().unwrap();
        assert_eq!(c.abilities[0].cdr, c.abilities[0].max_cdr);
        assert_eq!(c.abilities[1].cdr, 0);
    }
}
