//! Bot controller.
//!
//! A bot takes exactly one action per turn, chosen in priority order:
//! spawn in, walk its planned route, capture the firewall underfoot, or plan
//! a route to the nearest firewall it does not own.

use crate::capture::{apply_capture, capture_target};
use crate::channel::Notification;
use crate::character::by_id;
use crate::error::{GameError, Result};
use crate::grid::Coord;
use crate::pathfinding::Pathfinder;
use crate::session::{PlayerId, Session};
use crate::team::TeamColor;

/// The action a bot settled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotAction {
    /// Still counting down to respawn.
    Waiting,
    /// Picked a character and spawned at a pad.
    Spawned(Coord),
    /// Walked part or all of its route.
    Moved {
        /// Cells entered this turn.
        steps: u32,
    },
    /// Route blocked with no way around.
    Held,
    /// Worked on the firewall underfoot.
    Captured,
    /// Stored a new route toward a firewall.
    Planned(Coord),
    /// Target exists but cannot be reached.
    Unreachable(Coord),
    /// No firewall left to go after.
    Idle,
}

/// Run one bot turn for `bot`.
///
/// # Errors
///
/// Returns `GameError::PlayerNotFound` for an unknown id and
/// `GameError::InvariantViolation` if the bot must spawn but its team has no
/// open spawn pad or the configured bot character does not exist.
pub fn run_bot_turn(
    session: &mut Session,
    bot: &PlayerId,
    pathfinder: &dyn Pathfinder,
) -> Result<(BotAction, Vec<Notification>)> {
    let player = session.require_player(bot)?;
    let team = player.team;

    let Some(position) = player.position.filter(|_| player.is_spawned()) else {
        if player.respawn_turns > 0 {
            tracing::debug!(bot = %bot, respawn_turns = player.respawn_turns, "Bot waiting to respawn");
            return Ok((BotAction::Waiting, Vec::new()));
        }
        let pad = spawn(session, bot, team)?;
        return Ok((BotAction::Spawned(pad), vec![Notification::PlayerReplaced(bot.clone())]));
    };

    if let Some(route) = player.route.clone().filter(|r| !r.is_empty()) {
        let action = follow_route(session, bot, position, route, pathfinder);
        return Ok((action, vec![Notification::PlayerReplaced(bot.clone())]));
    }

    if capture_target(session, bot).is_some() {
        let notifications = apply_capture(session, bot);
        return Ok((BotAction::Captured, notifications));
    }

    let Some(target) = nearest_target(session, team, position) else {
        tracing::debug!(bot = %bot, "No firewall left to target, skipping turn");
        return Ok((BotAction::Idle, Vec::new()));
    };
    let route = plan(session, bot, position, target, pathfinder);
    let Some(player) = session.player_mut(bot) else {
        return Err(GameError::PlayerNotFound(bot.to_string()));
    };
    if route.is_empty() {
        tracing::warn!(bot = %bot, x = target.x, y = target.y, "Bot target unreachable");
        player.route = None;
        return Ok((BotAction::Unreachable(target), Vec::new()));
    }
    tracing::debug!(bot = %bot, x = target.x, y = target.y, steps = route.len(), "Bot planned route");
    player.route = Some(route);
    Ok((BotAction::Planned(target), vec![Notification::PlayerReplaced(bot.clone())]))
}

fn spawn(session: &mut Session, bot: &PlayerId, team: TeamColor) -> Result<Coord> {
    let character = by_id(&session.rules.bot_character).ok_or_else(|| {
        GameError::InvariantViolation(format!(
            "unknown bot character '{}'",
            session.rules.bot_character
        ))
    })?;
    let pad = spawn_pad(session, team).ok_or_else(|| {
        GameError::InvariantViolation(format!(
            "no open spawn pad for team {}",
            team.display_name()
        ))
    })?;

    if let Some(player) = session.player_mut(bot) {
        player.character = Some(character);
        player.route = None;
    }
    session.relocate(bot, Some(pad));
    tracing::info!(bot = %bot, x = pad.x, y = pad.y, "Bot spawned");
    Ok(pad)
}

/// Open spawn pad of `team` closest to that team's hub, ties broken in
/// row-major order.
#[must_use]
pub fn spawn_pad(session: &Session, team: TeamColor) -> Option<Coord> {
    let hub = session
        .grid
        .tiles()
        .find(|t| t.is_spawner && t.team == team)
        .map(|t| t.coord);
    session
        .grid
        .tiles()
        .filter(|t| {
            t.is_character_spawn && t.team == team && t.kind.is_walkable() && t.occupant.is_none()
        })
        .map(|t| t.coord)
        .min_by_key(|c| (hub.map_or(0, |h| h.manhattan(*c)), c.y, c.x))
}

/// Closest firewall `team` could capture, other than the one at `from`.
#[must_use]
pub fn nearest_target(session: &Session, team: TeamColor, from: Coord) -> Option<Coord> {
    session
        .grid
        .tiles()
        .filter(|t| {
            t.is_firewall
                && !t.is_spawner
                && t.team != team
                && t.coord != from
                && t.is_capturable_by(team)
        })
        .map(|t| t.coord)
        .min_by_key(|c| (from.manhattan(*c), c.y, c.x))
}

/// Route from `from` to `goal`, without the starting cell.
fn plan(
    session: &Session,
    bot: &PlayerId,
    from: Coord,
    goal: Coord,
    pathfinder: &dyn Pathfinder,
) -> Vec<Coord> {
    let mut path = pathfinder.compute_path(from, goal, &|c| session.is_passable_for(bot, c));
    if path.first() == Some(&from) {
        path.remove(0);
    }
    path
}

fn follow_route(
    session: &mut Session,
    bot: &PlayerId,
    mut position: Coord,
    mut route: Vec<Coord>,
    pathfinder: &dyn Pathfinder,
) -> BotAction {
    let budget = session
        .player(bot)
        .and_then(|p| p.character.as_ref())
        .map_or(0, |c| c.move_points);

    let mut steps = 0;
    let mut replanned = false;
    let mut held = false;
    while steps < budget {
        let Some(&next) = route.first() else {
            break;
        };
        if !next.is_adjacent(position) || !session.is_passable_for(bot, next) {
            let goal = route.last().copied().unwrap_or(next);
            route = if replanned {
                Vec::new()
            } else {
                plan(session, bot, position, goal, pathfinder)
            };
            replanned = true;
            if route.is_empty() {
                tracing::warn!(bot = %bot, x = position.x, y = position.y, "Bot route blocked, holding");
                held = true;
                break;
            }
            continue;
        }

        route.remove(0);
        session.relocate(bot, Some(next));
        position = next;
        steps += 1;
    }

    if let Some(player) = session.player_mut(bot) {
        player.route = (!route.is_empty()).then_some(route);
        if let Some(character) = player.character.as_mut() {
            character.move_points -= steps;
        }
    }
    tracing::debug!(bot = %bot, steps, x = position.x, y = position.y, "Bot moved");

    if held && steps == 0 {
        BotAction::Held
    } else {
        BotAction::Moved { steps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::AStar;
    use crate::scenario::ScenarioTemplate;
    use crate::session::Player;

    fn session(rows: &[&str]) -> Session {
        ScenarioTemplate::from_ascii("bot", rows)
            .unwrap()
            .start_match(
                "s",
                vec![
                    Player::bot("bot", TeamColor::Teal),
                    Player::new("alice", "Alice", TeamColor::Amber),
                ],
                true,
            )
            .unwrap()
    }

    fn turn(s: &mut Session) -> BotAction {
        run_bot_turn(s, &"bot".into(), &AStar).unwrap().0
    }

    fn bot(s: &Session) -> &Player {
        s.player(&"bot".into()).unwrap()
    }

    #[test]
    fn test_spawns_on_pad_nearest_hub() {
        let mut s = session(&["s##s#h"]);
        assert_eq!(turn(&mut s), BotAction::Spawned(Coord::new(3, 0)));

        let b = bot(&s);
        assert_eq!(b.position, Some(Coord::new(3, 0)));
        assert_eq!(b.character.as_ref().map(|c| c.id.as_str()), Some("technician"));
        assert_eq!(
            s.grid.tile(Coord::new(3, 0)).unwrap().occupant,
            Some("bot".into())
        );
    }

    #[test]
    fn test_occupied_pad_is_skipped() {
        let mut s = session(&["s##s#h"]);
        s.relocate(&"alice".into(), Some(Coord::new(3, 0)));
        assert_eq!(turn(&mut s), BotAction::Spawned(Coord::new(0, 0)));
    }

    #[test]
    fn test_waits_out_respawn() {
        let mut s = session(&["s##s#h"]);
        s.player_mut(&"bot".into()).unwrap().respawn_turns = 2;
        let before = s.clone();
        assert_eq!(turn(&mut s), BotAction::Waiting);
        assert_eq!(s, before);
    }

    #[test]
    fn test_missing_pad_is_invariant_violation() {
        let mut s = session(&["H#h"]);
        assert!(matches!(
            run_bot_turn(&mut s, &"bot".into(), &AStar),
            Err(GameError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_unknown_bot_is_error() {
        let mut s = session(&["s#h"]);
        assert!(matches!(
            run_bot_turn(&mut s, &"ghost".into(), &AStar),
            Err(GameError::PlayerNotFound(_))
        ));
    }

    #[test]
    fn test_plan_walk_then_capture() {
        let mut s = session(&["hs#F#F"]);
        turn(&mut s);
        assert_eq!(bot(&s).position, Some(Coord::new(1, 0)));

        // Plans toward the nearer firewall without moving
        assert_eq!(turn(&mut s), BotAction::Planned(Coord::new(3, 0)));
        assert_eq!(bot(&s).route, Some(vec![Coord::new(2, 0), Coord::new(3, 0)]));
        assert_eq!(bot(&s).position, Some(Coord::new(1, 0)));

        assert_eq!(turn(&mut s), BotAction::Moved { steps: 2 });
        let b = bot(&s);
        assert_eq!(b.position, Some(Coord::new(3, 0)));
        assert!(b.route.is_none());
        assert_eq!(b.character.as_ref().unwrap().move_points, 1);

        assert_eq!(turn(&mut s), BotAction::Captured);
        assert_eq!(s.grid.tile(Coord::new(3, 0)).unwrap().capture_ticks, 1);
    }

    #[test]
    fn test_obstructed_route_replans() {
        let mut s = session(&["hs#F", "####"]);
        turn(&mut s);
        turn(&mut s);
        assert_eq!(bot(&s).route, Some(vec![Coord::new(2, 0), Coord::new(3, 0)]));

        s.relocate(&"alice".into(), Some(Coord::new(2, 0)));
        assert_eq!(turn(&mut s), BotAction::Moved { steps: 3 });

        let b = bot(&s);
        assert_eq!(b.position, Some(Coord::new(3, 1)));
        assert_eq!(b.route, Some(vec![Coord::new(3, 0)]));
        assert_eq!(b.character.as_ref().unwrap().move_points, 0);
    }

    #[test]
    fn test_blocked_route_holds() {
        let mut s = session(&["hs#F"]);
        turn(&mut s);
        turn(&mut s);
        s.relocate(&"alice".into(), Some(Coord::new(2, 0)));

        assert_eq!(turn(&mut s), BotAction::Held);
        let b = bot(&s);
        assert_eq!(b.position, Some(Coord::new(1, 0)));
        assert!(b.route.is_none());
    }

    #[test]
    fn test_unreachable_target_holds_without_error() {
        let mut s = session(&["hs.F"]);
        turn(&mut s);
        assert_eq!(turn(&mut s), BotAction::Unreachable(Coord::new(3, 0)));
        assert!(bot(&s).route.is_none());
        assert_eq!(bot(&s).position, Some(Coord::new(1, 0)));
    }

    #[test]
    fn test_no_target_skips_turn() {
        let mut s = session(&["hs##"]);
        turn(&mut s);
        let before = s.clone();
        assert_eq!(turn(&mut s), BotAction::Idle);
        assert_eq!(s, before);
    }

    #[test]
    fn test_nearest_target_tie_breaks_row_major() {
        let s = session(&["F#F", "#sh", "F##"]);
        // (0,0) and (2,0) are both 2 away from (1,1); (0,2) too
        assert_eq!(
            nearest_target(&s, TeamColor::Teal, Coord::new(1, 1)),
            Some(Coord::new(0, 0))
        );
    }
}
