//! Network line propagation.
//!
//! Runs once per end of turn over every path, in list order. Each path first
//! pushes virus colour changes a few nodes down its interior, then tries to
//! grow its frontier by one tile. Growth claims neutral line tiles, flags
//! enemy firewalls for manual capture, damages enemy hubs, and settles
//! path-vs-path collisions by virus dominance.

use crate::channel::Notification;
use crate::grid::Coord;
use crate::session::{MatchStatus, Session};
use crate::team::{TeamColor, VirusColor};

/// What a path did at its frontier this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontierOutcome {
    /// Nothing to grow into.
    Stalled,
    /// An own firewall was linked onto the line.
    LinkedFirewall(Coord),
    /// An enemy or neutral firewall was opened for capture by the path's team.
    FlaggedFirewall(Coord),
    /// An enemy hub took one point of damage.
    HubHit(Coord),
    /// A neutral tile was claimed.
    Claimed(Coord),
    /// A contested tile was taken from another line.
    Captured(Coord),
    /// A contested tile held.
    Repelled(Coord),
}

/// Advance every path once.
///
/// Returns a full session update when any tile, path or status changed.
pub fn propagate(session: &mut Session) -> Vec<Notification> {
    let mut changed = false;
    for index in 0..session.paths.len() {
        changed |= advance_colors(session, index) > 0;
        changed |= !matches!(
            extend_frontier(session, index),
            FrontierOutcome::Stalled | FrontierOutcome::Repelled(_)
        );
    }

    if changed {
        vec![Notification::SessionUpdated]
    } else {
        Vec::new()
    }
}

/// Copy colour changes forward along the interior of path `index`.
///
/// Walks from the node after the spawner, copying each predecessor's virus
/// colour onto a differing node, and stops after
/// `rules.color_advance_per_turn` copies. Returns the number of copies made.
pub fn advance_colors(session: &mut Session, index: usize) -> u32 {
    let limit = session.rules.color_advance_per_turn;
    let Session { grid, paths, .. } = session;
    let Some(path) = paths.get(index) else {
        return 0;
    };

    let mut copies = 0;
    for pair in path.nodes.windows(2) {
        if copies >= limit {
            break;
        }
        let Some(previous) = grid.get(pair[0]).map(|t| t.virus) else {
            continue;
        };
        if let Some(tile) = grid.get_mut(pair[1]) {
            if tile.virus != previous {
                tile.virus = previous;
                copies += 1;
            }
        }
    }
    copies
}

/// Try to grow path `index` by one tile.
pub fn extend_frontier(session: &mut Session, index: usize) -> FrontierOutcome {
    let Some((origin, end)) = session
        .paths
        .get(index)
        .and_then(|p| Some((*p.nodes.first()?, p.end()?)))
    else {
        return FrontierOutcome::Stalled;
    };
    // The line belongs to its spawner's team; the end only supplies colour
    let (Some(spawner), Some(end_tile)) = (session.grid.get(origin), session.grid.get(end)) else {
        return FrontierOutcome::Stalled;
    };
    let (team, virus) = (spawner.team, end_tile.virus);

    let frontier = session
        .grid
        .neighbors(end)
        .find(|t| t.kind.carries_line() && t.team != team)
        .map(|t| t.coord);

    let Some(candidate) = frontier else {
        return link_own_firewall(session, index, end, team, virus);
    };
    let Some(tile) = session.grid.get_mut(candidate) else {
        return FrontierOutcome::Stalled;
    };

    if tile.is_firewall {
        tile.capturable_by.insert(team, true);
        tracing::debug!(x = candidate.x, y = candidate.y, team = team.display_name(), "Firewall opened for capture");
        return FrontierOutcome::FlaggedFirewall(candidate);
    }

    if tile.is_spawner {
        let hub_team = tile.team;
        tile.capture_ticks = tile.capture_ticks.saturating_add(1);
        hit_hub(session, hub_team);
        return FrontierOutcome::HubHit(candidate);
    }

    if tile.team.is_neutral() {
        tile.team = team;
        tile.virus = virus;
        session.paths[index].nodes.push(candidate);
        tracing::debug!(x = candidate.x, y = candidate.y, team = team.display_name(), "Line claimed tile");
        return FrontierOutcome::Claimed(candidate);
    }

    collide(session, index, team, end, candidate)
}

/// No uncontrolled line next to the frontier: link an adjacent own firewall
/// that is not yet on any line.
fn link_own_firewall(
    session: &mut Session,
    index: usize,
    end: Coord,
    team: TeamColor,
    virus: VirusColor,
) -> FrontierOutcome {
    let Some(firewall) = session
        .grid
        .neighbors(end)
        .find(|t| t.is_firewall && t.team == team && session.path_containing(t.coord).is_none())
        .map(|t| t.coord)
    else {
        return FrontierOutcome::Stalled;
    };

    if let Some(tile) = session.grid.get_mut(firewall) {
        tile.virus = virus;
    }
    session.paths[index].nodes.push(firewall);
    tracing::debug!(x = firewall.x, y = firewall.y, team = team.display_name(), "Firewall linked");
    FrontierOutcome::LinkedFirewall(firewall)
}

fn hit_hub(session: &mut Session, hub_team: TeamColor) {
    let damage = session.hub_damage.entry(hub_team).or_insert(0);
    *damage += 1;
    let damage = *damage;
    tracing::info!(team = hub_team.display_name(), damage, "Hub hit");

    if damage <= session.rules.hub_damage_limit || session.status.is_finished() {
        return;
    }
    let active_team = session.active_player().map(|p| p.team);
    session.status = if active_team == Some(hub_team) {
        MatchStatus::Lose
    } else {
        MatchStatus::Win
    };
    tracing::info!(
        session = %session.session_id,
        status = ?session.status,
        team = hub_team.display_name(),
        "Hub destroyed"
    );
}

/// Resolve a meeting between path `index` and whichever line holds
/// `contested`.
fn collide(
    session: &mut Session,
    index: usize,
    team: TeamColor,
    end: Coord,
    contested: Coord,
) -> FrontierOutcome {
    let (Some(end_tile), Some(tile)) = (session.grid.get(end), session.grid.get(contested)) else {
        return FrontierOutcome::Stalled;
    };
    let (virus, end_is_firewall) = (end_tile.virus, end_tile.is_firewall);
    let loser = tile.team;

    if !virus.dominates(tile.virus) {
        tracing::debug!(
            x = contested.x,
            y = contested.y,
            attacker = ?virus,
            defender = ?tile.virus,
            "Collision repelled"
        );
        return FrontierOutcome::Repelled(contested);
    }

    if end_is_firewall {
        if let Some(end_tile) = session.grid.get_mut(end) {
            end_tile.capturable_by.insert(loser, false);
        }
    }

    if let Some(other) = session.path_containing(contested) {
        release_from(session, other, contested);
    }
    if let Some(tile) = session.grid.get_mut(contested) {
        tile.team = team;
        tile.virus = virus;
    }
    session.paths[index].nodes.push(contested);
    tracing::info!(
        x = contested.x,
        y = contested.y,
        winner = team.display_name(),
        loser = loser.display_name(),
        "Collision captured tile"
    );
    FrontierOutcome::Captured(contested)
}

/// Cut path `index` at `at`, dropping `at` and every node beyond it.
///
/// Released line tiles go back to neutral. Released firewalls keep their
/// owner and only lose their virus; firewall ownership changes by capture
/// alone.
pub(crate) fn release_from(session: &mut Session, index: usize, at: Coord) {
    let Some(path) = session.paths.get_mut(index) else {
        return;
    };
    let Some(cut) = path.nodes.iter().position(|&c| c == at) else {
        return;
    };
    let tail = path.nodes.split_off(cut);
    for &coord in tail.iter().skip(1) {
        if let Some(tile) = session.grid.get_mut(coord) {
            if !tile.is_firewall {
                tile.team = TeamColor::Neutral;
            }
            tile.virus = VirusColor::None;
        }
    }
    if tail.len() > 1 {
        tracing::debug!(x = at.x, y = at.y, released = tail.len() - 1, "Line cut");
    }
}
