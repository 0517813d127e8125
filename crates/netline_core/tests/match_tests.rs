//! Whole-match tests.
//!
//! Drives full sessions through the turn controller and checks the rules
//! that must hold at every step.

use std::collections::HashSet;

use netline_core::channel::{route, LocalPatch, NetMessage, Notification, Outbound};
use netline_core::character::{Ability, StatusEffect};
use netline_core::client_state::AppState;
use netline_core::combat::apply_ability;
use netline_core::grid::Coord;
use netline_core::pathfinding::AStar;
use netline_core::session::{MatchStatus, Player, PlayerId, Session};
use netline_core::team::{TeamColor, VirusColor};
use netline_core::turn::{advance_tick, end_turn};
use netline_test_utils::determinism::{find_first_divergence, hash, tick};
use netline_test_utils::fixtures::{
    amber, ascii_session, bot_vs_bot, human_vs_bot, occupancy, spawn_at, teal,
};

fn assert_single_occupancy(session: &Session) {
    for player in &session.players {
        let held = occupancy(session, &player.id);
        match player.position {
            Some(at) => {
                assert_eq!(held, 1, "{} holds {held} tiles", player.id);
                assert_eq!(
                    session.grid.get(at).and_then(|t| t.occupant.as_ref()),
                    Some(&player.id)
                );
            }
            None => assert_eq!(held, 0, "{} is off-map but holds tiles", player.id),
        }
    }
}

fn assert_lines_connected(session: &Session) {
    let mut seen = HashSet::new();
    for path in &session.paths {
        let spawner = session.grid.get(path.nodes[0]).unwrap();
        assert!(spawner.is_spawner);
        for pair in path.nodes.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]), "gap in line at {:?}", pair[1]);
        }
        for &node in &path.nodes {
            assert!(seen.insert(node), "{node:?} is on two lines");
            let tile = session.grid.get(node).unwrap();
            if !tile.is_firewall {
                assert_eq!(tile.team, spawner.team, "{node:?} owned by the wrong team");
            }
        }
    }
}

#[test]
fn bot_match_keeps_invariants_every_tick() {
    let mut session = bot_vs_bot();
    let mut damage = session.hub_damage.clone();

    for _ in 0..400 {
        tick(&mut session);
        assert_single_occupancy(&session);
        assert_lines_connected(&session);

        for (team, &before) in &damage {
            assert!(session.hub_damage.get(team).copied().unwrap_or(0) >= before);
        }
        damage = session.hub_damage.clone();

        for tile in session.grid.tiles().filter(|t| t.is_firewall) {
            assert!(tile.capture_ticks <= tile.max_capture_ticks);
        }
    }

    // Both bots spawned and went after the firewalls
    assert!(session.players.iter().all(Player::is_spawned));
    assert!(session.turn >= 79);
}

#[test]
fn bots_capture_the_nearest_firewalls() {
    let mut session = bot_vs_bot();
    for _ in 0..60 {
        end_turn(&mut session, &AStar).unwrap();
    }

    let owner = |x| session.grid.get(Coord::new(x, 1)).unwrap().team;
    assert_eq!(owner(4), TeamColor::Amber);
    assert_eq!(owner(8), TeamColor::Teal);

    // Both lines grew past their own firewall
    assert!(session.paths[0].contains(Coord::new(5, 1)));
    assert!(session.paths[1].contains(Coord::new(7, 1)));
}

#[test]
fn rotation_visits_every_player_once_per_cycle() {
    let mut session = ascii_session(
        &["SH--h"],
        vec![amber("a"), teal("b"), amber("c"), teal("d")],
    );
    for _ in 0..3 {
        let mut seen = Vec::new();
        for _ in 0..session.players.len() {
            seen.push(session.active_player_id.clone());
            end_turn(&mut session, &AStar).unwrap();
        }
        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(unique.len(), session.players.len());
    }
    assert_eq!(session.active_player_id, PlayerId::from("a"));
}

#[test]
fn same_scenario_resolves_identically() {
    assert!(find_first_divergence(bot_vs_bot, 300).is_none());
    assert!(find_first_divergence(human_vs_bot, 300).is_none());

    let mut first = bot_vs_bot();
    let mut second = bot_vs_bot();
    for _ in 0..50 {
        end_turn(&mut first, &AStar).unwrap();
        end_turn(&mut second, &AStar).unwrap();
    }
    assert_eq!(hash(&first), hash(&second));
    assert_eq!(first, second);
}

#[test]
fn pierce_kill_then_respawn_cycle() {
    let mut session = ascii_session(&["SH###hs"], vec![amber("a"), teal("b")]);
    spawn_at(&mut session, "a", "technician", Coord::new(2, 0));
    spawn_at(&mut session, "b", "saboteur", Coord::new(3, 0));
    {
        let b = session.player_mut(&"b".into()).unwrap().character.as_mut().unwrap();
        b.hp = 8;
        b.armor = 5;
    }

    let lance = Ability::new("Lance", 10, StatusEffect::Pierce);
    apply_ability(&mut session, &"a".into(), &lance, Coord::new(3, 0));

    let max = session.rules.max_respawn_turns;
    let b = session.player(&"b".into()).unwrap();
    assert!(b.character.is_none());
    assert_eq!(b.respawn_turns, max);
    assert_single_occupancy(&session);

    for expected in (0..max).rev() {
        end_turn(&mut session, &AStar).unwrap();
        assert_eq!(session.player(&"b".into()).unwrap().respawn_turns, expected);
    }
}

#[test]
fn human_vs_bot_routes_locally() {
    let mut session = human_vs_bot();
    let mut state = AppState::default().apply(LocalPatch::SetUser {
        current_user: session.players[0].clone(),
    });

    for _ in 0..session.turn_tick_limit * 2 {
        let notes = advance_tick(&mut session, &AStar).unwrap();
        for out in route(&session, &notes) {
            let Outbound::Local(patch) = out else {
                panic!("single-player session broadcast a message");
            };
            state = state.apply(patch);
        }
    }

    assert!(state.in_match());
    assert_eq!(state.active_session.as_ref(), Some(&session));
    assert_eq!(session.turn, 2);
    // The bot spawned on its own turn
    assert!(session.player(&"bot".into()).unwrap().is_spawned());
}

#[test]
fn multiplayer_ticks_broadcast_lightweight_messages() {
    let mut session = bot_vs_bot();
    let notes = advance_tick(&mut session, &AStar).unwrap();
    assert_eq!(notes, vec![Notification::Tick]);

    let out = route(&session, &notes);
    assert_eq!(
        out,
        vec![Outbound::Broadcast(NetMessage::MatchTick {
            session_id: session.session_id.clone()
        })]
    );
}

#[test]
fn hub_destruction_ends_the_match() {
    let mut session = ascii_session(&["SH-h"], vec![amber("a"), teal("b")]);
    session.rules.hub_damage_limit = 3;
    // Green cannot take blue, so Teal's line never leaves its hub
    session.grid.tile_mut(Coord::new(1, 0)).unwrap().virus = VirusColor::Blue;
    session.grid.tile_mut(Coord::new(3, 0)).unwrap().virus = VirusColor::Green;

    let mut turns = 0;
    while !session.status.is_finished() {
        end_turn(&mut session, &AStar).unwrap();
        turns += 1;
        assert!(turns < 20, "match never ended");
    }

    assert_eq!(session.status, MatchStatus::Win);
    let frozen = session.clone();
    assert!(advance_tick(&mut session, &AStar).unwrap().is_empty());
    assert_eq!(session, frozen);
}
