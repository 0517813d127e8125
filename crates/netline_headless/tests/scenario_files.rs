//! Runs the scenario files shipped with the runner.

use std::path::PathBuf;

use netline_core::session::MatchStatus;
use netline_core::team::TeamColor;
use netline_headless::{load_scenario, summarize, HeadlessConfig, HeadlessRunner, MemorySink};

fn scenario(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

#[test]
fn shipped_scenarios_validate() {
    for name in ["test_ground.ron", "crossfire.txt"] {
        let template = load_scenario(&scenario(name)).unwrap();
        let summary = summarize(&template);
        assert_eq!(summary.teams, vec![TeamColor::Amber, TeamColor::Teal], "{name}");
    }

    let ron = summarize(&load_scenario(&scenario("test_ground.ron")).unwrap());
    assert_eq!(ron.rules.hub_damage_limit, 6);
    assert_eq!(ron.rules.turn_tick_limit, 5);
}

#[test]
fn ron_test_ground_plays_like_the_built_in_one() {
    let play = |path: Option<PathBuf>| {
        HeadlessRunner::with_config(HeadlessConfig {
            scenario_path: path,
            max_turns: 40,
            ..HeadlessConfig::default()
        })
        .run(&mut MemorySink::default(), |_| {})
        .unwrap()
    };

    let from_file = play(Some(scenario("test_ground.ron")));
    let built_in = play(None);
    assert_eq!(from_file.turns, built_in.turns);
    assert_eq!(from_file.firewalls_held, built_in.firewalls_held);
    assert_eq!(from_file.line_lengths, built_in.line_lengths);
}

#[test]
fn crossfire_runs_to_the_turn_budget_or_a_result() {
    let mut frames = 0;
    let report = HeadlessRunner::with_config(HeadlessConfig {
        scenario_path: Some(scenario("crossfire.txt")),
        max_turns: 50,
        ..HeadlessConfig::default()
    })
    .run(&mut MemorySink::default(), |_| frames += 1)
    .unwrap();

    assert!(report.turns == 50 || report.status.is_finished());
    assert_ne!(report.status, MatchStatus::Setup);
    assert_eq!(frames, report.turns as usize + 1);
}
