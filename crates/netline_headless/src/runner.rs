//! Headless match runner.
//!
//! Loads a scenario, seats one bot per team that owns a hub, and drives the
//! session tick by tick until the match finishes or the turn budget runs
//! out. Every routed message goes where the session's single-player flag
//! says: local patches into an [`AppState`], broadcasts into a
//! [`BroadcastSink`].

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::Serialize;

use netline_core::channel::{route, BroadcastSink, Notification, Outbound};
use netline_core::client_state::AppState;
use netline_core::intents;
use netline_core::pathfinding::AStar;
use netline_core::scenario::ScenarioTemplate;
use netline_core::session::{MatchRules, MatchStatus, Player, Session};
use netline_core::team::TeamColor;
use netline_core::turn::advance_tick;

use crate::error::{HeadlessError, Result};

/// Turn budget when none is given.
pub const DEFAULT_MAX_TURNS: u32 = 200;

/// Session id used when none is given.
pub const DEFAULT_SESSION_ID: &str = "headless";

/// Headless runner configuration.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Scenario file to load. `None` plays the built-in test ground.
    pub scenario_path: Option<PathBuf>,
    /// Stop after this many completed turns.
    pub max_turns: u32,
    /// Id of the session to create.
    pub session_id: String,
    /// Route through the local channel instead of broadcasting.
    pub local: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            scenario_path: None,
            max_turns: DEFAULT_MAX_TURNS,
            session_id: DEFAULT_SESSION_ID.to_owned(),
            local: false,
        }
    }
}

// ============================================================================
// Scenario helpers
// ============================================================================

/// Load a scenario file.
///
/// `.txt` and `.map` files hold ASCII map rows; anything else is RON.
///
/// # Errors
///
/// Returns `HeadlessError::FileNotFound` for a missing file and
/// `HeadlessError::Game` if the engine rejects the contents.
pub fn load_scenario(path: &Path) -> Result<ScenarioTemplate> {
    if !path.exists() {
        return Err(HeadlessError::FileNotFound(path.display().to_string()));
    }

    match path.extension().and_then(OsStr::to_str) {
        Some("txt" | "map") => {
            let text = std::fs::read_to_string(path)?;
            let rows: Vec<&str> = text
                .lines()
                .map(str::trim_end)
                .filter(|line| !line.is_empty())
                .collect();
            let name = path
                .file_stem()
                .map_or_else(|| "ascii".to_owned(), |s| s.to_string_lossy().into_owned());
            Ok(ScenarioTemplate::from_ascii(name, &rows)?)
        }
        _ => Ok(ScenarioTemplate::load(path)?),
    }
}

/// Teams that own a hub, in row-major order of their first hub.
#[must_use]
pub fn hub_teams(template: &ScenarioTemplate) -> Vec<TeamColor> {
    let mut teams = Vec::new();
    for tile in template.rows.iter().flatten().filter(|t| t.spawner) {
        if !tile.team.is_neutral() && !teams.contains(&tile.team) {
            teams.push(tile.team);
        }
    }
    teams
}

/// One bot per hub-owning team.
#[must_use]
pub fn seat_bots(template: &ScenarioTemplate) -> Vec<Player> {
    hub_teams(template)
        .into_iter()
        .map(|team| Player::bot(format!("{}-bot", team.display_name().to_lowercase()), team))
        .collect()
}

/// Static facts about a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioSummary {
    /// Scenario name.
    pub name: String,
    /// Width in tiles.
    pub width: usize,
    /// Height in tiles.
    pub height: usize,
    /// Teams that own a hub.
    pub teams: Vec<TeamColor>,
    /// Number of spawners.
    pub spawners: usize,
    /// Number of firewalls.
    pub firewalls: usize,
    /// Spawn pads per team.
    pub spawn_pads: BTreeMap<TeamColor, usize>,
    /// Effective rules.
    pub rules: MatchRules,
}

/// Summarize a scenario.
#[must_use]
pub fn summarize(template: &ScenarioTemplate) -> ScenarioSummary {
    let tiles = || template.rows.iter().flatten();
    let mut spawn_pads = BTreeMap::new();
    for tile in tiles().filter(|t| t.character_spawn) {
        *spawn_pads.entry(tile.team).or_insert(0) += 1;
    }

    ScenarioSummary {
        name: template.name.clone(),
        width: template.rows.first().map_or(0, Vec::len),
        height: template.rows.len(),
        teams: hub_teams(template),
        spawners: tiles().filter(|t| t.spawner).count(),
        firewalls: tiles().filter(|t| t.firewall).count(),
        spawn_pads,
        rules: template.rules.clone(),
    }
}

// ============================================================================
// Report
// ============================================================================

/// Outcome of a headless run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    /// Session id.
    pub session_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Completed turns.
    pub turns: u32,
    /// Ticks simulated.
    pub ticks: u64,
    /// Final status.
    pub status: MatchStatus,
    /// Hub damage per team.
    pub hub_damage: BTreeMap<TeamColor, u32>,
    /// Firewalls each team owns at the end.
    pub firewalls_held: BTreeMap<TeamColor, usize>,
    /// Length of each team's network line.
    pub line_lengths: BTreeMap<TeamColor, usize>,
    /// Messages published on the broadcast channel.
    pub broadcasts: usize,
    /// Hash of the final session.
    pub state_hash: u64,
}

impl MatchReport {
    fn from_session(session: &Session, scenario: &str, ticks: u64, broadcasts: usize) -> Result<Self> {
        let mut firewalls_held = BTreeMap::new();
        for tile in session.grid.tiles() {
            if tile.is_firewall && !tile.is_spawner && !tile.team.is_neutral() {
                *firewalls_held.entry(tile.team).or_insert(0) += 1;
            }
        }

        let mut line_lengths = BTreeMap::new();
        for path in &session.paths {
            let Some(team) = path
                .nodes
                .first()
                .and_then(|&origin| session.grid.get(origin))
                .map(|t| t.team)
            else {
                continue;
            };
            *line_lengths.entry(team).or_insert(0) += path.nodes.len();
        }

        Ok(Self {
            session_id: session.session_id.clone(),
            scenario: scenario.to_owned(),
            turns: session.turn,
            ticks,
            status: session.status,
            hub_damage: session.hub_damage.clone(),
            firewalls_held,
            line_lengths,
            broadcasts,
            state_hash: session.state_hash()?,
        })
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Plays scenarios bot-versus-bot without a client.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRunner {
    config: HeadlessConfig,
}

impl HeadlessRunner {
    /// Create a runner with default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner with custom configuration.
    #[must_use]
    pub fn with_config(config: HeadlessConfig) -> Self {
        Self { config }
    }

    /// The runner's configuration.
    #[must_use]
    pub fn config(&self) -> &HeadlessConfig {
        &self.config
    }

    /// Seat the bots and start a session from `template`.
    ///
    /// # Errors
    ///
    /// Returns `HeadlessError::NoSeats` if no team owns a hub, or the
    /// engine's error if the match cannot start.
    pub fn start(&self, template: &ScenarioTemplate) -> Result<Session> {
        let players = seat_bots(template);
        if players.is_empty() {
            return Err(HeadlessError::NoSeats(template.name.clone()));
        }
        Ok(template.start_match(self.config.session_id.clone(), players, self.config.local)?)
    }

    /// Load the configured scenario and play it.
    ///
    /// `on_turn` sees the session once before the first tick and again after
    /// every turn ends.
    ///
    /// # Errors
    ///
    /// Fails if the scenario cannot be loaded, the engine reports an error,
    /// or the sink cannot deliver.
    pub fn run(
        &self,
        sink: &mut dyn BroadcastSink,
        on_turn: impl FnMut(&Session),
    ) -> Result<MatchReport> {
        let template = match &self.config.scenario_path {
            Some(path) => load_scenario(path)?,
            None => ScenarioTemplate::test_ground(),
        };
        self.play(&template, sink, on_turn)
    }

    /// Play `template` to completion or to the turn budget.
    ///
    /// # Errors
    ///
    /// See [`HeadlessRunner::run`].
    pub fn play(
        &self,
        template: &ScenarioTemplate,
        sink: &mut dyn BroadcastSink,
        mut on_turn: impl FnMut(&Session),
    ) -> Result<MatchReport> {
        let mut session = self.start(template)?;
        let mut state = AppState::default();
        let mut broadcasts = 0;

        let host = session
            .players
            .first()
            .cloned()
            .ok_or_else(|| HeadlessError::NoSeats(template.name.clone()))?;
        let login_session = (!session.is_single_player).then_some(session.session_id.as_str());
        for out in intents::login(host, login_session) {
            state = dispatch(out, state, sink, &mut broadcasts)?;
        }

        on_turn(&session);
        let mut ticks = 0;
        while !session.status.is_finished() && session.turn < self.config.max_turns {
            let notes = advance_tick(&mut session, &AStar)?;
            ticks += 1;
            for out in route(&session, &notes) {
                state = dispatch(out, state, sink, &mut broadcasts)?;
            }
            if notes.contains(&Notification::SessionUpdated) {
                tracing::debug!(turn = session.turn, active = %session.active_player_id, "Turn complete");
                on_turn(&session);
            }
        }

        if session.is_single_player && session.turn > 0 && state.active_session.as_ref() != Some(&session) {
            tracing::warn!(session = %session.session_id, "Local view diverged from the session");
        }

        let report = MatchReport::from_session(&session, &template.name, ticks, broadcasts)?;
        state = dispatch(intents::cleanup(), state, sink, &mut broadcasts)?;
        debug_assert!(!state.in_match());

        tracing::info!(
            session = %report.session_id,
            scenario = %report.scenario,
            turns = report.turns,
            status = ?report.status,
            broadcasts = report.broadcasts,
            "Run finished"
        );
        Ok(report)
    }
}

fn dispatch(
    out: Outbound,
    state: AppState,
    sink: &mut dyn BroadcastSink,
    broadcasts: &mut usize,
) -> Result<AppState> {
    match out {
        Outbound::Local(patch) => Ok(state.apply(patch)),
        Outbound::Broadcast(message) => {
            sink.publish(&message)?;
            *broadcasts += 1;
            Ok(state)
        }
    }
}
