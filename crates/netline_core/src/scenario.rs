//! Scenario templates and match start.
//!
//! A scenario is a static template of rows of tile descriptors. It is
//! consumed once at match start to seed the grid and the initial paths.
//! Templates load from RON files or from a compact ASCII notation:
//!
//! | Glyph | Tile |
//! |-------|------|
//! | `.`   | gap |
//! | `#`   | open floor |
//! | `-`   | neutral network line |
//! | `F`   | neutral firewall |
//! | `H` / `h` | Amber / Teal hub (spawner) |
//! | `S` / `s` | Amber / Teal character spawn pad |
//! | `X` / `x` | Amber / Teal firewall |
//! | `L` / `l` | Amber / Teal network line |

use std::collections::HashSet;
use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::grid::{Grid, TileKind};
use crate::session::{MatchRules, MatchStatus, Path, Player, PlayerId, Session};
use crate::team::{TeamColor, VirusColor};

/// Descriptor for one tile in a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TileTemplate {
    /// Terrain class.
    pub kind: TileKind,
    /// Initial owner.
    pub team: TeamColor,
    /// Firewall flag.
    pub firewall: bool,
    /// Spawner (hub) flag.
    pub spawner: bool,
    /// Character spawn pad flag.
    pub character_spawn: bool,
}

impl TileTemplate {
    const fn plain(kind: TileKind) -> Self {
        Self {
            kind,
            team: TeamColor::Neutral,
            firewall: false,
            spawner: false,
            character_spawn: false,
        }
    }

    /// Decode one ASCII map glyph.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        let template = match glyph {
            '.' => Self::plain(TileKind::Gap),
            '#' => Self::plain(TileKind::Grid),
            '-' => Self::plain(TileKind::NetworkLine),
            'F' => Self {
                firewall: true,
                ..Self::plain(TileKind::NetworkLine)
            },
            'H' | 'h' => Self {
                team: team_for(glyph),
                spawner: true,
                ..Self::plain(TileKind::Hub)
            },
            'S' | 's' => Self {
                team: team_for(glyph),
                character_spawn: true,
                ..Self::plain(TileKind::Grid)
            },
            'X' | 'x' => Self {
                team: team_for(glyph),
                firewall: true,
                ..Self::plain(TileKind::NetworkLine)
            },
            'L' | 'l' => Self {
                team: team_for(glyph),
                ..Self::plain(TileKind::NetworkLine)
            },
            _ => return None,
        };
        Some(template)
    }
}

const fn team_for(glyph: char) -> TeamColor {
    if glyph.is_ascii_uppercase() {
        TeamColor::Amber
    } else {
        TeamColor::Teal
    }
}

/// A complete scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioTemplate {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Rule overrides.
    #[serde(default)]
    pub rules: MatchRules,
    /// Tile descriptors, top row first.
    pub rows: Vec<Vec<TileTemplate>>,
}

impl ScenarioTemplate {
    /// Load a scenario from a RON file.
    ///
    /// # Errors
    ///
    /// Returns `GameError::ScenarioLoad` if the file cannot be read and
    /// `GameError::ScenarioParse` if it is malformed.
    pub fn load<P: AsRef<FsPath>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| GameError::ScenarioLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    ///
    /// # Errors
    ///
    /// Returns `GameError::ScenarioParse` if the text is malformed or
    /// describes an invalid map.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let scenario: Self =
            ron::from_str(ron).map_err(|e| GameError::ScenarioParse(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Build a scenario from ASCII rows (see the module docs for the legend).
    ///
    /// # Errors
    ///
    /// Returns `GameError::ScenarioParse` for unknown glyphs or an invalid map.
    pub fn from_ascii(name: impl Into<String>, rows: &[&str]) -> Result<Self> {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(y, line)| {
                line.chars()
                    .enumerate()
                    .map(|(x, glyph)| {
                        TileTemplate::from_glyph(glyph).ok_or_else(|| {
                            GameError::ScenarioParse(format!(
                                "unknown glyph '{glyph}' at ({x}, {y})"
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let scenario = Self {
            name: name.into(),
            description: String::new(),
            rules: MatchRules::default(),
            rows,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// The standard two-team proving ground.
    ///
    /// Two hubs joined by one line with two neutral firewalls.
    #[must_use]
    pub fn test_ground() -> Self {
        const ROWS: [&str; 3] = ["S#####.#####s", "H---F---F---h", "#####...#####"];
        let rows = ROWS
            .iter()
            .map(|line| {
                line.chars()
                    .map(|g| TileTemplate::from_glyph(g).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self {
            name: "Test Ground".into(),
            description: "Two hubs, one line, two firewalls".into(),
            rules: MatchRules::default(),
            rows,
        }
    }

    /// Check the template describes a playable map.
    ///
    /// # Errors
    ///
    /// Returns `GameError::ScenarioParse` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let width = self.rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(GameError::ScenarioParse(format!(
                "scenario '{}' has no tiles",
                self.name
            )));
        }
        if let Some(y) = self.rows.iter().position(|r| r.len() != width) {
            return Err(GameError::ScenarioParse(format!(
                "row {y} of scenario '{}' is not {width} tiles wide",
                self.name
            )));
        }

        let tiles = || self.rows.iter().flatten();
        if !tiles().any(|t| t.spawner) {
            return Err(GameError::ScenarioParse(format!(
                "scenario '{}' has no spawner",
                self.name
            )));
        }
        if tiles().any(|t| t.spawner && t.team.is_neutral()) {
            return Err(GameError::ScenarioParse(
                "every spawner must belong to a team".into(),
            ));
        }
        if tiles().any(|t| t.kind == TileKind::Gap && (t.spawner || t.firewall || t.character_spawn))
        {
            return Err(GameError::ScenarioParse(
                "gaps cannot carry spawners, firewalls or spawn pads".into(),
            ));
        }
        if self.rules.turn_tick_limit == 0 {
            return Err(GameError::ScenarioParse(
                "turn_tick_limit must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Seed a new active session from this template.
    ///
    /// The first player hosts and takes the first turn. Spawners start with a
    /// red virus; hub tiles use the hub capture threshold and every other
    /// tile the firewall threshold. One path starts at each spawner, in
    /// row-major order.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidState` for an empty or duplicated player
    /// list, and `GameError::ScenarioParse` for an invalid template.
    pub fn start_match(
        &self,
        session_id: impl Into<String>,
        players: Vec<Player>,
        is_single_player: bool,
    ) -> Result<Session> {
        self.validate()?;

        let host: PlayerId = players
            .first()
            .map(|p| p.id.clone())
            .ok_or_else(|| GameError::InvalidState("a match needs at least one player".into()))?;
        let mut seen = HashSet::new();
        if let Some(dup) = players.iter().find(|p| !seen.insert(&p.id)) {
            return Err(GameError::InvalidState(format!(
                "duplicate player id {}",
                dup.id
            )));
        }

        let kinds: Vec<Vec<TileKind>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|t| t.kind).collect())
            .collect();
        let mut grid = Grid::from_rows(&kinds)?;

        let rules = self.rules.clone();
        for (tile, template) in grid.tiles_mut().zip(self.rows.iter().flatten()) {
            tile.team = template.team;
            tile.is_firewall = template.firewall;
            tile.is_spawner = template.spawner;
            tile.is_character_spawn = template.character_spawn;
            tile.virus = if template.spawner {
                VirusColor::Red
            } else {
                VirusColor::None
            };
            tile.max_capture_ticks = if template.kind == TileKind::Hub {
                rules.hub_capture_ticks
            } else {
                rules.firewall_capture_ticks
            };
        }

        let paths = grid
            .tiles()
            .filter(|t| t.is_spawner)
            .map(|t| Path::from_spawner(t.coord))
            .collect();

        let session = Session {
            session_id: session_id.into(),
            host_player_id: host.clone(),
            active_player_id: host,
            status: MatchStatus::Active,
            players,
            grid,
            paths,
            ticks: 0,
            turn_tick_limit: rules.turn_tick_limit,
            turn: 0,
            hub_damage: std::collections::BTreeMap::new(),
            is_single_player,
            rules,
        };

        tracing::info!(
            session = %session.session_id,
            scenario = %self.name,
            players = session.players.len(),
            paths = session.paths.len(),
            "Match started"
        );
        Ok(session)
    }
}
